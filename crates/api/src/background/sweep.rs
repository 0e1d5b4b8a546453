//! Scheduled revalidation sweeps.
//!
//! A sweep invalidates a static tag set so content changed outside the
//! webhook path (or by a dropped delivery) still refreshes. Sweeps run from
//! the cron endpoint, and in-process when `SWEEP_SCHEDULE_ENABLED` is set.

use std::sync::Arc;

use sitecache_core::sweep::SweepFrequency;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheError, InvalidationEngine, InvalidationReport};

/// Invalidate the tag set for `frequency`.
pub async fn run_sweep(
    engine: &InvalidationEngine,
    frequency: SweepFrequency,
) -> Result<InvalidationReport, CacheError> {
    let report = engine.invalidate(&frequency.request()).await?;
    tracing::info!(
        %frequency,
        tags = report.revalidated.tags.len(),
        failed = report.failed.tags.len(),
        "Revalidation sweep complete"
    );
    Ok(report)
}

/// Run every sweep frequency on its own interval until `cancel` fires.
///
/// The first sweep of each frequency happens one full period after start.
pub async fn run(engine: Arc<InvalidationEngine>, cancel: CancellationToken) {
    let start = Instant::now();
    let mut hourly = schedule(start, SweepFrequency::Hourly);
    let mut daily = schedule(start, SweepFrequency::Daily);
    let mut weekly = schedule(start, SweepFrequency::Weekly);

    tracing::info!("Revalidation sweep scheduler started");

    loop {
        let frequency = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Revalidation sweep scheduler stopping");
                break;
            }
            _ = hourly.tick() => SweepFrequency::Hourly,
            _ = daily.tick() => SweepFrequency::Daily,
            _ = weekly.tick() => SweepFrequency::Weekly,
        };

        if let Err(e) = run_sweep(&engine, frequency).await {
            tracing::error!(%frequency, error = %e, "Revalidation sweep failed");
        }
    }
}

fn schedule(start: Instant, frequency: SweepFrequency) -> tokio::time::Interval {
    let period = frequency.interval();
    let mut interval = interval_at(start + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
