//! Rate limit for the full cache flush.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Allows at most one full flush per `min_interval`.
pub struct FlushGuard {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl FlushGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Claim the flush slot. On refusal returns the whole seconds (rounded
    /// up) until the next flush is allowed.
    pub async fn try_acquire(&self) -> Result<FlushClaim, u64> {
        let mut last = self.last.lock().await;
        let now = Instant::now();

        if let Some(previous) = *last {
            let elapsed = now.duration_since(previous);
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                return Err(remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0));
            }
        }

        *last = Some(now);
        Ok(FlushClaim { claimed_at: now })
    }

    /// Give back a claim whose flush did not happen. Clears the slot unless a
    /// later claim has replaced it.
    pub async fn release(&self, claim: FlushClaim) {
        let mut last = self.last.lock().await;
        if *last == Some(claim.claimed_at) {
            *last = None;
        }
    }
}

/// A granted flush slot, returned to [`FlushGuard::release`] if the flush
/// fails.
#[derive(Debug)]
#[must_use]
pub struct FlushClaim {
    claimed_at: Instant,
}
