//! Postgres after-commit hook feeding the change bus.
//!
//! The `notify_record_change()` trigger (see `sitecache-db` migrations)
//! issues `pg_notify('record_changes', <ChangeEvent JSON>)`. Postgres only
//! delivers a notification once its transaction commits, so everything
//! [`ChangeListener`] publishes is a durable change.

use std::sync::Arc;

use sitecache_core::change_event::ChangeEvent;
use sitecache_core::error::CoreError;
use sitecache_db::DbPool;
use sqlx::postgres::PgListener;
use tokio_util::sync::CancellationToken;

use crate::bus::ChangeBus;

/// NOTIFY channel the trigger publishes on.
pub const CHANGE_CHANNEL: &str = "record_changes";

pub struct ChangeListener;

impl ChangeListener {
    /// Listen on [`CHANGE_CHANNEL`] and publish every parsed event to `bus`.
    ///
    /// Malformed payloads are logged and skipped. Returns when `cancel`
    /// fires, or with the error if the listener connection cannot be
    /// re-established.
    pub async fn run(
        pool: &DbPool,
        bus: Arc<ChangeBus>,
        cancel: CancellationToken,
    ) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        tracing::info!(channel = CHANGE_CHANNEL, "Listening for record changes");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Change listener cancelled");
                    return Ok(());
                }
                notification = listener.recv() => {
                    let notification = notification?;
                    match parse_notification(notification.payload()) {
                        Ok(event) => {
                            tracing::debug!(
                                collection = %event.collection,
                                action = %event.action,
                                "Record change received"
                            );
                            bus.publish(event);
                        }
                        Err(e) => {
                            tracing::warn!(
                                payload_bytes = notification.payload().len(),
                                error = %e,
                                "Dropping malformed change notification"
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Parse a `record_changes` payload.
pub fn parse_notification(payload: &str) -> Result<ChangeEvent, CoreError> {
    ChangeEvent::from_json(payload.as_bytes())
}
