//! Fan-out of committed changes to registered webhook targets.
//!
//! [`Dispatcher::dispatch`] never fails: the mutation that produced the event
//! has already committed, so every problem on the way out (registry query,
//! network, timeout, non-2xx) is logged and reported, not propagated.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use sitecache_core::change_event::ChangeEvent;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::delivery::webhook::WebhookDelivery;
use crate::registry::WebhookRegistry;

/// Outcome of dispatching one event, by config name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    registry: Arc<dyn WebhookRegistry>,
    delivery: WebhookDelivery,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn WebhookRegistry>, delivery: WebhookDelivery) -> Self {
        Self { registry, delivery }
    }

    /// Deliver `event` once to every matching config, concurrently.
    ///
    /// One target failing or hanging never prevents delivery to the others;
    /// each attempt is bounded by the delivery client's timeout.
    pub async fn dispatch(&self, event: &ChangeEvent) -> DispatchReport {
        let configs = match self
            .registry
            .find_active_configs_for(&event.collection, event.action)
            .await
        {
            Ok(configs) => configs,
            Err(e) => {
                tracing::error!(
                    collection = %event.collection,
                    action = %event.action,
                    error = %e,
                    "Webhook registry lookup failed, event not dispatched"
                );
                return DispatchReport::default();
            }
        };

        if configs.is_empty() {
            tracing::debug!(
                collection = %event.collection,
                action = %event.action,
                "No webhook configs match event"
            );
            return DispatchReport::default();
        }

        let body = match serde_json::to_vec(event) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize change event");
                return DispatchReport {
                    delivered: Vec::new(),
                    failed: configs.into_iter().map(|c| c.name).collect(),
                };
            }
        };

        let attempts = configs.iter().map(|config| {
            let body = &body;
            async move { (config, self.delivery.deliver(config, body).await) }
        });

        let mut report = DispatchReport::default();
        for (config, result) in join_all(attempts).await {
            match result {
                Ok(_) => report.delivered.push(config.name.clone()),
                Err(e) => {
                    tracing::warn!(
                        webhook = %config.name,
                        destination = %config.destination,
                        collection = %event.collection,
                        action = %event.action,
                        timeout = e.is_timeout(),
                        error = %e,
                        "Webhook delivery failed"
                    );
                    report.failed.push(config.name.clone());
                }
            }
        }

        tracing::info!(
            collection = %event.collection,
            action = %event.action,
            record_id = event.record_id().unwrap_or("-"),
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Change event dispatched"
        );
        report
    }

    /// Consume the change bus until it closes or `cancel` fires.
    ///
    /// Each event is dispatched on its own task so a slow target does not
    /// hold up later events. In-flight dispatches are awaited before return.
    pub async fn run(
        self: Arc<Self>,
        mut receiver: broadcast::Receiver<ChangeEvent>,
        cancel: CancellationToken,
    ) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dispatcher cancelled");
                    break;
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                received = receiver.recv() => match received {
                    Ok(event) => {
                        let dispatcher = Arc::clone(&self);
                        in_flight.spawn(async move {
                            dispatcher.dispatch(&event).await;
                        });
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            skipped = n,
                            "Dispatcher lagged, some change events were not dispatched"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Change bus closed, dispatcher shutting down");
                        break;
                    }
                },
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight dispatches");
        }
        while in_flight.join_next().await.is_some() {}
    }
}
