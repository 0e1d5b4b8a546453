//! Producer side of cache revalidation.
//!
//! Committed record changes flow through this crate on their way out to the
//! registered webhook targets:
//!
//! - [`ChangeBus`]: in-process broadcast of committed [`ChangeEvent`]s.
//! - [`ChangeListener`]: after-commit hook that turns Postgres `NOTIFY`
//!   payloads into bus events.
//! - [`registry`]: where matching [`WebhookConfig`]s come from.
//! - [`Dispatcher`]: fans each event out to every matching target.
//! - [`delivery`]: the single-attempt HTTP POST to one target.
//!
//! [`ChangeEvent`]: sitecache_core::change_event::ChangeEvent
//! [`WebhookConfig`]: sitecache_core::webhook_config::WebhookConfig

pub mod bus;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod listener;
pub mod registry;

pub use bus::ChangeBus;
pub use config::DispatchConfig;
pub use delivery::webhook::{DeliveryError, WebhookDelivery};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use listener::ChangeListener;
pub use registry::{InMemoryRegistry, PgWebhookRegistry, RegistryError, WebhookRegistry};
