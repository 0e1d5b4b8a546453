//! Domain types and pure logic for webhook-driven cache revalidation.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! producer (`sitecache-events`, `sitecache-worker`) and the consumer
//! (`sitecache-api`) without either pulling in the other.
//!
//! - [`change_event`]: the `{action, collection, record}` payload.
//! - [`webhook_config`]: outbound target registrations and the matching rule.
//! - [`invalidation`]: the set of tags/paths one event invalidates.
//! - [`routing`]: the collection → tags/paths table.
//! - [`sweep`]: static tag sets for scheduled revalidation.
//! - [`secret`]: shared-secret and body-signature verification.

pub mod change_event;
pub mod error;
pub mod invalidation;
pub mod routing;
pub mod secret;
pub mod sweep;
pub mod types;
pub mod webhook_config;
