//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod webhook_config_repo;

pub use webhook_config_repo::{RepoError, WebhookConfigRepo};
