//! Outbound webhook registrations and the dispatch matching rule.
//!
//! A [`WebhookConfig`] is created ahead of time by an administrator and is
//! read-only on the dispatch path. [`WebhookConfig::matches`] is the single
//! predicate every registry implementation applies, independent of storage.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::change_event::ChangeAction;
use crate::error::CoreError;

fn default_active() -> bool {
    true
}

/// One outbound notification target for one monitored collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WebhookConfig {
    /// Human-readable label used in logs.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    /// Name of the monitored collection (case-sensitive).
    #[validate(length(min = 1, message = "collection must not be empty"))]
    pub collection: String,

    /// Absolute `http(s)` URL the event is POSTed to.
    #[validate(url(message = "destination must be a well-formed URL"))]
    pub destination: String,

    /// Extra request headers, e.g. `x-webhook-secret`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Inactive configs never receive deliveries.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Actions this target wants. Empty means all actions.
    #[serde(default)]
    pub event_types: BTreeSet<ChangeAction>,

    /// When set, deliveries carry an HMAC-SHA256 body signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,
}

impl WebhookConfig {
    /// An active config for all actions, with no extra headers.
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            destination: destination.into(),
            headers: BTreeMap::new(),
            active: true,
            event_types: BTreeSet::new(),
            signing_secret: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_event_types(mut self, actions: impl IntoIterator<Item = ChangeAction>) -> Self {
        self.event_types = actions.into_iter().collect();
        self
    }

    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = Some(secret.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether an event for `(collection, action)` should be delivered here.
    ///
    /// `collection == self.collection && active && (event_types empty || action ∈ event_types)`
    pub fn matches(&self, collection: &str, action: ChangeAction) -> bool {
        self.active
            && self.collection == collection
            && (self.event_types.is_empty() || self.event_types.contains(&action))
    }

    /// Validate field invariants, returning a [`CoreError::Validation`] that
    /// lists every violation.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let lower = self.destination.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(CoreError::Validation(format!(
                "destination must be an absolute http(s) URL, got '{}'",
                self.destination
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
