//! Row struct for the `webhook_configs` table.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sitecache_core::change_event::ChangeAction;
use sitecache_core::error::CoreError;
use sitecache_core::types::{DbId, Timestamp};
use sitecache_core::webhook_config::WebhookConfig;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A webhook registration row.
///
/// `signing_secret` is never serialized so rows can be printed or returned
/// from admin tooling without leaking it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookConfigRow {
    pub id: DbId,
    pub name: String,
    pub collection: String,
    pub destination: String,
    pub headers: serde_json::Value,
    pub active: bool,
    pub event_types: Vec<String>,
    #[serde(skip_serializing)]
    pub signing_secret: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WebhookConfigRow {
    /// Convert into the domain type used on the dispatch path.
    ///
    /// Fails when `headers` is not a string map or `event_types` holds an
    /// unknown action; both can only happen through hand-edited rows.
    pub fn into_config(self) -> Result<WebhookConfig, CoreError> {
        let headers: BTreeMap<String, String> = serde_json::from_value(self.headers)
            .map_err(|e| {
                CoreError::Validation(format!(
                    "webhook config {} has non-string headers: {e}",
                    self.id
                ))
            })?;

        let event_types = self
            .event_types
            .iter()
            .map(|s| s.parse::<ChangeAction>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(WebhookConfig {
            name: self.name,
            collection: self.collection,
            destination: self.destination,
            headers,
            active: self.active,
            event_types,
            signing_secret: self.signing_secret,
        })
    }
}

/// Column values for an insert, derived from a validated [`WebhookConfig`].
pub(crate) fn event_types_column(config: &WebhookConfig) -> Vec<String> {
    config
        .event_types
        .iter()
        .map(|a| a.as_str().to_string())
        .collect()
}

pub(crate) fn headers_column(config: &WebhookConfig) -> serde_json::Value {
    serde_json::Value::Object(
        config
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
