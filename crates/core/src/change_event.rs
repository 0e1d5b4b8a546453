//! The change notification emitted after a record mutation commits.
//!
//! A [`ChangeEvent`] is produced once per committed create/update/delete and
//! is never mutated afterwards. The `record` field is kept as a generic
//! string-keyed map; consumers read only the fields they need through
//! [`ChangeEvent::record_str`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Record;

// ---------------------------------------------------------------------------
// ChangeAction
// ---------------------------------------------------------------------------

/// The kind of mutation that produced a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    /// All actions, in wire order.
    pub const ALL: [ChangeAction; 3] = [Self::Create, Self::Update, Self::Delete];

    /// Wire name of the action (`"create"`, `"update"`, `"delete"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeAction {
    type Err = CoreError;

    /// Parse a wire name. Postgres trigger operation names (`INSERT`,
    /// `UPDATE`, `DELETE`) are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" | "insert" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(CoreError::Validation(format!(
                "unknown action '{other}', expected one of: create, update, delete"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// One create/update/delete on a monitored collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub action: ChangeAction,
    pub collection: String,
    pub record: Record,
}

impl ChangeEvent {
    pub fn new(action: ChangeAction, collection: impl Into<String>, record: Record) -> Self {
        Self {
            action,
            collection: collection.into(),
            record,
        }
    }

    /// Parse and validate a JSON payload.
    ///
    /// Fails with [`CoreError::Validation`] when a required field is missing,
    /// `record` is not an object, `action` is not a known action, or
    /// `collection` is blank.
    pub fn from_json(body: &[u8]) -> Result<Self, CoreError> {
        let event: ChangeEvent = serde_json::from_slice(body)
            .map_err(|e| CoreError::Validation(format!("invalid change event payload: {e}")))?;

        if event.collection.trim().is_empty() {
            return Err(CoreError::Validation("collection must not be empty".into()));
        }

        Ok(event)
    }

    /// The record's unique identifier, if present.
    pub fn record_id(&self) -> Option<&str> {
        record_str(&self.record, "id")
    }

    /// A non-empty string field of the record.
    pub fn record_str(&self, field: &str) -> Option<&str> {
        record_str(&self.record, field)
    }
}

/// Read `field` from a record as a non-empty, trimmed string.
///
/// Non-string values (numbers, objects, null) yield `None`; callers never
/// assume a schema shared across collections.
pub fn record_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
