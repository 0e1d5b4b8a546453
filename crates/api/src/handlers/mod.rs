pub mod cron;
pub mod pages;
pub mod revalidate;
pub mod webhooks;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Decode a JSON request body, mapping every failure to 400.
///
/// Only the body size is logged; payloads may carry record contents.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(payload_bytes = body.len(), error = %e, "Rejected malformed JSON body");
        AppError::BadRequest(format!("Invalid JSON body: {e}"))
    })
}

/// A field accepting either a single value or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(v) => v,
        }
    }
}
