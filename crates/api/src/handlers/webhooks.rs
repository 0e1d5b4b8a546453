//! Inbound change notifications from the data service.
//!
//! `POST /api/webhooks/{source}`: authorize, parse, map the collection to
//! cache targets, invalidate. Nothing is invalidated unless the caller is
//! authorized and the payload is well-formed.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use sitecache_core::change_event::{ChangeAction, ChangeEvent};
use sitecache_core::error::CoreError;
use sitecache_core::invalidation::InvalidationRequest;
use sitecache_core::routing::derive_invalidation;
use sitecache_core::secret::{verify_payload_signature, SIGNATURE_HEADER};
use sitecache_core::types::Timestamp;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::WebhookSecret;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub source: String,
    pub action: ChangeAction,
    pub collection: String,
    pub revalidated: InvalidationRequest,
    #[serde(skip_serializing_if = "InvalidationRequest::is_empty")]
    pub failed: InvalidationRequest,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct WebhookStatus {
    pub success: bool,
    pub message: &'static str,
    pub source: String,
    pub timestamp: Timestamp,
}

/// POST /api/webhooks/{source}
pub async fn receive(
    _auth: WebhookSecret,
    State(state): State<AppState>,
    Path(source): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    if let Some(signing_secret) = state.config.webhook_signing_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_payload_signature(signing_secret, &body, signature) {
            tracing::warn!(%source, "Rejected webhook: bad or missing body signature");
            return Err(AppError::Core(CoreError::Unauthorized("Unauthorized".into())));
        }
    }

    let event = ChangeEvent::from_json(&body).map_err(|e| {
        tracing::warn!(%source, payload_bytes = body.len(), error = %e, "Rejected webhook payload");
        AppError::Core(e)
    })?;

    let request = derive_invalidation(&event.collection, Some(&event.record));
    let report = state.engine.invalidate(&request).await?;

    tracing::info!(
        %source,
        action = %event.action,
        collection = %event.collection,
        record_id = event.record_id().unwrap_or("-"),
        tags = report.revalidated.tags.len(),
        paths = report.revalidated.paths.len(),
        failed = report.failed.tags.len() + report.failed.paths.len(),
        "Webhook processed"
    );

    Ok(Json(WebhookResponse {
        success: true,
        source,
        action: event.action,
        collection: event.collection,
        revalidated: report.revalidated,
        failed: report.failed,
        timestamp: Utc::now(),
    }))
}

/// GET /api/webhooks/{source}
///
/// Liveness check for the data service's webhook configuration screen.
pub async fn status(Path(source): Path<String>) -> Json<WebhookStatus> {
    Json(WebhookStatus {
        success: true,
        message: "Webhook endpoint is active",
        source,
        timestamp: Utc::now(),
    })
}
