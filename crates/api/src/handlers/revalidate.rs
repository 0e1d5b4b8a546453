//! Manual revalidation endpoints.
//!
//! `collection`, `tag` and `path` use the revalidation key. `all` flushes
//! the whole cache and needs the admin key; it is also rate limited.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitecache_core::change_event::ChangeAction;
use sitecache_core::invalidation::InvalidationRequest;
use sitecache_core::routing::derive_invalidation;
use sitecache_core::types::{Record, Timestamp};

use super::{parse_json_body, OneOrMany};
use crate::cache::InvalidationReport;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AdminKey, RevalidationKey};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CollectionInput {
    pub collection: String,
    #[serde(default)]
    pub record: Option<Record>,
    #[serde(default)]
    pub action: Option<ChangeAction>,
}

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub tags: OneOrMany<String>,
}

#[derive(Debug, Deserialize)]
pub struct PathInput {
    pub paths: OneOrMany<String>,
}

#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub success: bool,
    pub endpoint: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ChangeAction>,
    pub revalidated: InvalidationRequest,
    #[serde(skip_serializing_if = "InvalidationRequest::is_empty")]
    pub failed: InvalidationRequest,
    pub duration_ms: u64,
    pub timestamp: Timestamp,
}

impl RevalidateResponse {
    fn new(endpoint: &'static str, report: InvalidationReport, started: Instant) -> Self {
        Self {
            success: true,
            endpoint,
            collection: None,
            action: None,
            revalidated: report.revalidated,
            failed: report.failed,
            duration_ms: elapsed_ms(started),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub success: bool,
    pub endpoint: &'static str,
    pub invalidated_entries: usize,
    pub duration_ms: u64,
    pub timestamp: Timestamp,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Trim entries and reject blanks.
fn non_blank(values: Vec<String>, field: &str) -> AppResult<Vec<String>> {
    if values.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    values
        .into_iter()
        .map(|v| {
            let v = v.trim().to_string();
            if v.is_empty() {
                Err(AppError::BadRequest(format!("{field} must not contain blank entries")))
            } else {
                Ok(v)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/revalidate/collection
///
/// Same derivation as an inbound webhook, without needing the event.
pub async fn revalidate_collection(
    _auth: RevalidationKey,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RevalidateResponse>> {
    let started = Instant::now();
    let input: CollectionInput = parse_json_body(&body)?;

    let collection = input.collection.trim().to_string();
    if collection.is_empty() {
        return Err(AppError::BadRequest("collection must not be empty".into()));
    }

    let request = derive_invalidation(&collection, input.record.as_ref());
    let report = state.engine.invalidate(&request).await?;

    tracing::info!(
        %collection,
        tags = report.revalidated.tags.len(),
        paths = report.revalidated.paths.len(),
        "Manual collection revalidation"
    );

    let mut response = RevalidateResponse::new("collection", report, started);
    response.collection = Some(collection);
    response.action = input.action;
    Ok(Json(response))
}

/// POST /api/revalidate/tag
pub async fn revalidate_tags(
    _auth: RevalidationKey,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RevalidateResponse>> {
    let started = Instant::now();
    let input: TagInput = parse_json_body(&body)?;
    let tags = non_blank(input.tags.into_vec(), "tags")?;

    let report = state
        .engine
        .invalidate(&InvalidationRequest::from_tags(tags))
        .await?;

    tracing::info!(tags = ?report.revalidated.tags, "Manual tag revalidation");
    Ok(Json(RevalidateResponse::new("tag", report, started)))
}

/// POST /api/revalidate/path
pub async fn revalidate_paths(
    _auth: RevalidationKey,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RevalidateResponse>> {
    let started = Instant::now();
    let input: PathInput = parse_json_body(&body)?;
    let paths = non_blank(input.paths.into_vec(), "paths")?;

    if let Some(bad) = paths.iter().find(|p| !p.starts_with('/')) {
        return Err(AppError::BadRequest(format!(
            "path '{bad}' must start with '/'"
        )));
    }

    let report = state
        .engine
        .invalidate(&InvalidationRequest::from_paths(paths))
        .await?;

    tracing::info!(paths = ?report.revalidated.paths, "Manual path revalidation");
    Ok(Json(RevalidateResponse::new("path", report, started)))
}

/// POST /api/revalidate/all
///
/// Full flush. At most one per `FULL_FLUSH_MIN_INTERVAL_SECS`.
pub async fn revalidate_all(
    _auth: AdminKey,
    State(state): State<AppState>,
) -> AppResult<Json<FlushResponse>> {
    let started = Instant::now();

    let claim = state
        .flush_guard
        .try_acquire()
        .await
        .map_err(|retry_after_secs| {
            tracing::warn!(retry_after_secs, "Full flush refused by rate limit");
            AppError::TooManyRequests { retry_after_secs }
        })?;

    let invalidated_entries = match state.engine.invalidate_all().await {
        Ok(marked) => marked,
        Err(e) => {
            state.flush_guard.release(claim).await;
            return Err(e.into());
        }
    };

    Ok(Json(FlushResponse {
        success: true,
        endpoint: "all",
        invalidated_entries,
        duration_ms: elapsed_ms(started),
        timestamp: Utc::now(),
    }))
}
