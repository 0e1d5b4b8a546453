//! External scheduler entry point for revalidation sweeps.

use std::str::FromStr;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitecache_core::sweep::SweepFrequency;
use sitecache_core::types::Timestamp;

use super::parse_json_body;
use crate::background::sweep::run_sweep;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CronSecret;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CronParams {
    pub frequency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CronResponse {
    pub success: bool,
    pub frequency: SweepFrequency,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_tags: Vec<String>,
    pub duration_ms: u64,
    pub timestamp: Timestamp,
}

/// GET /api/cron/revalidate?frequency=hourly|daily|weekly
pub async fn cron_get(
    _auth: CronSecret,
    State(state): State<AppState>,
    Query(params): Query<CronParams>,
) -> AppResult<Json<CronResponse>> {
    sweep(&state, params.frequency.as_deref()).await
}

/// POST /api/cron/revalidate
///
/// Accepts the frequency in the query string or as `{"frequency": ...}`;
/// the query string wins.
pub async fn cron_post(
    _auth: CronSecret,
    State(state): State<AppState>,
    Query(params): Query<CronParams>,
    body: Bytes,
) -> AppResult<Json<CronResponse>> {
    let from_body = if params.frequency.is_none() && !body.is_empty() {
        parse_json_body::<CronParams>(&body)?.frequency
    } else {
        None
    };

    sweep(&state, params.frequency.as_deref().or(from_body.as_deref())).await
}

async fn sweep(state: &AppState, frequency: Option<&str>) -> AppResult<Json<CronResponse>> {
    let started = Instant::now();

    let frequency = frequency
        .ok_or_else(|| AppError::BadRequest("frequency is required".into()))
        .and_then(|f| SweepFrequency::from_str(f.trim()).map_err(AppError::from))?;

    let report = run_sweep(&state.engine, frequency).await?;

    Ok(Json(CronResponse {
        success: true,
        frequency,
        tags: report.revalidated.tags.into_iter().collect(),
        failed_tags: report.failed.tags.into_iter().collect(),
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        timestamp: Utc::now(),
    }))
}
