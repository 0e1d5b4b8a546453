//! Cached page delivery.

use axum::extract::{Path, State};
use axum::http::HeaderName;
use axum::response::IntoResponse;
use axum::Json;

use crate::content::pages::normalize_path;
use crate::error::AppResult;
use crate::state::AppState;

/// Response header reporting whether the page came from cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// GET /
pub async fn serve_root(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    serve(&state, "/").await
}

/// GET /{*path}
pub async fn serve_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> AppResult<impl IntoResponse> {
    serve(&state, &normalize_path(&path)).await
}

async fn serve(state: &AppState, path: &str) -> AppResult<impl IntoResponse> {
    let page = state.pages.serve(path).await?;
    Ok(([(X_CACHE, page.status.as_str())], Json(page.body)))
}
