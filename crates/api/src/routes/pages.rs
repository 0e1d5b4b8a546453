use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Site pages. The catch-all ranks below every static route.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::serve_root))
        .route("/{*path}", get(pages::serve_page))
}
