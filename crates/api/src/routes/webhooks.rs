use axum::routing::get;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/api/webhooks`.
///
/// ```text
/// GET  /{source}    liveness
/// POST /{source}    receive a change event
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{source}", get(webhooks::status).post(webhooks::receive))
}
