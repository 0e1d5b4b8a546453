use axum::routing::get;
use axum::Router;

use crate::handlers::cron;
use crate::state::AppState;

/// Routes mounted at `/api/cron`.
pub fn router() -> Router<AppState> {
    Router::new().route("/revalidate", get(cron::cron_get).post(cron::cron_post))
}
