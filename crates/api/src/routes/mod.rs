pub mod cron;
pub mod health;
pub mod pages;
pub mod revalidate;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /webhooks/{source}          GET liveness, POST change event
/// /revalidate/collection      POST
/// /revalidate/tag             POST
/// /revalidate/path            POST
/// /revalidate/all             POST (admin)
/// /cron/revalidate            GET | POST
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/webhooks", webhooks::router())
        .nest("/revalidate", revalidate::router())
        .nest("/cron", cron::router())
}
