use axum::routing::post;
use axum::Router;

use crate::handlers::revalidate;
use crate::state::AppState;

/// Routes mounted at `/api/revalidate`.
///
/// ```text
/// POST /collection    derived tags + paths        (revalidation key)
/// POST /tag           explicit tags               (revalidation key)
/// POST /path          explicit paths              (revalidation key)
/// POST /all           full flush, rate limited    (admin key)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collection", post(revalidate::revalidate_collection))
        .route("/tag", post(revalidate::revalidate_tags))
        .route("/path", post(revalidate::revalidate_paths))
        .route("/all", post(revalidate::revalidate_all))
}
