//! Webhook-to-page round trip: a cached page is served from cache until a
//! matching change event arrives, then regenerated on the next request.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app_with, get, post_json, test_config, FakeSource, WEBHOOK_SECRET,
};
use serde_json::json;

fn source() -> FakeSource {
    FakeSource::default()
        .with_records(
            "blogs",
            vec![
                json!({ "id": "r1", "slug": "my-post", "title": "My post" }),
                json!({ "id": "r2", "slug": "other-post", "title": "Other" }),
            ],
        )
        .with_records("pricing_plans", vec![json!({ "id": "p1", "name": "Basic" })])
}

fn x_cache(response: &axum::http::Response<axum::body::Body>) -> &str {
    response
        .headers()
        .get("x-cache")
        .expect("x-cache header must be present")
        .to_str()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: MISS, HIT, webhook, MISS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blog_post_is_regenerated_after_webhook() {
    let t = build_test_app_with(test_config(), source());

    let first = get(t.app(), "/blog/my-post").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(x_cache(&first), "MISS");
    let json = body_json(first).await;
    assert_eq!(json["path"], "/blog/my-post");
    assert_eq!(json["sections"]["post"]["title"], "My post");

    let second = get(t.app(), "/blog/my-post").await;
    assert_eq!(x_cache(&second), "HIT");
    let fetches_before = t.source.fetch_count();

    let webhook = post_json(
        t.app(),
        "/api/webhooks/data-service",
        &[("x-webhook-secret", WEBHOOK_SECRET)],
        json!({
            "action": "update",
            "collection": "blogs",
            "record": { "id": "r1", "slug": "my-post" }
        }),
    )
    .await;
    assert_eq!(webhook.status(), StatusCode::OK);

    let third = get(t.app(), "/blog/my-post").await;
    assert_eq!(x_cache(&third), "MISS");
    assert!(t.source.fetch_count() > fetches_before);
}

// ---------------------------------------------------------------------------
// Test: a change only invalidates pages that read the changed collection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unrelated_pages_stay_cached() {
    let t = build_test_app_with(test_config(), source());

    assert_eq!(x_cache(&get(t.app(), "/pricing").await), "MISS");
    assert_eq!(x_cache(&get(t.app(), "/blog/other-post").await), "MISS");

    let webhook = post_json(
        t.app(),
        "/api/webhooks/data-service",
        &[("x-webhook-secret", WEBHOOK_SECRET)],
        json!({
            "action": "update",
            "collection": "blogs",
            "record": { "id": "r1", "slug": "my-post" }
        }),
    )
    .await;
    assert_eq!(webhook.status(), StatusCode::OK);

    assert_eq!(x_cache(&get(t.app(), "/pricing").await), "HIT");
    // The `blogs` tag covers every post.
    assert_eq!(x_cache(&get(t.app(), "/blog/other-post").await), "MISS");
}

#[tokio::test]
async fn pricing_change_regenerates_pricing_page() {
    let t = build_test_app_with(test_config(), source());

    assert_eq!(x_cache(&get(t.app(), "/pricing").await), "MISS");
    assert_eq!(x_cache(&get(t.app(), "/pricing").await), "HIT");

    post_json(
        t.app(),
        "/api/webhooks/data-service",
        &[("x-webhook-secret", WEBHOOK_SECRET)],
        json!({ "action": "create", "collection": "pricing_plans", "record": { "id": "p2" } }),
    )
    .await;

    let response = get(t.app(), "/pricing").await;
    assert_eq!(x_cache(&response), "MISS");
    let json = body_json(response).await;
    assert_eq!(json["sections"]["pricing_plans"][0]["name"], "Basic");
}
