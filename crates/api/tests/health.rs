//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use common::{body_json, build_test_app, build_test_app_with, get, test_config, FakeSource};

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let t = build_test_app();
    let response = get(t.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let t = build_test_app();
    let response = get(t.app(), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // The value should be a valid UUID (36 chars with hyphens).
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: unknown pages return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_page_returns_404() {
    let t = build_test_app();
    let response = get(t.app(), "/this-page-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert_eq!(t.source.fetch_count(), 0);
}

#[tokio::test]
async fn missing_blog_post_returns_404() {
    let t = build_test_app();
    let response = get(t.app(), "/blog/no-such-post").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: data service failure surfaces as 502
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_failure_returns_502() {
    let source = FakeSource::default();
    source.failing.store(true, Ordering::SeqCst);
    let t = build_test_app_with(test_config(), source);

    let response = get(t.app(), "/pricing").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
}

// ---------------------------------------------------------------------------
// Test: the root page renders every section it reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_page_lists_its_sections() {
    let t = build_test_app();
    let response = get(t.app(), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["path"], "/");
    assert!(json["sections"]["testimonials"].is_array());
    assert!(json["sections"]["pricing_plans"].is_array());
}

#[tokio::test]
async fn trailing_slash_resolves_to_same_page() {
    let t = build_test_app();

    let first = get(t.app(), "/about/").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-cache"], "MISS");

    let second = get(t.app(), "/about").await;
    assert_eq!(second.headers()["x-cache"], "HIT");
}
