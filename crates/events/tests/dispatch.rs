//! Dispatcher behavior against real local HTTP targets.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::json;
use sitecache_core::change_event::{ChangeAction, ChangeEvent};
use sitecache_core::secret::{verify_payload_signature, DELIVERY_ID_HEADER, SIGNATURE_HEADER};
use sitecache_core::webhook_config::WebhookConfig;
use sitecache_events::{ChangeBus, Dispatcher, InMemoryRegistry, WebhookDelivery};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Received {
    headers: HeaderMap,
    body: Bytes,
}

#[derive(Clone)]
struct Target {
    received: Arc<Mutex<Vec<Received>>>,
    delay: Duration,
    status: StatusCode,
}

async fn handle(State(target): State<Target>, headers: HeaderMap, body: Bytes) -> StatusCode {
    target.received.lock().await.push(Received { headers, body });
    tokio::time::sleep(target.delay).await;
    target.status
}

/// Start a target on an ephemeral port. Returns its URL and request log.
async fn spawn_target(delay: Duration, status: StatusCode) -> (String, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let target = Target {
        received: Arc::clone(&received),
        delay,
        status,
    };
    let app = Router::new().route("/hook", post(handle)).with_state(target);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/hook"), received)
}

fn dispatcher(configs: Vec<WebhookConfig>, timeout: Duration) -> Dispatcher {
    Dispatcher::new(
        Arc::new(InMemoryRegistry::new(configs)),
        WebhookDelivery::new(timeout).unwrap(),
    )
}

fn blog_event(action: ChangeAction) -> ChangeEvent {
    let record = json!({"id": "x1", "slug": "hello"});
    ChangeEvent::new(action, "blogs", record.as_object().cloned().unwrap())
}

// ---------------------------------------------------------------------------
// Test: one slow target does not affect the others
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_target_does_not_block_the_others() {
    let (url_a, log_a) = spawn_target(Duration::ZERO, StatusCode::OK).await;
    let (url_b, log_b) = spawn_target(Duration::from_secs(5), StatusCode::OK).await;
    let (url_c, log_c) = spawn_target(Duration::ZERO, StatusCode::OK).await;

    let d = dispatcher(
        vec![
            WebhookConfig::new("a", "blogs", url_a),
            WebhookConfig::new("b", "blogs", url_b),
            WebhookConfig::new("c", "blogs", url_c),
        ],
        Duration::from_millis(300),
    );

    let started = Instant::now();
    let report = d.dispatch(&blog_event(ChangeAction::Update)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.delivered, ["a", "c"]);
    assert_eq!(report.failed, ["b"]);
    assert_eq!(log_a.lock().await.len(), 1);
    assert_eq!(log_b.lock().await.len(), 1);
    assert_eq!(log_c.lock().await.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: error statuses and unreachable targets are contained
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_targets_are_reported_not_propagated() {
    let (ok_url, ok_log) = spawn_target(Duration::ZERO, StatusCode::NO_CONTENT).await;
    let (err_url, _) = spawn_target(Duration::ZERO, StatusCode::INTERNAL_SERVER_ERROR).await;

    // Bind then drop a listener so the port is closed.
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_url = format!("http://{}/hook", closed.local_addr().unwrap());
    drop(closed);

    let d = dispatcher(
        vec![
            WebhookConfig::new("ok", "blogs", ok_url),
            WebhookConfig::new("500", "blogs", err_url),
            WebhookConfig::new("closed", "blogs", closed_url),
        ],
        Duration::from_secs(2),
    );

    let report = d.dispatch(&blog_event(ChangeAction::Create)).await;

    assert_eq!(report.delivered, ["ok"]);
    assert_eq!(report.failed, ["500", "closed"]);
    assert_eq!(ok_log.lock().await.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: unmatched event type is never delivered
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_only_config_is_skipped_for_delete() {
    let (url, log) = spawn_target(Duration::ZERO, StatusCode::OK).await;

    let d = dispatcher(
        vec![WebhookConfig::new("creates", "blogs", url).with_event_types([ChangeAction::Create])],
        Duration::from_secs(2),
    );

    let report = d.dispatch(&blog_event(ChangeAction::Delete)).await;

    assert_eq!(report.attempted(), 0);
    assert!(log.lock().await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: request carries payload, configured headers and signature
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivery_sends_event_json_with_headers() {
    let (url, log) = spawn_target(Duration::ZERO, StatusCode::OK).await;

    let d = dispatcher(
        vec![WebhookConfig::new("signed", "blogs", url)
            .with_header("x-webhook-secret", "s3cret")
            .with_signing_secret("sign-key")],
        Duration::from_secs(2),
    );

    let report = d.dispatch(&blog_event(ChangeAction::Update)).await;
    assert_eq!(report.delivered, ["signed"]);

    let log = log.lock().await;
    let req = &log[0];
    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(body["action"], "update");
    assert_eq!(body["collection"], "blogs");
    assert_eq!(body["record"]["slug"], "hello");

    assert_eq!(req.headers["content-type"], "application/json");
    assert_eq!(req.headers["x-webhook-secret"], "s3cret");
    assert!(req.headers.contains_key(DELIVERY_ID_HEADER));
    let sig = req.headers[SIGNATURE_HEADER].to_str().unwrap();
    assert!(verify_payload_signature("sign-key", &req.body, sig));
}

// ---------------------------------------------------------------------------
// Test: run() drains the bus until cancelled
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_dispatches_bus_events_until_cancelled() {
    let (url, log) = spawn_target(Duration::ZERO, StatusCode::OK).await;
    let d = Arc::new(dispatcher(
        vec![WebhookConfig::new("bus", "blogs", url)],
        Duration::from_secs(2),
    ));

    let bus = ChangeBus::default();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(Arc::clone(&d).run(bus.subscribe(), cancel.clone()));

    bus.publish(blog_event(ChangeAction::Create));

    let deadline = Instant::now() + Duration::from_secs(5);
    while log.lock().await.is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(log.lock().await.len(), 1);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("dispatcher should stop after cancel")
        .unwrap();
}
