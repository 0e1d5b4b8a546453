#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sitecache_api::cache::{CacheEntry, CacheError, CacheStore, MemoryCacheStore, Revision};
use sitecache_api::config::ServerConfig;
use sitecache_api::content::{ContentError, ContentSource};
use sitecache_api::router::build_app_router;
use sitecache_api::state::AppState;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const REVALIDATION_KEY: &str = "test-revalidation-key";
pub const ADMIN_KEY: &str = "test-admin-key";
pub const CRON_SECRET: &str = "test-cron-secret";

/// Build a test `ServerConfig` with every secret set and a 30-second
/// request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        data_service_url: "http://127.0.0.1:0".to_string(),
        webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        webhook_signing_secret: None,
        revalidation_api_key: Some(REVALIDATION_KEY.to_string()),
        admin_api_key: Some(ADMIN_KEY.to_string()),
        cron_secret: Some(CRON_SECRET.to_string()),
        cache_ttl_secs: 3600,
        full_flush_min_interval_secs: 300,
        sweep_schedule_enabled: false,
    }
}

// ---------------------------------------------------------------------------
// Cache store spy
// ---------------------------------------------------------------------------

/// [`MemoryCacheStore`] that counts invalidation calls and can be switched
/// to fail as a whole or for single keys.
#[derive(Default)]
pub struct SpyStore {
    pub inner: MemoryCacheStore,
    pub invalidate_calls: AtomicUsize,
    pub unavailable: AtomicBool,
    pub failing_keys: Mutex<HashSet<String>>,
}

impl SpyStore {
    pub fn invalidations(&self) -> usize {
        self.invalidate_calls.load(Ordering::SeqCst)
    }

    /// Invalidating `key` fails with a per-key backend error.
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("spy store offline".into()))
        } else {
            Ok(())
        }
    }

    fn check_key(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(CacheError::Backend {
                key: key.to_string(),
                reason: "write timeout".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SpyStore {
    async fn get(&self, path: &str) -> Result<Option<CacheEntry>, CacheError> {
        self.check()?;
        self.inner.get(path).await
    }

    async fn revision(&self) -> Result<Revision, CacheError> {
        self.check()?;
        self.inner.revision().await
    }

    async fn put(
        &self,
        path: &str,
        entry: CacheEntry,
        rendered_at: Revision,
    ) -> Result<bool, CacheError> {
        self.check()?;
        self.inner.put(path, entry, rendered_at).await
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, CacheError> {
        self.invalidate_calls.fetch_add(1, Ordering::SeqCst);
        self.check_key(tag)?;
        self.inner.invalidate_tag(tag).await
    }

    async fn invalidate_path(&self, path: &str) -> Result<usize, CacheError> {
        self.invalidate_calls.fetch_add(1, Ordering::SeqCst);
        self.check_key(path)?;
        self.inner.invalidate_path(path).await
    }

    async fn invalidate_all(&self) -> Result<usize, CacheError> {
        self.invalidate_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.invalidate_all().await
    }
}

// ---------------------------------------------------------------------------
// Content source fake
// ---------------------------------------------------------------------------

/// In-memory content source. Collections without records return an empty
/// list; blog filters of the form `slug="..."` are honoured.
#[derive(Default)]
pub struct FakeSource {
    pub records: HashMap<String, Vec<Value>>,
    pub fetches: AtomicUsize,
    pub failing: AtomicBool,
}

impl FakeSource {
    pub fn with_records(mut self, collection: &str, records: Vec<Value>) -> Self {
        self.records.insert(collection.to_string(), records);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch_collection(
        &self,
        collection: &str,
        filter: Option<&str>,
    ) -> Result<Vec<Value>, ContentError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ContentError::HttpStatus(503));
        }

        let records = self.records.get(collection).cloned().unwrap_or_default();
        let slug = filter
            .and_then(|f| f.strip_prefix("slug=\""))
            .and_then(|f| f.strip_suffix('"'));

        Ok(match slug {
            Some(slug) => records.into_iter().filter(|r| r["slug"] == slug).collect(),
            None => records,
        })
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SpyStore>,
    pub source: Arc<FakeSource>,
}

impl TestApp {
    /// A fresh clone of the router for one `oneshot` call.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers, exactly as
/// `main.rs` does, over a spy store and a fake content source.
pub fn build_test_app_with(config: ServerConfig, source: FakeSource) -> TestApp {
    let store = Arc::new(SpyStore::default());
    let source = Arc::new(source);
    let state = AppState::new(
        config.clone(),
        Arc::clone(&store) as Arc<dyn CacheStore>,
        Arc::clone(&source) as Arc<dyn ContentSource>,
    );

    TestApp {
        router: build_app_router(state, &config),
        store,
        source,
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), FakeSource::default())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    get_with(app, uri, &[]).await
}

pub async fn get_with(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_raw(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: impl Into<Body>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(body.into()).unwrap()).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: Value,
) -> Response<Body> {
    post_raw(app, uri, headers, serde_json::to_vec(&body).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
