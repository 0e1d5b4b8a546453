//! Serve-or-render for page requests.
//!
//! Regeneration is lazy: invalidation only marks entries stale, and the next
//! request for a stale, expired or missing page re-renders it from the
//! content source and stores the fresh document. Concurrent misses for the
//! same path share one render through a per-path refresh lock.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;

use super::store::{CacheEntry, CacheError, CacheStore};
use crate::content::{ContentSource, PagePlan, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServedPage {
    pub body: Value,
    pub status: CacheStatus,
}

pub struct PageCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn ContentSource>,
    ttl: Duration,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PageCache {
    pub fn new(store: Arc<dyn CacheStore>, source: Arc<dyn ContentSource>, ttl: Duration) -> Self {
        Self {
            store,
            source,
            ttl,
            refresh_locks: DashMap::new(),
        }
    }

    /// Serve `path` (already normalized) from cache, rendering on a miss.
    ///
    /// Store failures degrade to rendering without caching; only an unknown
    /// page or a content source failure is an error.
    pub async fn serve(&self, path: &str) -> Result<ServedPage, RenderError> {
        let plan =
            PagePlan::resolve(path).ok_or_else(|| RenderError::UnknownPage(path.to_string()))?;

        if let Some(page) = self.cached(path).await {
            return Ok(page);
        }

        let result = self.with_refresh_lock(path, || self.regenerate(path, &plan)).await;
        self.refresh_locks
            .remove_if(path, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn with_refresh_lock<F, Fut, T>(&self, path: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let lock = self
            .refresh_locks
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        let _guard = lock.lock().await;
        f().await
    }

    /// Called with the refresh lock held.
    async fn regenerate(&self, path: &str, plan: &PagePlan) -> Result<ServedPage, RenderError> {
        // Another request may have rendered the page while we waited.
        if let Some(page) = self.cached(path).await {
            return Ok(page);
        }

        let rendered_at = match self.store.revision().await {
            Ok(revision) => Some(revision),
            Err(e) => {
                log_store_error(path, "revision", &e);
                None
            }
        };

        let body = plan.render(self.source.as_ref()).await?;
        if let Some(rendered_at) = rendered_at {
            let entry = CacheEntry::new(body.clone(), plan.tags(), self.ttl);
            match self.store.put(path, entry, rendered_at).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!(path, "Page invalidated during render, stored stale"),
                Err(e) => log_store_error(path, "write", &e),
            }
        }

        tracing::debug!(path, "Page regenerated");
        Ok(ServedPage {
            body,
            status: CacheStatus::Miss,
        })
    }

    async fn cached(&self, path: &str) -> Option<ServedPage> {
        match self.store.get(path).await {
            Ok(Some(entry)) if entry.is_fresh() => Some(ServedPage {
                body: entry.body,
                status: CacheStatus::Hit,
            }),
            Ok(_) => None,
            Err(e) => {
                log_store_error(path, "read", &e);
                None
            }
        }
    }
}

fn log_store_error(path: &str, op: &'static str, error: &CacheError) {
    tracing::warn!(path, op, error = %error, "Page cache unavailable, serving uncached");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
