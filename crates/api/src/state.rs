use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, InvalidationEngine, PageCache};
use crate::config::ServerConfig;
use crate::content::ContentSource;
use crate::middleware::flush_guard::FlushGuard;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The cache store
/// behind `engine` and `pages` is the only shared mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub engine: Arc<InvalidationEngine>,
    pub pages: Arc<PageCache>,
    pub flush_guard: Arc<FlushGuard>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn CacheStore>,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        let engine = Arc::new(InvalidationEngine::new(Arc::clone(&store)));
        let pages = Arc::new(PageCache::new(
            store,
            source,
            Duration::from_secs(config.cache_ttl_secs),
        ));
        let flush_guard = Arc::new(FlushGuard::new(Duration::from_secs(
            config.full_flush_min_interval_secs,
        )));

        Self {
            config: Arc::new(config),
            engine,
            pages,
            flush_guard,
        }
    }
}
