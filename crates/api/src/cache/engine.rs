//! Applies invalidation requests to a [`CacheStore`].
//!
//! Every tag and path in a request is attempted. A failure on one key is
//! logged and recorded in [`InvalidationReport::failed`] while the rest
//! proceed; only [`CacheError::Unavailable`] aborts the request.

use std::sync::Arc;

use serde::Serialize;
use sitecache_core::invalidation::InvalidationRequest;

use super::store::{CacheError, CacheStore};

/// What an invalidation actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    pub revalidated: InvalidationRequest,
    pub failed: InvalidationRequest,
}

impl InvalidationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct InvalidationEngine {
    store: Arc<dyn CacheStore>,
}

impl InvalidationEngine {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Mark every tag and path in `request` stale.
    ///
    /// Idempotent: applying the same request twice leaves the store in the
    /// same state as applying it once.
    pub async fn invalidate(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReport, CacheError> {
        let mut report = InvalidationReport::default();

        for tag in &request.tags {
            match self.store.invalidate_tag(tag).await {
                Ok(marked) => {
                    tracing::debug!(tag = %tag, marked, "Tag invalidated");
                    report.revalidated.add_tag(tag.clone());
                }
                Err(CacheError::Backend { reason, .. }) => {
                    tracing::warn!(tag = %tag, error = %reason, "Tag invalidation failed");
                    report.failed.add_tag(tag.clone());
                }
                Err(e @ CacheError::Unavailable(_)) => return Err(e),
            }
        }

        for path in &request.paths {
            match self.store.invalidate_path(path).await {
                Ok(marked) => {
                    tracing::debug!(path = %path, marked, "Path invalidated");
                    report.revalidated.add_path(path.clone());
                }
                Err(CacheError::Backend { reason, .. }) => {
                    tracing::warn!(path = %path, error = %reason, "Path invalidation failed");
                    report.failed.add_path(path.clone());
                }
                Err(e @ CacheError::Unavailable(_)) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Mark every cached entry stale. Only reachable from the admin flush.
    pub async fn invalidate_all(&self) -> Result<usize, CacheError> {
        let marked = self.store.invalidate_all().await?;
        tracing::warn!(marked, "Full cache flush");
        Ok(marked)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
