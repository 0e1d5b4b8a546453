use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sitecache_core::types::Timestamp;

/// Monotonic invalidation counter. A render records the revision it started
/// at so that invalidations landing mid-render are not lost on `put`.
pub type Revision = u64;

/// Upper bound on entry lifetime.
const MAX_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The whole store is unreachable; no key can be served or invalidated.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    /// One key failed; other keys are unaffected.
    #[error("cache operation failed for '{key}': {reason}")]
    Backend { key: String, reason: String },
}

/// A cached page document and the tags it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub body: serde_json::Value,
    pub tags: BTreeSet<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub stale: bool,
}

impl CacheEntry {
    pub fn new(body: serde_json::Value, tags: BTreeSet<String>, ttl: Duration) -> Self {
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .unwrap_or_else(|_| chrono::Duration::days(MAX_TTL_DAYS))
            .min(chrono::Duration::days(MAX_TTL_DAYS));
        let expires_at = created_at + ttl;
        Self {
            body,
            tags,
            created_at,
            expires_at,
            stale: false,
        }
    }

    /// Servable as-is: not invalidated and not past its TTL.
    pub fn is_fresh_at(&self, now: Timestamp) -> bool {
        !self.stale && now < self.expires_at
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

/// Path-keyed page storage with tag-based invalidation.
///
/// Invalidation marks entries stale rather than removing them. Invalidating
/// a tag or path that has no entries succeeds and returns `0`. The `usize`
/// results count entries newly or already marked stale by the call.
///
/// Every invalidation advances the store's [`Revision`], including ones that
/// match no entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Current invalidation revision.
    async fn revision(&self) -> Result<Revision, CacheError>;

    /// Stores `entry` rendered from data read at `rendered_at`. If the path,
    /// one of the entry's tags, or the whole store was invalidated after
    /// that revision the entry is stored stale. Returns whether it was
    /// stored fresh.
    async fn put(
        &self,
        path: &str,
        entry: CacheEntry,
        rendered_at: Revision,
    ) -> Result<bool, CacheError>;

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, CacheError>;

    async fn invalidate_path(&self, path: &str) -> Result<usize, CacheError>;

    async fn invalidate_all(&self) -> Result<usize, CacheError>;
}
