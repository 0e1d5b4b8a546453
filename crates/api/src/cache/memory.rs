//! In-process [`CacheStore`] backed by a `tokio::sync::RwLock`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{CacheEntry, CacheError, CacheStore, Revision};

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// tag -> paths whose entry carries the tag.
    tag_index: HashMap<String, HashSet<String>>,
    /// Bumped by every invalidation.
    revision: Revision,
    /// Revision of the latest invalidation of each tag.
    tag_revisions: HashMap<String, Revision>,
    /// Revision of the latest invalidation of each path.
    path_revisions: HashMap<String, Revision>,
    /// Revision of the latest full flush.
    flushed_at: Revision,
}

impl Inner {
    fn unindex(&mut self, path: &str) {
        let Some(old) = self.entries.get(path) else {
            return;
        };
        for tag in &old.tags {
            if let Some(paths) = self.tag_index.get_mut(tag) {
                paths.remove(path);
                if paths.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
    }

    fn bump(&mut self) -> Revision {
        self.revision += 1;
        self.revision
    }

    /// Whether `path` or any of `entry`'s tags was invalidated after
    /// `rendered_at`.
    fn invalidated_since(&self, path: &str, entry: &CacheEntry, rendered_at: Revision) -> bool {
        let newer = |r: Option<&Revision>| r.is_some_and(|&r| r > rendered_at);

        self.flushed_at > rendered_at
            || newer(self.path_revisions.get(path))
            || entry.tags.iter().any(|tag| newer(self.tag_revisions.get(tag)))
    }
}

#[derive(Default)]
pub struct MemoryCacheStore {
    inner: RwLock<Inner>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// `Some(true)` if the path has an entry marked stale.
    pub async fn is_stale(&self, path: &str) -> Option<bool> {
        self.inner.read().await.entries.get(path).map(|e| e.stale)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, path: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.inner.read().await.entries.get(path).cloned())
    }

    async fn revision(&self) -> Result<Revision, CacheError> {
        Ok(self.inner.read().await.revision)
    }

    async fn put(
        &self,
        path: &str,
        mut entry: CacheEntry,
        rendered_at: Revision,
    ) -> Result<bool, CacheError> {
        let mut inner = self.inner.write().await;
        if inner.invalidated_since(path, &entry, rendered_at) {
            entry.stale = true;
        }
        let fresh = !entry.stale;

        inner.unindex(path);
        for tag in &entry.tags {
            inner
                .tag_index
                .entry(tag.clone())
                .or_default()
                .insert(path.to_string());
        }
        inner.entries.insert(path.to_string(), entry);
        Ok(fresh)
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, CacheError> {
        let mut inner = self.inner.write().await;
        let revision = inner.bump();
        inner.tag_revisions.insert(tag.to_string(), revision);

        let Inner {
            entries,
            tag_index,
            ..
        } = &mut *inner;

        let Some(paths) = tag_index.get(tag) else {
            return Ok(0);
        };

        let mut marked = 0;
        for path in paths {
            if let Some(entry) = entries.get_mut(path) {
                entry.stale = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn invalidate_path(&self, path: &str) -> Result<usize, CacheError> {
        let mut inner = self.inner.write().await;
        let revision = inner.bump();
        inner.path_revisions.insert(path.to_string(), revision);

        match inner.entries.get_mut(path) {
            Some(entry) => {
                entry.stale = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn invalidate_all(&self) -> Result<usize, CacheError> {
        let mut inner = self.inner.write().await;
        inner.flushed_at = inner.bump();
        for entry in inner.entries.values_mut() {
            entry.stale = true;
        }
        Ok(inner.entries.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
