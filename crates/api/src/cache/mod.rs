//! Page cache storage and the invalidation engine.
//!
//! - [`store`]: the [`CacheStore`] trait and [`CacheEntry`].
//! - [`memory`]: in-process store used by the server and tests.
//! - [`engine`]: applies an [`InvalidationRequest`] with per-key isolation.
//! - [`page_cache`]: serve-or-render for page requests.
//!
//! [`InvalidationRequest`]: sitecache_core::invalidation::InvalidationRequest

pub mod engine;
pub mod memory;
pub mod page_cache;
pub mod store;

pub use engine::{InvalidationEngine, InvalidationReport};
pub use memory::MemoryCacheStore;
pub use page_cache::{CacheStatus, PageCache, ServedPage};
pub use store::{CacheEntry, CacheError, CacheStore, Revision};
