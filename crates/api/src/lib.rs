//! Consumer side of cache revalidation: the site's web server.
//!
//! Exposes config, state, error handling, routes, the page cache and the
//! invalidation engine so integration tests and the binary entrypoint can
//! both build the same application.

pub mod background;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
