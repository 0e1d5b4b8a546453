pub mod auth;
pub mod flush_guard;
