//! Page content: where records come from and which pages read which
//! collections.

pub mod client;
pub mod pages;

pub use client::{ContentError, ContentSource, DataServiceClient};
pub use pages::{PagePlan, RenderError};
