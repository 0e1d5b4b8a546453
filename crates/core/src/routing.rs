//! Collection → cache target routing table.
//!
//! Every monitored collection is listed exactly once in [`COLLECTION_ROUTES`]
//! with the page paths known to render it. Adding a collection is a one-line
//! change here; nothing else in the workspace hard-codes collection names for
//! invalidation purposes.

use crate::change_event::record_str;
use crate::invalidation::InvalidationRequest;
use crate::types::Record;

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// Per-record targets derived from one field of the changed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRoute {
    /// Record field holding the URL segment (e.g. `slug`).
    pub field: &'static str,
    /// Tag prefix; the tag is `tag_prefix + value`.
    pub tag_prefix: &'static str,
    /// Path prefix; the path is `path_prefix + value`.
    pub path_prefix: &'static str,
}

/// Invalidation targets for one monitored collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRoute {
    pub collection: &'static str,
    /// Pages that render this collection.
    pub paths: &'static [&'static str],
    pub detail: Option<DetailRoute>,
}

const fn route(collection: &'static str, paths: &'static [&'static str]) -> CollectionRoute {
    CollectionRoute {
        collection,
        paths,
        detail: None,
    }
}

/// Tag prefix for single blog post entries (`blog:<slug>`).
pub const BLOG_TAG_PREFIX: &str = "blog:";

/// Path prefix for single blog post pages (`/blog/<slug>`).
pub const BLOG_PATH_PREFIX: &str = "/blog/";

/// The routing table. The tag for a collection is always its own name.
pub const COLLECTION_ROUTES: &[CollectionRoute] = &[
    // Content
    CollectionRoute {
        collection: "blogs",
        paths: &["/blog"],
        detail: Some(DetailRoute {
            field: "slug",
            tag_prefix: BLOG_TAG_PREFIX,
            path_prefix: BLOG_PATH_PREFIX,
        }),
    },
    route("authors", &["/blog"]),
    route("category", &["/blog"]),
    // Marketing
    route("testimonials", &["/"]),
    route("partners", &["/"]),
    route("cta_cards", &["/"]),
    route("press", &["/resources"]),
    // Product
    route("features", &["/", "/how-it-works"]),
    route("integrations", &["/"]),
    route("pricing_plans", &["/pricing", "/"]),
    route("process_steps", &["/how-it-works"]),
    route("employer_stats", &["/for-employers"]),
    route("compliance_items", &["/compliance"]),
    route("security_features", &["/compliance"]),
    // Company
    route("leadership", &["/about"]),
    route("values", &["/about"]),
    route("company_milestones", &["/about"]),
    route("stats", &["/about", "/"]),
    // Careers
    route("jobs", &["/careers"]),
    route("employee_benefits", &["/careers", "/for-employees"]),
    route("locations", &["/careers", "/contact"]),
    // Support
    route("support", &["/resources", "/contact"]),
    route("faqs", &["/resources", "/pricing"]),
    route("faq_topics", &["/resources"]),
    route("contact_options", &["/contact"]),
    route("resource_articles", &["/resources"]),
];

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find the route for a collection (case-sensitive).
pub fn route_for(collection: &str) -> Option<&'static CollectionRoute> {
    COLLECTION_ROUTES.iter().find(|r| r.collection == collection)
}

/// Names of all monitored collections, in table order.
pub fn monitored_collections() -> impl Iterator<Item = &'static str> {
    COLLECTION_ROUTES.iter().map(|r| r.collection)
}

/// Derive the tags and paths to invalidate for a change in `collection`.
///
/// - Known collection: tag = collection name, plus its page paths, plus
///   detail targets when the record carries the detail field.
/// - Unknown collection: tag = collection name only, no paths assumed.
///
/// Deterministic: the same input always yields the same request.
pub fn derive_invalidation(collection: &str, record: Option<&Record>) -> InvalidationRequest {
    let mut request = InvalidationRequest::new();
    request.add_tag(collection);

    let Some(route) = route_for(collection) else {
        return request;
    };

    for path in route.paths {
        request.add_path(*path);
    }

    if let (Some(detail), Some(record)) = (route.detail, record) {
        if let Some(segment) = record_str(record, detail.field).filter(|s| is_path_segment(s)) {
            request.add_tag(format!("{}{segment}", detail.tag_prefix));
            request.add_path(format!("{}{segment}", detail.path_prefix));
        }
    }

    request
}

/// A value usable as a single URL path segment.
fn is_path_segment(value: &str) -> bool {
    !value.contains('/') && !value.contains(char::is_whitespace) && value != "." && value != ".."
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
