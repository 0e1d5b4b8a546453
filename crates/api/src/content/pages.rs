//! Site page table and page rendering.
//!
//! Each page lists the collections it reads. A page's cache tags are those
//! collection names, so a tag invalidation from the routing table reaches
//! every page that shows the changed collection. Rendering produces a JSON
//! document; HTML templating happens elsewhere.

use std::collections::BTreeSet;

use chrono::Utc;
use futures::future::try_join_all;
use serde_json::{json, Map, Value};
use sitecache_core::routing::{BLOG_PATH_PREFIX, BLOG_TAG_PREFIX};

use super::client::{ContentError, ContentSource};

/// Collection holding blog posts.
const BLOG_COLLECTION: &str = "blogs";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no page at {0}")]
    UnknownPage(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

// ---------------------------------------------------------------------------
// Page table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDef {
    pub path: &'static str,
    pub collections: &'static [&'static str],
}

pub const PAGES: &[PageDef] = &[
    PageDef {
        path: "/",
        collections: &[
            "testimonials",
            "partners",
            "features",
            "integrations",
            "cta_cards",
            "pricing_plans",
            "stats",
        ],
    },
    PageDef {
        path: "/blog",
        collections: &["blogs", "authors", "category"],
    },
    PageDef {
        path: "/pricing",
        collections: &["pricing_plans", "faqs"],
    },
    PageDef {
        path: "/careers",
        collections: &["jobs", "employee_benefits", "locations"],
    },
    PageDef {
        path: "/about",
        collections: &["leadership", "values", "company_milestones", "stats"],
    },
    PageDef {
        path: "/contact",
        collections: &["contact_options", "locations", "support"],
    },
    PageDef {
        path: "/resources",
        collections: &["press", "resource_articles", "faqs", "faq_topics", "support"],
    },
    PageDef {
        path: "/for-employees",
        collections: &["employee_benefits"],
    },
    PageDef {
        path: "/for-employers",
        collections: &["employer_stats"],
    },
    PageDef {
        path: "/how-it-works",
        collections: &["process_steps", "features"],
    },
    PageDef {
        path: "/compliance",
        collections: &["compliance_items", "security_features"],
    },
];

/// What to render for a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagePlan {
    Listing(&'static PageDef),
    BlogPost { slug: String },
}

impl PagePlan {
    /// Resolve a normalized request path. `None` for paths the site does not
    /// serve.
    pub fn resolve(path: &str) -> Option<Self> {
        if let Some(page) = PAGES.iter().find(|p| p.path == path) {
            return Some(Self::Listing(page));
        }

        let slug = path.strip_prefix(BLOG_PATH_PREFIX)?;
        is_valid_slug(slug).then(|| Self::BlogPost {
            slug: slug.to_string(),
        })
    }

    /// Cache tags for the rendered page.
    pub fn tags(&self) -> BTreeSet<String> {
        match self {
            Self::Listing(page) => page.collections.iter().map(|c| c.to_string()).collect(),
            Self::BlogPost { slug } => BTreeSet::from([
                BLOG_COLLECTION.to_string(),
                format!("{BLOG_TAG_PREFIX}{slug}"),
            ]),
        }
    }

    /// Fetch everything the page needs and assemble its document.
    pub async fn render(&self, source: &dyn ContentSource) -> Result<Value, RenderError> {
        match self {
            Self::Listing(page) => {
                let fetches = page
                    .collections
                    .iter()
                    .map(|collection| source.fetch_collection(collection, None));
                let results = try_join_all(fetches).await?;

                let sections: Map<String, Value> = page
                    .collections
                    .iter()
                    .zip(results)
                    .map(|(collection, items)| (collection.to_string(), Value::Array(items)))
                    .collect();

                Ok(document(page.path, Value::Object(sections)))
            }
            Self::BlogPost { slug } => {
                let filter = format!("slug=\"{slug}\"");
                let post = source
                    .fetch_collection(BLOG_COLLECTION, Some(&filter))
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| RenderError::UnknownPage(format!("{BLOG_PATH_PREFIX}{slug}")))?;

                Ok(document(
                    &format!("{BLOG_PATH_PREFIX}{slug}"),
                    json!({ "post": post }),
                ))
            }
        }
    }
}

fn document(path: &str, sections: Value) -> Value {
    json!({
        "path": path,
        "sections": sections,
        "rendered_at": Utc::now(),
    })
}

/// Slugs are limited to `[A-Za-z0-9_-]` since they are embedded in a filter
/// expression.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 200
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Collapse duplicate and trailing slashes: `//blog/` -> `/blog`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
