use std::collections::BTreeSet;

use serde::Serialize;

/// The cache tags and URL paths one event (or one manual call) invalidates.
///
/// Both sets are ordered so the derived output for a given input is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationRequest {
    pub tags: BTreeSet<String>,
    pub paths: BTreeSet<String>,
}

impl InvalidationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            paths: BTreeSet::new(),
        }
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: BTreeSet::new(),
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn add_path(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.paths.is_empty()
    }
}
