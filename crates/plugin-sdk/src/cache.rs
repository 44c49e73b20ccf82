//! Cache tag helpers.
//!
//! Render output carries the tags of every entity it was built from so the
//! host can discard it when one of them changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Merge two tag lists. The result is sorted and free of duplicates.
pub fn merge_tags(a: &[String], b: &[String]) -> Vec<String> {
    a.iter()
        .chain(b)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Cacheability metadata attached to a render element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CacheMetadata {
    pub fn add_tags(&mut self, tags: &[String]) {
        self.tags = merge_tags(&self.tags, tags);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
