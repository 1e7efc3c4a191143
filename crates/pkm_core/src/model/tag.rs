//! Tag domain model.
//!
//! Tags may form hierarchies: `parent_path` lists the ids of the ancestor tags,
//! root first. Marshalled path strings join labels with [`TAG_PATH_SEPARATOR`].

use serde::{Deserialize, Serialize};

/// Storage identifier of a tag. `0` means "not persisted yet".
pub type TagId = i64;

/// Separator used when a tag hierarchy is rendered as one string.
pub const TAG_PATH_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Human-facing label, unique per repository.
    pub tag: String,
    /// Ancestor tag ids, root first.
    pub parent_path: Vec<TagId>,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            tag: label.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for ancestor ids.
    pub fn with_parents(mut self, parent_path: Vec<TagId>) -> Self {
        self.parent_path = parent_path;
        self
    }

    /// Renders this tag below the given ancestors, e.g. `lang::rust::async`.
    ///
    /// `parents` must be ordered root first; their own `parent_path` is ignored.
    pub fn path_string(&self, parents: &[Tag]) -> String {
        let labels = parents
            .iter()
            .map(|parent| parent.tag.as_str())
            .chain(std::iter::once(self.tag.as_str()))
            .collect::<Vec<_>>();
        join_tag_path(&labels)
    }
}

/// Joins labels into one hierarchical path string.
pub fn join_tag_path<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(TAG_PATH_SEPARATOR)
}

/// Splits a hierarchical path string into labels, dropping blank segments.
pub fn split_tag_path(path: &str) -> Vec<String> {
    path.split(TAG_PATH_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{join_tag_path, split_tag_path, Tag};

    #[test]
    fn path_string_joins_parents_root_first() {
        let root = Tag::new("lang");
        let mid = Tag::new("rust");
        let leaf = Tag::new("async").with_parents(vec![1, 2]);
        assert_eq!(leaf.path_string(&[root, mid]), "lang::rust::async");
        assert_eq!(Tag::new("solo").path_string(&[]), "solo");
    }

    #[test]
    fn split_tag_path_ignores_blank_segments() {
        assert_eq!(split_tag_path("a:: b ::::c"), vec!["a", "b", "c"]);
        assert_eq!(join_tag_path(&["a", "b"]), "a::b");
        assert!(split_tag_path("").is_empty());
    }
}
