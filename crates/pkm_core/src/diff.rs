//! Old/new comparison of document associations.
//!
//! # Responsibility
//! - Project tag/link/backlink changes between two document snapshots to labels.
//!
//! # Invariants
//! - Tags are compared by label, documents by path.
//! - The `get_added_*` / `get_removed_*` family keeps its historical contract:
//!   both functions of a pair return the old elements still present in the new
//!   snapshot. Use [`diff_tags`], [`diff_links`] and [`diff_backlinks`] for a
//!   real added/removed split.

use crate::model::document::Document;
use crate::model::tag::Tag;
use std::collections::HashSet;

/// Added/removed labels between two snapshots, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDiff {
    /// Present in the new snapshot only.
    pub added: Vec<String>,
    /// Present in the old snapshot only.
    pub removed: Vec<String>,
}

impl EntityDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn get_added_links(old: &Document, new: &Document) -> Vec<String> {
    retained(&old.linked_documents, &new.linked_documents, document_key)
}

pub fn get_removed_links(old: &Document, new: &Document) -> Vec<String> {
    retained(&old.linked_documents, &new.linked_documents, document_key)
}

pub fn get_added_backlinks(old: &Document, new: &Document) -> Vec<String> {
    retained(
        &old.backlinked_documents,
        &new.backlinked_documents,
        document_key,
    )
}

pub fn get_removed_backlinks(old: &Document, new: &Document) -> Vec<String> {
    retained(
        &old.backlinked_documents,
        &new.backlinked_documents,
        document_key,
    )
}

pub fn get_added_tags(old: &Document, new: &Document) -> Vec<String> {
    retained(&old.tags, &new.tags, tag_key)
}

pub fn get_removed_tags(old: &Document, new: &Document) -> Vec<String> {
    retained(&old.tags, &new.tags, tag_key)
}

pub fn diff_links(old: &Document, new: &Document) -> EntityDiff {
    split(&old.linked_documents, &new.linked_documents, document_key)
}

pub fn diff_backlinks(old: &Document, new: &Document) -> EntityDiff {
    split(
        &old.backlinked_documents,
        &new.backlinked_documents,
        document_key,
    )
}

pub fn diff_tags(old: &Document, new: &Document) -> EntityDiff {
    split(&old.tags, &new.tags, tag_key)
}

fn document_key(document: &Document) -> &str {
    document.path.as_str()
}

fn tag_key(tag: &Tag) -> &str {
    tag.tag.as_str()
}

/// Old elements that are also found in `new`, projected to their keys.
fn retained<T>(old: &[T], new: &[T], key: fn(&T) -> &str) -> Vec<String> {
    let new_keys: HashSet<&str> = new.iter().map(key).collect();
    old.iter()
        .map(key)
        .filter(|value| new_keys.contains(value))
        .map(str::to_string)
        .collect()
}

fn split<T>(old: &[T], new: &[T], key: fn(&T) -> &str) -> EntityDiff {
    let old_keys: HashSet<&str> = old.iter().map(key).collect();
    let new_keys: HashSet<&str> = new.iter().map(key).collect();
    EntityDiff {
        added: only_in(new, &old_keys, key),
        removed: only_in(old, &new_keys, key),
    }
}

fn only_in<T>(items: &[T], other: &HashSet<&str>, key: fn(&T) -> &str) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(key)
        .filter(|value| !other.contains(value) && seen.insert(*value))
        .map(str::to_string)
        .collect()
}
