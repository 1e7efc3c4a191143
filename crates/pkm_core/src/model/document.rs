//! Document domain model.
//!
//! # Responsibility
//! - Define the document record together with its tag/link/backlink associations.
//! - Provide projection helpers used by diffing and synchronization.
//!
//! # Invariants
//! - `path` is unique within one content repository.
//! - `deleted_at` is the source of truth for tombstone state.
//! - `linked_documents`/`backlinked_documents` are not kept symmetric here.

use crate::model::tag::Tag;
use serde::{Deserialize, Serialize};

/// Storage identifier of a document. `0` means "not persisted yet".
pub type DocumentId = i64;

/// Canonical document record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Content repository path, unique per repository.
    pub path: String,
    /// Optional free-form classification (`bookmark`, `note`, ...).
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
    /// Unix epoch milliseconds, assigned by storage.
    pub updated_at: i64,
    /// Soft delete tombstone in Unix epoch milliseconds.
    pub deleted_at: Option<i64>,
    pub tags: Vec<Tag>,
    /// Outgoing links, in document order.
    pub linked_documents: Vec<Document>,
    /// Incoming links, in document order.
    pub backlinked_documents: Vec<Document>,
}

impl Document {
    /// Creates an unsaved document for `path` with no associations.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for the document type.
    pub fn with_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Builder-style setter for tags given as labels.
    pub fn with_tags<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = labels.into_iter().map(Tag::new).collect();
        self
    }

    /// Builder-style setter for outgoing links given as paths.
    pub fn with_links<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linked_documents = paths.into_iter().map(Document::new).collect();
        self
    }

    /// Builder-style setter for incoming links given as paths.
    pub fn with_backlinks<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backlinked_documents = paths.into_iter().map(Document::new).collect();
        self
    }

    /// Returns whether this document is not tombstoned.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn tag_labels(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.tag.clone()).collect()
    }

    pub fn linked_paths(&self) -> Vec<String> {
        self.linked_documents
            .iter()
            .map(|document| document.path.clone())
            .collect()
    }

    pub fn backlinked_paths(&self) -> Vec<String> {
        self.backlinked_documents
            .iter()
            .map(|document| document.path.clone())
            .collect()
    }
}
