//! Domain model for documents, tags and document content.
//!
//! # Responsibility
//! - Define canonical data structures shared by repositories and managers.
//! - Keep identity rules (path for documents, label for tags) in one place.
//!
//! # Invariants
//! - Every persisted document is identified by a unique `path`.
//! - Link/backlink symmetry is a caller convention; the model never enforces it.

pub mod content;
pub mod document;
pub mod tag;
