//! Hook-mediated entity managers.
//!
//! # Responsibility
//! - Wrap every repository call in before/after lifecycle hooks.
//! - Route content edits through the document text model.
//!
//! # Invariants
//! - Every operation runs `BeforeAny | Before<Op>` hooks, then the repository,
//!   then `AfterAny | After<Op>` hooks.
//! - A before-hook failure prevents the repository call.
//! - Repository errors are returned unchanged as [`ManagerError::Repo`].

pub mod content_manager;
pub mod document_manager;
pub mod entity_manager;
pub mod error;
mod pipeline;
pub mod sync_service;

pub use content_manager::DocumentContentManager;
pub use document_manager::DocumentManager;
pub use entity_manager::{EntityManager, TagManager};
pub use error::{ManagerError, ManagerResult};
pub use sync_service::{DocumentSync, SyncReport};
