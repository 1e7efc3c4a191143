//! Repository contracts and storage adapters.
//!
//! # Responsibility
//! - Define the storage contracts managers depend on.
//! - Isolate SQLite and filesystem details from manager orchestration.
//!
//! # Invariants
//! - Repositories own field-name to column translation; managers pass
//!   [`Filter`]/[`Updater`] values through untouched.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`) in
//!   addition to transport errors.

pub mod content_repo;
pub mod document_repo;
pub mod filter;
pub mod repository;
pub mod tag_repo;

pub use content_repo::{DocumentContentRepository, FsDocumentContentRepository};
pub use document_repo::{DocumentRepository, SqliteDocumentRepository};
pub use filter::{Filter, FilterOperator, FilterValue, Updater};
pub use repository::{RepoError, RepoResult, Repository};
pub use tag_repo::SqliteTagRepository;
