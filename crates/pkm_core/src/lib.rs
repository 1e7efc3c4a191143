//! Core of a personal document and tag manager.
//! Owns the document text model, hook registry, repositories and managers.

pub mod config;
pub mod content;
pub mod context;
pub mod db;
pub mod diff;
pub mod hooks;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, LoggingConfig};
pub use content::{ContentError, ContentResult};
pub use context::{CancelHandle, ContextError, OpContext};
pub use db::{open_db, open_db_from_config, open_db_in_memory, DbError, DbResult};
pub use diff::EntityDiff;
pub use hooks::{HookError, HookPoint, HookPoints, HookRegistry, HookResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::content::{ContentEdit, ContentEntry, PathMove};
pub use model::document::{Document, DocumentId};
pub use model::tag::{Tag, TagId};
pub use repo::{
    DocumentContentRepository, DocumentRepository, Filter, FilterOperator, FilterValue,
    FsDocumentContentRepository, RepoError, RepoResult, Repository, SqliteDocumentRepository,
    SqliteTagRepository, Updater,
};
pub use service::{
    DocumentContentManager, DocumentManager, DocumentSync, EntityManager, ManagerError,
    ManagerResult, SyncReport, TagManager,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
