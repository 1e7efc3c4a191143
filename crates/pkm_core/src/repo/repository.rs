//! Shared repository contract and error type.
//!
//! # Invariants
//! - Every call receives the caller's [`OpContext`]; implementations check it
//!   before touching storage and report [`RepoError::Interrupted`].
//! - Filter-based calls return the number of affected rows.

use crate::context::{ContextError, OpContext};
use crate::db::DbError;
use crate::repo::filter::{Filter, Updater};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No entity matched the given key.
    NotFound(String),
    /// An active entity with the same key already exists.
    AlreadyExists(String),
    /// Input or persisted data violates an invariant.
    InvalidData(String),
    /// Unknown filter field, operator/operand mismatch or empty updater list.
    InvalidFilter(String),
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The operation context was cancelled or ran past its deadline.
    Interrupted(ContextError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "not found: {key}"),
            Self::AlreadyExists(key) => write!(f, "already exists: {key}"),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
            Self::InvalidFilter(message) => write!(f, "invalid filter: {message}"),
            Self::Io { path, source } => write!(f, "i/o error on `{path}`: {source}"),
            Self::Interrupted(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Interrupted(err) => Some(err),
            Self::NotFound(_)
            | Self::AlreadyExists(_)
            | Self::InvalidData(_)
            | Self::InvalidFilter(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ContextError> for RepoError {
    fn from(value: ContextError) -> Self {
        Self::Interrupted(value)
    }
}

/// CRUD and filtered-query contract for one entity type.
pub trait Repository<T> {
    fn add(&mut self, ctx: &OpContext, entities: &[T]) -> RepoResult<()>;
    /// Overwrites stored entities matched by id (or natural key when id is `0`).
    fn replace(&mut self, ctx: &OpContext, entities: &[T]) -> RepoResult<()>;
    fn update_where(
        &mut self,
        ctx: &OpContext,
        filters: &[Filter],
        updaters: &[Updater],
    ) -> RepoResult<u64>;
    fn delete(&mut self, ctx: &OpContext, entities: &[T]) -> RepoResult<()>;
    fn delete_where(&mut self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<u64>;
    fn count_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<u64>;
    fn count_all(&self, ctx: &OpContext) -> RepoResult<u64>;
    fn does_exist(&self, ctx: &OpContext, entity: &T) -> RepoResult<bool>;
    fn does_exist_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<bool>;
    fn get_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<Vec<T>>;
    fn get_first_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<Option<T>>;
    fn get_all(&self, ctx: &OpContext) -> RepoResult<Vec<T>>;
}
