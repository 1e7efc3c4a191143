//! Manager error type.

use crate::content::ContentError;
use crate::hooks::HookError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Failure of one manager operation.
#[derive(Debug)]
pub enum ManagerError {
    /// A before or after hook failed.
    Hook(HookError),
    /// The repository call failed; the error is passed through as returned.
    Repo(RepoError),
    /// A content rewrite for `path` failed; nothing was written.
    Content { path: String, source: ContentError },
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hook(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Content { path, source } => write!(f, "content of `{path}`: {source}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hook(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Content { source, .. } => Some(source),
        }
    }
}

impl From<HookError> for ManagerError {
    fn from(value: HookError) -> Self {
        Self::Hook(value)
    }
}

impl From<RepoError> for ManagerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
