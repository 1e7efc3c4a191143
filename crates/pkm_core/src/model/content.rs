//! Value objects for raw document content operations.

use serde::{Deserialize, Serialize};

/// Raw text stored for one document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub path: String,
    pub content: String,
}

impl ContentEntry {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Relocation request for one content path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMove {
    pub from: String,
    pub to: String,
}

impl PathMove {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Tag/link/backlink values to add to or remove from one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEdit {
    pub path: String,
    pub values: Vec<String>,
}

impl ContentEdit {
    pub fn new<I, S>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}
