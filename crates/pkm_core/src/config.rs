//! Core configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe where documents, tags and document content are stored.
//! - Carry logging settings consumed by [`crate::logging::init_logging`].
//!
//! # Invariants
//! - `content_root` must not be empty.
//! - `logging.level` must be one of `trace|debug|info|warn|error`.
//!
//! Example:
//!
//! ```toml
//! database_path = "/home/me/.local/share/pkm/pkm.sqlite3"
//! content_root = "/home/me/.local/share/pkm/content"
//!
//! [logging]
//! level = "info"
//! dir = "/home/me/.local/state/pkm/logs"
//! ```

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite file for documents and tags. In-memory when absent.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Directory holding document content files.
    pub content_root: PathBuf,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level_string")]
    pub level: String,
    /// Absolute log directory. Logging stays off when absent.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level_string(),
            dir: None,
        }
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

impl CoreConfig {
    /// Builds a config with defaults for everything but the content root.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            database_path: None,
            content_root: content_root.into(),
            logging: LoggingConfig::default(),
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "content_root cannot be empty".to_string(),
            ));
        }
        normalize_level(&self.logging.level).map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::path::PathBuf;

    #[test]
    fn parses_full_config() {
        let config = CoreConfig::from_toml_str(
            r#"
            database_path = "/tmp/pkm.sqlite3"
            content_root = "/tmp/pkm-content"

            [logging]
            level = "WARN"
            dir = "/tmp/pkm-logs"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/pkm.sqlite3")));
        assert_eq!(config.content_root, PathBuf::from("/tmp/pkm-content"));
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/tmp/pkm-logs")));
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let config = CoreConfig::from_toml_str(r#"content_root = "content""#).expect("valid");
        assert_eq!(config, CoreConfig::new("content"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CoreConfig::from_toml_str(r#"content_root = """#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("content_root = \"c\"\n[logging]\nlevel = \"loud\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("content_root = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CoreConfig::load("/definitely/not/here/pkm.toml").expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
