//! TOML configuration for the article store.
//!
//! # Responsibility
//! - Deserialize database, logging and permission-grant settings.
//! - Validate values before any component is built from them.
//!
//! # Invariants
//! - Every section is optional; missing sections fall back to defaults.
//! - Grant namespaces are non-empty and contain no `/`.

use crate::access::{PermissionGrants, StaticPermissionResolver};
use crate::logging::{default_log_level, normalize_level};
use crate::model::locator::LOCATOR_DELIMITER;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub permissions: PermissionGrants,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite file; `None` selects an in-memory database.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory; `None` disables file logging.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl WikiConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.logging.level).map_err(ConfigError::InvalidValue)?;

        let actor_namespaces = self
            .permissions
            .actors
            .values()
            .flat_map(|grants| grants.keys());
        for namespace in self.permissions.anonymous.keys().chain(actor_namespaces) {
            if namespace.is_empty() || namespace.contains(LOCATOR_DELIMITER) {
                return Err(ConfigError::InvalidValue(format!(
                    "grant namespace `{namespace}` must be non-empty and contain no `/`"
                )));
            }
        }

        if self.permissions.actors.keys().any(|actor| actor.is_empty()) {
            return Err(ConfigError::InvalidValue(
                "actor identity must not be empty; use [permissions.anonymous]".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the resolver described by `[permissions]`.
    pub fn permission_resolver(&self) -> StaticPermissionResolver {
        StaticPermissionResolver::new(self.permissions.clone())
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    InvalidValue(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse config `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "failed to parse config: {source}"),
            Self::InvalidValue(message) => write!(f, "invalid config value: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WikiConfig};
    use crate::access::PermissionResolver;
    use crate::model::permission::PermissionLevel;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = WikiConfig::from_toml_str("").unwrap();
        assert_eq!(config, WikiConfig::default());
        assert_eq!(config.database.path, None);
        assert_eq!(config.permissions.default, PermissionLevel::None);
    }

    #[test]
    fn parses_full_document_and_builds_resolver() {
        let config = WikiConfig::from_toml_str(
            r#"
            [database]
            path = "/var/lib/wiki/wiki.sqlite3"

            [logging]
            level = "warn"
            dir = "/var/log/wiki"

            [permissions]
            default = "none"

            [permissions.anonymous]
            public = "readonly"

            [permissions.actors.alice]
            public = "full"
            private = "full"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/var/lib/wiki/wiki.sqlite3"))
        );
        assert_eq!(config.logging.level, "warn");

        let resolver = config.permission_resolver();
        assert_eq!(resolver.resolve(None, "public"), PermissionLevel::ReadOnly);
        assert_eq!(resolver.resolve(None, "private"), PermissionLevel::None);
        assert_eq!(
            resolver.resolve(Some("alice"), "private"),
            PermissionLevel::Full
        );
    }

    #[test]
    fn rejects_unknown_permission_strings() {
        let err = WikiConfig::from_toml_str("[permissions.anonymous]\npublic = \"admin\"\n")
            .expect_err("unknown level must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_grant_namespace_with_slash() {
        let err = WikiConfig::from_toml_str("[permissions.anonymous]\n\"a/b\" = \"full\"\n")
            .expect_err("slash namespace must fail");
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn rejects_unsupported_log_level() {
        let err = WikiConfig::from_toml_str("[logging]\nlevel = \"verbose\"\n")
            .expect_err("unknown level must fail");
        assert!(err.to_string().contains("unsupported log level"));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = WikiConfig::load(&missing).expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Read { ref path, .. } if path == &missing));
    }
}
