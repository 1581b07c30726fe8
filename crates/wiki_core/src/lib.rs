//! Core domain logic for the wiki article store.
//! This crate is the single source of truth for article identity,
//! permission gating and per-namespace uniqueness.

pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{PermissionGrants, PermissionResolver, StaticPermissionResolver};
pub use config::{ConfigError, WikiConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::article::{Article, ArticleData, ArticleError, ArticleValidationError};
pub use model::locator::{Locator, LocatorError};
pub use model::permission::PermissionLevel;
pub use repo::article_repo::{
    ArticleRepository, RepoError, RepoResult, SqliteArticleRepository, StoredArticle,
};
pub use repo::uniqueness::{IdentityKey, IntegrityViolation};
pub use service::article_service::{ArticlePreview, ArticleService, ArticleServiceError};

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
