//! Article use-case service.
//!
//! # Responsibility
//! - Resolve the caller's permission for every request and gate access.
//! - Provide preview listing, lookup by locator, creation and update.
//!
//! # Invariants
//! - Permission is re-resolved on every call; nothing is cached.
//! - Reads require readonly or full; writes require full on every namespace
//!   the write touches (source and destination of a move).
//! - A missing article is reported with the resolved level so callers can
//!   tell "hidden" from "absent" by reason code.

use crate::access::PermissionResolver;
use crate::model::article::{Article, ArticleData, ArticleError, ArticleValidationError};
use crate::model::locator::Locator;
use crate::model::permission::PermissionLevel;
use crate::repo::article_repo::{ArticleRepository, RepoError};
use crate::repo::uniqueness::IntegrityViolation;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of text characters carried by a preview.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Service error for article use-cases.
#[derive(Debug)]
pub enum ArticleServiceError {
    /// Caller holds `actual` but the operation needs `required`.
    Forbidden {
        namespace: String,
        required: PermissionLevel,
        actual: PermissionLevel,
    },
    /// Locator does not resolve to any record.
    NotFound {
        locator: Locator,
        permissions: PermissionLevel,
    },
    /// Post-write uniqueness check failed; the write was rolled back.
    IntegrityViolation(IntegrityViolation),
    /// Input fails field-level constraints.
    Validation(ArticleValidationError),
    /// Article gate or encoding failure.
    Article(ArticleError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden {
                namespace,
                required,
                actual,
            } => write!(
                f,
                "forbidden: namespace `{namespace}` requires `{required}`, caller has `{actual}`"
            ),
            Self::NotFound { locator, .. } => write!(f, "article not found: {locator}"),
            Self::IntegrityViolation(violation) => write!(f, "{violation}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Article(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Article(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ArticleServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::IntegrityViolation(violation) => Self::IntegrityViolation(violation),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ArticleError> for ArticleServiceError {
    fn from(value: ArticleError) -> Self {
        Self::Article(value)
    }
}

/// Short listing projection of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticlePreview {
    pub namespace: String,
    pub id: Option<String>,
    pub title: String,
    /// First `PREVIEW_MAX_CHARS` characters of the text.
    pub preview: String,
}

impl ArticlePreview {
    pub fn from_data(data: &ArticleData) -> Self {
        Self {
            namespace: data.namespace.clone(),
            id: data.id.clone(),
            title: data.title.clone(),
            preview: data.text.chars().take(PREVIEW_MAX_CHARS).collect(),
        }
    }
}

/// Article service facade over a repository and a permission resolver.
pub struct ArticleService<R: ArticleRepository, P: PermissionResolver> {
    repo: R,
    resolver: P,
}

impl<R: ArticleRepository, P: PermissionResolver> ArticleService<R, P> {
    pub fn new(repo: R, resolver: P) -> Self {
        Self { repo, resolver }
    }

    /// Resolves the caller's level for `namespace`.
    pub fn permission_for(&self, actor: Option<&str>, namespace: &str) -> PermissionLevel {
        self.resolver.resolve(actor, namespace)
    }

    /// Lists previews of every article in namespaces the caller may read.
    pub fn list_previews(
        &self,
        actor: Option<&str>,
    ) -> Result<Vec<ArticlePreview>, ArticleServiceError> {
        let readable: Vec<String> = self
            .repo
            .list_namespaces()?
            .into_iter()
            .filter(|namespace| self.permission_for(actor, namespace).is_readable())
            .collect();

        let previews = self
            .repo
            .list_articles(&readable)?
            .iter()
            .map(|stored| ArticlePreview::from_data(&stored.data))
            .collect::<Vec<_>>();

        info!(
            "event=article_list module=service status=ok namespaces={} previews={}",
            readable.len(),
            previews.len()
        );
        Ok(previews)
    }

    /// Gets the article `locator` resolves to, by id or title.
    pub fn get_article(
        &self,
        actor: Option<&str>,
        locator: &Locator,
    ) -> Result<Article, ArticleServiceError> {
        let level = self.require(actor, &locator.namespace, PermissionLevel::ReadOnly)?;

        match self.repo.find_article(locator)? {
            Some(stored) => Ok(Article::new(stored.data, level)),
            None => {
                info!(
                    "event=article_get module=service status=not_found namespace={}",
                    locator.namespace
                );
                Err(ArticleServiceError::NotFound {
                    locator: locator.clone(),
                    permissions: level,
                })
            }
        }
    }

    /// Creates a new article in `data.namespace`.
    pub fn create_article(
        &mut self,
        actor: Option<&str>,
        data: ArticleData,
    ) -> Result<Article, ArticleServiceError> {
        let level = self.require(actor, &data.namespace, PermissionLevel::Full)?;
        let stored = self.repo.create_article(&data)?;
        Ok(Article::new(stored.data, level))
    }

    /// Replaces the article `locator` resolves to with `data`.
    ///
    /// `data.namespace` may differ from `locator.namespace` (a move); the
    /// caller then needs full access to both namespaces.
    pub fn update_article(
        &mut self,
        actor: Option<&str>,
        locator: &Locator,
        data: ArticleData,
    ) -> Result<Article, ArticleServiceError> {
        let source_level = self.require(actor, &locator.namespace, PermissionLevel::Full)?;
        let target_level = if data.namespace == locator.namespace {
            source_level
        } else {
            self.require(actor, &data.namespace, PermissionLevel::Full)?
        };

        let stored = self
            .repo
            .update_article(locator, &data)
            .map_err(|err| match err {
                RepoError::NotFound(locator) => ArticleServiceError::NotFound {
                    locator,
                    permissions: source_level,
                },
                other => other.into(),
            })?;
        Ok(Article::new(stored.data, target_level))
    }

    fn require(
        &self,
        actor: Option<&str>,
        namespace: &str,
        required: PermissionLevel,
    ) -> Result<PermissionLevel, ArticleServiceError> {
        let actual = self.permission_for(actor, namespace);
        if actual.allows(required) {
            return Ok(actual);
        }

        info!(
            "event=permission_check module=service status=forbidden namespace={} required={} actual={}",
            namespace, required, actual
        );
        Err(ArticleServiceError::Forbidden {
            namespace: namespace.to_string(),
            required,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ArticlePreview, PREVIEW_MAX_CHARS};
    use crate::model::article::ArticleData;

    #[test]
    fn preview_truncates_on_character_boundaries() {
        let text = "é".repeat(PREVIEW_MAX_CHARS + 50);
        let preview = ArticlePreview::from_data(&ArticleData::new("n", None, "t", text));
        assert_eq!(preview.preview.chars().count(), PREVIEW_MAX_CHARS);
    }

    #[test]
    fn preview_keeps_short_text_whole() {
        let preview = ArticlePreview::from_data(&ArticleData::new(
            "public",
            Some("intro".to_string()),
            "Intro",
            "hello",
        ));
        assert_eq!(preview.preview, "hello");
        assert_eq!(preview.id.as_deref(), Some("intro"));
    }
}
