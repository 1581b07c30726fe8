//! Boundary API for transport adapters.
//!
//! # Responsibility
//! - Accept wire-level inputs (locator strings, raw JSON bodies).
//! - Translate every service outcome into a `success`/`reason` envelope.
//!
//! # Invariants
//! - Functions never panic and never return `Err`; failures are envelopes.
//! - Response payloads carry bare `ArticleData` plus the resolved level, not
//!   the trusted internal article encoding from `model::codec`.
//! - Request bodies are sanitized: keys outside the four article fields are
//!   discarded before reaching the service.

use crate::access::PermissionResolver;
use crate::model::article::{Article, ArticleData, ArticleError};
use crate::model::codec::deserialize_data;
use crate::model::locator::Locator;
use crate::model::permission::PermissionLevel;
use crate::repo::article_repo::ArticleRepository;
use crate::service::article_service::{ArticlePreview, ArticleService, ArticleServiceError};
use log::{error, warn};
use serde::Serialize;

/// Machine-readable failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    #[serde(rename = "forbidden")]
    Forbidden,
    #[serde(rename = "not found")]
    NotFound,
    #[serde(rename = "ID or title are already taken.")]
    AlreadyTaken,
    #[serde(rename = "invalid input")]
    InvalidInput,
    #[serde(rename = "internal error")]
    Internal,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::AlreadyTaken => "ID or title are already taken.",
            Self::InvalidInput => "invalid input",
            Self::Internal => "internal error",
        }
    }
}

/// Response envelope for single-article operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Caller's level for the addressed namespace, reported on failure too;
    /// `none` when the request could not be parsed.
    pub permissions: PermissionLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleData>,
    /// Human-readable diagnostics for input errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ArticleResponse {
    fn success(article: Article) -> Self {
        let permissions = article.permissions();
        match article.into_data() {
            Ok(data) => Self {
                success: true,
                reason: None,
                permissions,
                article: Some(data),
                message: None,
            },
            Err(err) => Self::failure(FailureReason::Forbidden, permissions, err.to_string()),
        }
    }

    fn failure(
        reason: FailureReason,
        permissions: PermissionLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            permissions,
            article: None,
            message: Some(message.into()),
        }
    }

    /// Maps a service error; `resolved` is the caller's level for the
    /// namespace the request addressed.
    fn from_error(err: ArticleServiceError, resolved: PermissionLevel) -> Self {
        let message = err.to_string();
        match err {
            ArticleServiceError::Forbidden { actual, .. } => {
                Self::failure(FailureReason::Forbidden, actual, message)
            }
            ArticleServiceError::NotFound { permissions, .. } => {
                Self::failure(FailureReason::NotFound, permissions, message)
            }
            ArticleServiceError::IntegrityViolation(_) => {
                Self::failure(FailureReason::AlreadyTaken, resolved, message)
            }
            ArticleServiceError::Validation(_) => {
                Self::failure(FailureReason::InvalidInput, resolved, message)
            }
            ArticleServiceError::Article(ArticleError::Forbidden(level)) => {
                Self::failure(FailureReason::Forbidden, level, message)
            }
            ArticleServiceError::Article(_) => {
                Self::failure(FailureReason::InvalidInput, resolved, message)
            }
            ArticleServiceError::Repo(_) => {
                error!(
                    "event=api_response module=api status=error error_code=internal error={}",
                    message
                );
                Self::failure(FailureReason::Internal, resolved, message)
            }
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(
            "event=api_request module=api status=rejected reason=invalid_input error={}",
            message
        );
        Self::failure(FailureReason::InvalidInput, PermissionLevel::None, message)
    }
}

/// Response envelope for preview listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    pub previews: Vec<ArticlePreview>,
}

/// Lists previews visible to `actor`.
pub fn list_previews<R, P>(service: &ArticleService<R, P>, actor: Option<&str>) -> PreviewsResponse
where
    R: ArticleRepository,
    P: PermissionResolver,
{
    match service.list_previews(actor) {
        Ok(previews) => PreviewsResponse {
            success: true,
            reason: None,
            previews,
        },
        Err(err) => {
            error!(
                "event=api_response module=api status=error op=list_previews error={}",
                err
            );
            PreviewsResponse {
                success: false,
                reason: Some(FailureReason::Internal),
                previews: Vec::new(),
            }
        }
    }
}

/// Gets one article addressed by a `namespace/name` locator string.
pub fn get_article<R, P>(
    service: &ArticleService<R, P>,
    actor: Option<&str>,
    locator: &str,
) -> ArticleResponse
where
    R: ArticleRepository,
    P: PermissionResolver,
{
    let locator = match Locator::deserialize(locator) {
        Ok(locator) => locator,
        Err(err) => return ArticleResponse::invalid_input(err.to_string()),
    };

    match service.get_article(actor, &locator) {
        Ok(article) => ArticleResponse::success(article),
        Err(err) => {
            let resolved = service.permission_for(actor, &locator.namespace);
            ArticleResponse::from_error(err, resolved)
        }
    }
}

/// Creates an article from a raw JSON body.
pub fn create_article<R, P>(
    service: &mut ArticleService<R, P>,
    actor: Option<&str>,
    body: &str,
) -> ArticleResponse
where
    R: ArticleRepository,
    P: PermissionResolver,
{
    let data = match deserialize_data(body) {
        Ok(data) => data,
        Err(err) => return ArticleResponse::invalid_input(err.to_string()),
    };

    let namespace = data.namespace.clone();
    match service.create_article(actor, data) {
        Ok(article) => ArticleResponse::success(article),
        Err(err) => {
            let resolved = service.permission_for(actor, &namespace);
            ArticleResponse::from_error(err, resolved)
        }
    }
}

/// Renames/updates the article `locator` resolves to from a raw JSON body.
pub fn update_article<R, P>(
    service: &mut ArticleService<R, P>,
    actor: Option<&str>,
    locator: &str,
    body: &str,
) -> ArticleResponse
where
    R: ArticleRepository,
    P: PermissionResolver,
{
    let locator = match Locator::deserialize(locator) {
        Ok(locator) => locator,
        Err(err) => return ArticleResponse::invalid_input(err.to_string()),
    };
    let data = match deserialize_data(body) {
        Ok(data) => data,
        Err(err) => return ArticleResponse::invalid_input(err.to_string()),
    };

    let target_namespace = data.namespace.clone();
    match service.update_article(actor, &locator, data) {
        Ok(article) => ArticleResponse::success(article),
        Err(err) => {
            let resolved = service.permission_for(actor, &target_namespace);
            ArticleResponse::from_error(err, resolved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FailureReason;

    #[test]
    fn failure_reasons_serialize_to_wire_strings() {
        for reason in [
            FailureReason::Forbidden,
            FailureReason::NotFound,
            FailureReason::AlreadyTaken,
            FailureReason::InvalidInput,
            FailureReason::Internal,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
    }
}
