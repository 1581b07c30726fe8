//! Article domain model.
//!
//! # Responsibility
//! - Define the fixed four-field `ArticleData` record and its sanitization.
//! - Wrap article data with the viewer's permission level and gate reads.
//!
//! # Invariants
//! - Exactly `namespace`, `id`, `title`, `text` survive sanitization; any
//!   other input key is dropped.
//! - All four keys must be present in raw input (`id` may be `null`).
//! - `Article` never hands out data unless its level is readonly or full.
//! - `Article` values are built per request and never shared across requests.

use crate::model::locator::{Locator, LOCATOR_DELIMITER};
use crate::model::permission::{PermissionLevel, PermissionLevelError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length (in characters) of `namespace`, `id` and `title`.
pub const MAX_IDENTITY_FIELD_CHARS: usize = 255;

const KEY_NAMESPACE: &str = "namespace";
const KEY_ID: &str = "id";
const KEY_TITLE: &str = "title";
const KEY_TEXT: &str = "text";

/// The four persisted content fields of an article.
///
/// Field order is the canonical JSON key order. Deserialization goes through
/// [`ArticleData::from_value`], so it drops unknown keys and requires all four.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ArticleData {
    pub namespace: String,
    /// Optional stable ID; articles without one are addressed by title.
    pub id: Option<String>,
    pub title: String,
    pub text: String,
}

impl ArticleData {
    pub fn new(
        namespace: impl Into<String>,
        id: Option<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            id,
            title: title.into(),
            text: text.into(),
        }
    }

    /// Sanitizes a raw JSON object into the fixed field set.
    ///
    /// Unknown keys are discarded. Every known key must be present.
    ///
    /// # Errors
    /// - `ArticleError::InvalidField` when `raw` is not an object or a field
    ///   has the wrong JSON type.
    /// - `ArticleError::KeyMissing` when a known key is absent.
    pub fn from_value(raw: &Value) -> Result<Self, ArticleError> {
        let object = raw.as_object().ok_or(ArticleError::InvalidField {
            key: "data",
            expected: "object",
        })?;

        Ok(Self {
            namespace: required_string(object, KEY_NAMESPACE)?,
            id: nullable_string(object, KEY_ID)?,
            title: required_string(object, KEY_TITLE)?,
            text: required_string(object, KEY_TEXT)?,
        })
    }

    /// Title-based locator for this record.
    pub fn title_locator(&self) -> Locator {
        Locator::new(self.namespace.as_str(), self.title.as_str())
    }

    /// Validates field-level storage constraints.
    ///
    /// # Errors
    /// - Empty namespace/title, empty present id.
    /// - `/` in namespace (locator wire form would be ambiguous).
    /// - Any identity field longer than `MAX_IDENTITY_FIELD_CHARS`.
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        if self.namespace.is_empty() {
            return Err(ArticleValidationError::EmptyNamespace);
        }
        if self.namespace.contains(LOCATOR_DELIMITER) {
            return Err(ArticleValidationError::NamespaceContainsDelimiter(
                self.namespace.clone(),
            ));
        }
        ensure_max_chars(KEY_NAMESPACE, &self.namespace)?;

        if self.title.is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        ensure_max_chars(KEY_TITLE, &self.title)?;

        if let Some(id) = self.id.as_deref() {
            if id.is_empty() {
                return Err(ArticleValidationError::EmptyId);
            }
            ensure_max_chars(KEY_ID, id)?;
        }

        Ok(())
    }
}

impl TryFrom<Value> for ArticleData {
    type Error = ArticleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn required_string(object: &Map<String, Value>, key: &'static str) -> Result<String, ArticleError> {
    match object.get(key) {
        None => Err(ArticleError::KeyMissing(key)),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ArticleError::InvalidField {
            key,
            expected: "string",
        }),
    }
}

fn nullable_string(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ArticleError> {
    match object.get(key) {
        None => Err(ArticleError::KeyMissing(key)),
        Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ArticleError::InvalidField {
            key,
            expected: "string or null",
        }),
    }
}

fn ensure_max_chars(field: &'static str, value: &str) -> Result<(), ArticleValidationError> {
    let actual = value.chars().count();
    if actual > MAX_IDENTITY_FIELD_CHARS {
        return Err(ArticleValidationError::FieldTooLong {
            field,
            max: MAX_IDENTITY_FIELD_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Article data paired with the permission level of the current viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    data: ArticleData,
    permissions: PermissionLevel,
}

impl Article {
    pub fn new(data: ArticleData, permissions: PermissionLevel) -> Self {
        Self { data, permissions }
    }

    /// Builds an article from raw JSON input, sanitizing it first.
    pub fn from_raw(raw: &Value, permissions: PermissionLevel) -> Result<Self, ArticleError> {
        Ok(Self::new(ArticleData::from_value(raw)?, permissions))
    }

    /// Returns article data when the viewer may read it.
    ///
    /// # Errors
    /// - `ArticleError::Forbidden` when the level is `none`.
    pub fn data(&self) -> Result<&ArticleData, ArticleError> {
        self.ensure_is_readable()?;
        Ok(&self.data)
    }

    /// Consuming variant of [`Article::data`].
    pub fn into_data(self) -> Result<ArticleData, ArticleError> {
        self.ensure_is_readable()?;
        Ok(self.data)
    }

    /// Title-based locator; never derived from the stable ID.
    pub fn locator(&self) -> Result<Locator, ArticleError> {
        self.ensure_is_readable()?;
        Ok(self.data.title_locator())
    }

    pub fn permissions(&self) -> PermissionLevel {
        self.permissions
    }

    pub fn is_read_only(&self) -> bool {
        self.permissions == PermissionLevel::ReadOnly
    }

    pub fn is_readable(&self) -> bool {
        self.permissions.is_readable()
    }

    pub fn is_readable_and_writable(&self) -> bool {
        self.permissions.is_writable()
    }

    fn ensure_is_readable(&self) -> Result<(), ArticleError> {
        if self.is_readable() {
            Ok(())
        } else {
            Err(ArticleError::Forbidden(self.permissions))
        }
    }
}

/// Errors raised by article construction, gating and encoding.
#[derive(Debug)]
pub enum ArticleError {
    /// Viewer level is insufficient for the requested access.
    Forbidden(PermissionLevel),
    /// A required key is absent from raw input.
    KeyMissing(&'static str),
    /// A key is present with the wrong JSON type.
    InvalidField {
        key: &'static str,
        expected: &'static str,
    },
    /// Encoded permission string is not a known level.
    InvalidPermission(PermissionLevelError),
    /// Input is not valid JSON.
    Json(serde_json::Error),
}

impl Display for ArticleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(level) => {
                write!(f, "forbidden operation for permission level `{level}`")
            }
            Self::KeyMissing(key) => write!(f, "required key `{key}` is missing"),
            Self::InvalidField { key, expected } => {
                write!(f, "key `{key}` must be a JSON {expected}")
            }
            Self::InvalidPermission(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "malformed article JSON: {err}"),
        }
    }
}

impl Error for ArticleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPermission(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ArticleError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<PermissionLevelError> for ArticleError {
    fn from(value: PermissionLevelError) -> Self {
        Self::InvalidPermission(value)
    }
}

/// Field-level storage constraint violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    EmptyNamespace,
    NamespaceContainsDelimiter(String),
    EmptyTitle,
    EmptyId,
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNamespace => write!(f, "namespace must not be empty"),
            Self::NamespaceContainsDelimiter(namespace) => {
                write!(f, "namespace `{namespace}` must not contain `/`")
            }
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyId => write!(f, "id must be null or non-empty"),
            Self::FieldTooLong { field, max, actual } => {
                write!(f, "{field} is {actual} characters long; maximum is {max}")
            }
        }
    }
}

impl Error for ArticleValidationError {}
