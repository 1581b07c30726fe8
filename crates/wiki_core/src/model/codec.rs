//! Canonical JSON codec for articles.
//!
//! # Responsibility
//! - Encode/decode an `Article` as `{"data": {...}, "permissions": "..."}`.
//! - Encode/decode bare `ArticleData` without a permission envelope.
//!
//! # Invariants
//! - Encoding an article goes through the read gate; level `none` fails.
//! - Decoding sanitizes `data` to the fixed four-field set.
//! - Decoding an article restores the embedded level without consulting a
//!   resolver. The enveloped form is an internal representation: only decode
//!   strings produced by [`serialize_article`] within the same trusted
//!   process, never request payloads. Public responses use `crate::api`.

use crate::model::article::{Article, ArticleData, ArticleError};
use crate::model::permission::PermissionLevel;
use serde::Serialize;
use serde_json::Value;

const KEY_DATA: &str = "data";
const KEY_PERMISSIONS: &str = "permissions";

#[derive(Serialize)]
struct ArticleEnvelope<'a> {
    data: &'a ArticleData,
    permissions: PermissionLevel,
}

/// Encodes a readable article with its permission level.
///
/// # Errors
/// - `ArticleError::Forbidden` when the article is not readable.
pub fn serialize_article(article: &Article) -> Result<String, ArticleError> {
    let envelope = ArticleEnvelope {
        data: article.data()?,
        permissions: article.permissions(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decodes an article from its trusted internal encoding.
///
/// # Errors
/// - `ArticleError::Json` for malformed JSON.
/// - `ArticleError::KeyMissing` when `data`, `permissions` or a data key is
///   absent.
/// - `ArticleError::InvalidPermission` for an unknown level string.
pub fn deserialize_article(encoded: &str) -> Result<Article, ArticleError> {
    let parsed: Value = serde_json::from_str(encoded)?;
    let object = parsed.as_object().ok_or(ArticleError::InvalidField {
        key: "article",
        expected: "object",
    })?;

    let data = object.get(KEY_DATA).ok_or(ArticleError::KeyMissing(KEY_DATA))?;
    let permissions = match object.get(KEY_PERMISSIONS) {
        None => return Err(ArticleError::KeyMissing(KEY_PERMISSIONS)),
        Some(Value::String(value)) => value.parse::<PermissionLevel>()?,
        Some(_) => {
            return Err(ArticleError::InvalidField {
                key: KEY_PERMISSIONS,
                expected: "string",
            })
        }
    };

    Article::from_raw(data, permissions)
}

/// Encodes bare article data. Callers must have checked permission already.
pub fn serialize_data(data: &ArticleData) -> Result<String, ArticleError> {
    Ok(serde_json::to_string(data)?)
}

/// Decodes and sanitizes bare article data, dropping unknown keys.
pub fn deserialize_data(encoded: &str) -> Result<ArticleData, ArticleError> {
    let parsed: Value = serde_json::from_str(encoded)?;
    ArticleData::from_value(&parsed)
}

#[cfg(test)]
mod tests {
    use super::{deserialize_article, deserialize_data, serialize_article, serialize_data};
    use crate::model::article::{Article, ArticleData, ArticleError};
    use crate::model::permission::PermissionLevel;

    fn intro() -> ArticleData {
        ArticleData::new("public", None, "Intro", "hello")
    }

    #[test]
    fn article_round_trips_for_readable_levels() {
        for level in [PermissionLevel::ReadOnly, PermissionLevel::Full] {
            let article = Article::new(intro(), level);
            let encoded = serialize_article(&article).expect("readable article encodes");
            let decoded = deserialize_article(&encoded).expect("encoded article decodes");
            assert_eq!(decoded, article);
        }
    }

    #[test]
    fn article_encoding_is_canonical() {
        let article = Article::new(
            ArticleData::new("public", Some("intro".to_string()), "Intro", "hello"),
            PermissionLevel::Full,
        );
        assert_eq!(
            serialize_article(&article).unwrap(),
            r#"{"data":{"namespace":"public","id":"intro","title":"Intro","text":"hello"},"permissions":"full"}"#
        );
    }

    #[test]
    fn hidden_article_cannot_be_encoded() {
        let article = Article::new(intro(), PermissionLevel::None);
        let err = serialize_article(&article).expect_err("none level must not encode");
        assert!(matches!(err, ArticleError::Forbidden(PermissionLevel::None)));
    }

    #[test]
    fn decoding_requires_permissions_key() {
        let err = deserialize_article(
            r#"{"data":{"namespace":"n","id":null,"title":"t","text":""}}"#,
        )
        .expect_err("missing permissions must fail");
        assert!(matches!(err, ArticleError::KeyMissing("permissions")));
    }

    #[test]
    fn decoding_rejects_unknown_permission_strings() {
        let err = deserialize_article(
            r#"{"data":{"namespace":"n","id":null,"title":"t","text":""},"permissions":"admin"}"#,
        )
        .expect_err("unknown level must fail");
        assert!(matches!(err, ArticleError::InvalidPermission(_)));
    }

    #[test]
    fn data_round_trips_and_drops_extra_keys() {
        let data = ArticleData::new("public", Some("x".to_string()), "X", "body");
        let decoded = deserialize_data(&serialize_data(&data).unwrap()).unwrap();
        assert_eq!(decoded, data);

        let over_posted = deserialize_data(
            r#"{"namespace":"public","id":"x","title":"X","text":"body","is_admin":true}"#,
        )
        .unwrap();
        assert_eq!(over_posted, data);
        assert_eq!(
            deserialize_data(&serialize_data(&over_posted).unwrap()).unwrap(),
            over_posted
        );
    }

    #[test]
    fn data_decoding_reports_missing_and_mistyped_keys() {
        let missing = deserialize_data(r#"{"namespace":"n","title":"t","text":""}"#)
            .expect_err("missing id must fail");
        assert!(matches!(missing, ArticleError::KeyMissing("id")));

        let mistyped = deserialize_data(r#"{"namespace":"n","id":7,"title":"t","text":""}"#)
            .expect_err("numeric id must fail");
        assert!(matches!(mistyped, ArticleError::InvalidField { key: "id", .. }));

        let malformed = deserialize_data("{").expect_err("broken JSON must fail");
        assert!(matches!(malformed, ArticleError::Json(_)));
    }
}
