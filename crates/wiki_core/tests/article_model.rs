use serde_json::json;
use wiki_core::model::codec::{deserialize_article, serialize_article};
use wiki_core::{
    Article, ArticleData, ArticleError, ArticleValidationError, Locator, PermissionLevel,
};

fn intro() -> ArticleData {
    ArticleData::new("public", None, "Intro", "hello")
}

#[test]
fn full_article_exposes_data_and_title_locator() {
    let article = Article::new(intro(), PermissionLevel::Full);

    assert_eq!(article.data().unwrap(), &intro());
    assert_eq!(article.locator().unwrap(), Locator::new("public", "Intro"));
    assert!(article.is_readable());
    assert!(article.is_readable_and_writable());
    assert!(!article.is_read_only());
}

#[test]
fn locator_is_title_based_even_when_id_is_set() {
    let data = ArticleData::new("public", Some("intro-id".to_string()), "Intro", "hello");
    let article = Article::new(data, PermissionLevel::ReadOnly);
    assert_eq!(article.locator().unwrap().name, "Intro");
    assert!(article.is_read_only());
    assert!(!article.is_readable_and_writable());
}

#[test]
fn hidden_article_gates_every_accessor() {
    let article = Article::new(intro(), PermissionLevel::None);

    assert!(!article.is_readable());
    assert!(matches!(
        article.data(),
        Err(ArticleError::Forbidden(PermissionLevel::None))
    ));
    assert!(matches!(article.locator(), Err(ArticleError::Forbidden(_))));
    assert!(matches!(
        serialize_article(&article),
        Err(ArticleError::Forbidden(_))
    ));
    assert!(matches!(article.into_data(), Err(ArticleError::Forbidden(_))));
}

#[test]
fn same_data_with_different_levels_are_distinct() {
    let readonly = Article::new(intro(), PermissionLevel::ReadOnly);
    let full = Article::new(intro(), PermissionLevel::Full);
    assert_ne!(readonly, full);
}

#[test]
fn raw_construction_drops_unknown_keys() {
    let raw = json!({
        "namespace": "public",
        "id": null,
        "title": "Intro",
        "text": "hello",
        "created_at": 0,
        "permissions": "full"
    });
    let article = Article::from_raw(&raw, PermissionLevel::ReadOnly).unwrap();
    assert_eq!(article.data().unwrap(), &intro());
    assert_eq!(article.permissions(), PermissionLevel::ReadOnly);
}

#[test]
fn raw_construction_requires_every_known_key() {
    for missing in ["namespace", "id", "title", "text"] {
        let mut raw = json!({
            "namespace": "public",
            "id": "intro",
            "title": "Intro",
            "text": "hello"
        });
        raw.as_object_mut().unwrap().remove(missing);

        let err = Article::from_raw(&raw, PermissionLevel::Full).unwrap_err();
        assert!(
            matches!(err, ArticleError::KeyMissing(key) if key == missing),
            "expected KeyMissing({missing}), got {err}"
        );
    }
}

#[test]
fn encoded_article_round_trips_through_trusted_codec() {
    let data = ArticleData::new("maths", Some("ag".to_string()), "Algebraic Geometry", "x");
    for level in [PermissionLevel::ReadOnly, PermissionLevel::Full] {
        let encoded = serialize_article(&Article::new(data.clone(), level)).unwrap();
        let decoded = deserialize_article(&encoded).unwrap();
        assert_eq!(decoded.data().unwrap(), &data);
        assert_eq!(decoded.permissions(), level);
    }
}

#[test]
fn validation_enforces_identity_field_constraints() {
    assert_eq!(intro().validate(), Ok(()));

    let slash = ArticleData::new("a/b", None, "t", "");
    assert_eq!(
        slash.validate(),
        Err(ArticleValidationError::NamespaceContainsDelimiter(
            "a/b".to_string()
        ))
    );

    let empty_id = ArticleData::new("n", Some(String::new()), "t", "");
    assert_eq!(empty_id.validate(), Err(ArticleValidationError::EmptyId));

    let empty_title = ArticleData::new("n", None, "", "");
    assert_eq!(empty_title.validate(), Err(ArticleValidationError::EmptyTitle));

    let long_title = ArticleData::new("n", None, "t".repeat(256), "");
    assert_eq!(
        long_title.validate(),
        Err(ArticleValidationError::FieldTooLong {
            field: "title",
            max: 255,
            actual: 256
        })
    );

    let max_title = ArticleData::new("n", None, "ü".repeat(255), "x".repeat(10_000));
    assert_eq!(max_title.validate(), Ok(()));
}

#[test]
fn serde_decoding_requires_every_key_and_drops_extras() {
    let missing_id = serde_json::from_str::<ArticleData>(
        r#"{"namespace":"n","title":"t","text":""}"#,
    )
    .unwrap_err();
    assert!(missing_id.to_string().contains("required key `id` is missing"));

    let decoded = serde_json::from_str::<ArticleData>(
        r#"{"namespace":"public","id":null,"title":"Intro","text":"hello","permissions":"full"}"#,
    )
    .unwrap();
    assert_eq!(decoded, intro());
}
