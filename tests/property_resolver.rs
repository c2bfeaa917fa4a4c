//! Property resolution from classpath documents.

use app_bootstrap::config::loader::resolve;
use app_bootstrap::config::{ConfigError, DbKind, PropertyResolver};

mod common;

#[test]
fn base_document_merges_onto_defaults() {
    let dir = common::classpath(&[(
        "application.json",
        r#"{"db": {"type": "postgresql", "database": "app"}}"#,
    )]);

    let props = PropertyResolver::new(dir.path()).resolve(None).unwrap();

    assert_eq!(props.server.port, 8080);
    assert_eq!(props.server.host, "localhost");
    assert_eq!(props.cors.allowed_methods, "*");
    let db = props.db.unwrap();
    assert_eq!(db.kind, Some(DbKind::Postgres));
    assert_eq!(db.database, "app");
    assert_eq!(db.effective_port(), 5432);
}

#[test]
fn profile_overlay_overrides_only_present_fields() {
    let dir = common::classpath(&[
        (
            "application.json",
            r#"{
                "profiles": "prod",
                "server": {"host": "0.0.0.0", "port": 8000},
                "db": {"type": "postgresql", "database": "app", "username": "svc"}
            }"#,
        ),
        ("application-prod.json", r#"{"server": {"port": 9090}}"#),
    ]);

    let props = PropertyResolver::new(dir.path()).resolve(None).unwrap();

    assert_eq!(props.server.port, 9090);
    assert_eq!(props.server.host, "0.0.0.0");
    let db = props.db.unwrap();
    assert_eq!(db.database, "app");
    assert_eq!(db.username, "svc");
    assert_eq!(props.profiles, "prod");
}

#[test]
fn profiles_apply_in_declared_order() {
    let dir = common::classpath(&[
        ("application.json", r#"{"profiles": "a, b"}"#),
        ("application-a.json", r#"{"server": {"port": 1111, "host": "a.local"}}"#),
        ("application-b.json", r#"{"server": {"port": 2222}}"#),
    ]);

    let props = PropertyResolver::new(dir.path()).resolve(None).unwrap();

    assert_eq!(props.server.port, 2222);
    assert_eq!(props.server.host, "a.local");
    assert_eq!(props.active_profiles(), vec!["a", "b"]);
}

#[test]
fn nested_db_fields_merge_recursively() {
    let dir = common::classpath(&[
        (
            "application.json",
            r#"{"db": {"type": "mongodb", "database": "app", "host": "db1"}}"#,
        ),
        ("application-dev.json", r#"{"db": {"host": "localhost", "port": 27018}}"#),
    ]);

    let props = resolve(dir.path(), "dev").unwrap();
    let db = props.db.unwrap();

    assert_eq!(db.kind, Some(DbKind::Mongo));
    assert_eq!(db.database, "app");
    assert_eq!(db.host, "localhost");
    assert_eq!(db.effective_port(), 27018);
}

#[test]
fn explicit_profiles_take_precedence_over_base_document() {
    let dir = common::classpath(&[
        ("application.json", r#"{"profiles": "prod"}"#),
        ("application-test.json", r#"{"server": {"port": 7070}}"#),
    ]);

    let props = PropertyResolver::new(dir.path())
        .resolve(Some("test"))
        .unwrap();

    assert_eq!(props.server.port, 7070);
    assert_eq!(props.profiles, "test");
}

#[test]
fn overlay_cannot_declare_profiles() {
    let dir = common::classpath(&[
        ("application.json", r#"{"profiles": "a"}"#),
        ("application-a.json", r#"{"profiles": "b"}"#),
    ]);

    let props = PropertyResolver::new(dir.path()).resolve(None).unwrap();
    assert_eq!(props.profiles, "a");
}

#[test]
fn missing_base_document_is_fatal() {
    let dir = common::classpath(&[]);

    let err = PropertyResolver::new(dir.path()).resolve(None).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("application.json")),
        other => panic!("expected an io error, got {other}"),
    }
}

#[test]
fn missing_profile_document_is_fatal() {
    let dir = common::classpath(&[("application.json", r#"{"profiles": "prod"}"#)]);

    let err = PropertyResolver::new(dir.path()).resolve(None).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("application-prod.json")),
        other => panic!("expected an io error, got {other}"),
    }
}

#[test]
fn malformed_document_is_a_parse_error() {
    let dir = common::classpath(&[("application.json", r#"{"server": {"port": "#)]);

    let err = PropertyResolver::new(dir.path()).resolve(None).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn non_object_document_is_rejected() {
    let dir = common::classpath(&[("application.json", "[1, 2, 3]")]);

    let err = PropertyResolver::new(dir.path()).resolve(None).unwrap_err();
    assert!(matches!(err, ConfigError::NotAnObject { .. }));
}

#[test]
fn wrongly_typed_field_is_invalid() {
    let dir = common::classpath(&[("application.json", r#"{"server": {"port": "high"}}"#)]);

    let err = PropertyResolver::new(dir.path()).resolve(None).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
