//! CORS policy from `cors` properties.
//!
//! Each property is a comma-separated list. A `*` entry allows anything; an
//! empty value allows nothing.

use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::CorsProperties;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cors.{field} entry `{value}`")]
pub struct CorsError {
    pub field: &'static str,
    pub value: String,
}

/// Parsed form of one CORS property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patterns {
    Wildcard,
    List(Vec<String>),
}

impl Patterns {
    pub fn parse(raw: &str) -> Self {
        let entries: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();

        if entries.iter().any(|e| e == "*") {
            Patterns::Wildcard
        } else {
            Patterns::List(entries)
        }
    }
}

/// Build the CORS layer for every route.
pub fn cors_layer(props: &CorsProperties) -> Result<CorsLayer, CorsError> {
    let origins = match Patterns::parse(&props.allowed_origins) {
        Patterns::Wildcard => AllowOrigin::from(Any),
        Patterns::List(list) => AllowOrigin::list(parse_all(list, "allowed_origins", |v| {
            HeaderValue::from_str(v).ok()
        })?),
    };

    let methods = match Patterns::parse(&props.allowed_methods) {
        Patterns::Wildcard => AllowMethods::from(Any),
        Patterns::List(list) => AllowMethods::list(parse_all(list, "allowed_methods", |v| {
            Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
        })?),
    };

    let headers = match Patterns::parse(&props.allowed_headers) {
        Patterns::Wildcard => AllowHeaders::from(Any),
        Patterns::List(list) => AllowHeaders::list(parse_all(list, "allowed_headers", |v| {
            HeaderName::from_bytes(v.as_bytes()).ok()
        })?),
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers))
}

fn parse_all<T>(
    entries: Vec<String>,
    field: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, CorsError> {
    entries
        .into_iter()
        .map(|value| parse(&value).ok_or(CorsError { field, value }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_anywhere_is_wildcard() {
        assert_eq!(Patterns::parse("*"), Patterns::Wildcard);
        assert_eq!(Patterns::parse("https://a.example, *"), Patterns::Wildcard);
    }

    #[test]
    fn lists_are_trimmed() {
        assert_eq!(
            Patterns::parse(" GET , POST,"),
            Patterns::List(vec!["GET".into(), "POST".into()])
        );
        assert_eq!(Patterns::parse(""), Patterns::List(vec![]));
    }

    #[test]
    fn default_policy_builds() {
        assert!(cors_layer(&CorsProperties::default()).is_ok());
    }

    #[test]
    fn explicit_lists_build() {
        let props = CorsProperties {
            allowed_origins: "https://app.example, https://admin.example".into(),
            allowed_headers: "content-type, authorization".into(),
            allowed_methods: "get, post".into(),
        };
        assert!(cors_layer(&props).is_ok());
    }

    #[test]
    fn invalid_header_name_is_reported() {
        let props = CorsProperties {
            allowed_headers: "bad header".into(),
            ..CorsProperties::default()
        };
        let err = cors_layer(&props).unwrap_err();
        assert_eq!(err.field, "allowed_headers");
        assert_eq!(err.value, "bad header");
    }
}
