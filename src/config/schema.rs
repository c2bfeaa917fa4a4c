//! Configuration schema definitions.
//!
//! This module defines the complete property tree of an application.
//! All types derive Serde traits for deserialization from `application*.json`.

use serde::{Deserialize, Serialize};

/// Root configuration for an application.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct Properties {
    /// HTTP server settings.
    pub server: ServerProperties,

    /// Datastore settings. `None` when the application runs without a datastore.
    pub db: Option<DbProperties>,

    /// CORS policy applied to every route.
    pub cors: CorsProperties,

    /// Metrics exporter settings.
    pub observability: ObservabilityProperties,

    /// Comma-separated list of active profiles. Only read from the base file.
    pub profiles: String,
}

impl Properties {
    /// Active profile names in declaration order.
    pub fn active_profiles(&self) -> Vec<String> {
        crate::config::loader::parse_profiles(&self.profiles)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerProperties {
    /// Host or IP to bind.
    pub host: String,

    /// Port to bind. `0` lets the OS pick one.
    pub port: u16,

    /// Deadline for draining in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            shutdown_timeout_secs: 30,
        }
    }
}

impl ServerProperties {
    /// `host:port` as written in the configuration.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Supported backing stores.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum DbKind {
    /// Relational store (PostgreSQL).
    #[serde(rename = "postgresql")]
    Postgres,
    /// Document store (MongoDB).
    #[serde(rename = "mongodb")]
    Mongo,
}

impl DbKind {
    /// Port used when the configuration does not set one.
    pub fn default_port(self) -> u16 {
        match self {
            DbKind::Postgres => 5432,
            DbKind::Mongo => 27017,
        }
    }

    /// Configuration tag of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            DbKind::Postgres => "postgresql",
            DbKind::Mongo => "mongodb",
        }
    }
}

impl std::fmt::Display for DbKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datastore configuration.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DbProperties {
    /// Which backing store to start.
    #[serde(rename = "type")]
    pub kind: Option<DbKind>,

    pub username: String,

    pub password: String,

    /// Database name. Required to start.
    pub database: String,

    pub host: String,

    /// Port; falls back to the kind's default when absent.
    pub port: Option<u16>,
}

impl Default for DbProperties {
    fn default() -> Self {
        Self {
            kind: None,
            username: String::new(),
            password: String::new(),
            database: String::new(),
            host: "localhost".to_string(),
            port: None,
        }
    }
}

impl DbProperties {
    /// Defaults for the given kind.
    pub fn for_kind(kind: DbKind) -> Self {
        Self {
            kind: Some(kind),
            port: Some(kind.default_port()),
            ..Self::default()
        }
    }

    /// Configured port, or the kind's default.
    pub fn effective_port(&self) -> u16 {
        match (self.port, self.kind) {
            (Some(port), _) => port,
            (None, Some(kind)) => kind.default_port(),
            (None, None) => 0,
        }
    }
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for DbProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbProperties")
            .field("kind", &self.kind)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// CORS policy. Each field is a comma-separated list or `*`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsProperties {
    pub allowed_origins: String,
    pub allowed_headers: String,
    pub allowed_methods: String,
}

impl Default for CorsProperties {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_string(),
            allowed_headers: "*".to_string(),
            allowed_methods: "*".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityProperties {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityProperties {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
