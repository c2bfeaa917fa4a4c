//! Property resolution from the classpath.
//!
//! `application.json` is read first and merged onto the defaults, then every
//! active profile's `application-<profile>.json` is merged on top in order.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::schema::Properties;

/// Base name of every configuration document.
pub const BASE_NAME: &str = "application";

/// Error type for property resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must contain a JSON object at its root", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("merged properties are invalid: {0}")]
    Invalid(#[source] serde_json::Error),
}

/// Resolves [`Properties`] from the documents under a classpath.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    classpath: PathBuf,
}

impl PropertyResolver {
    pub fn new(classpath: impl Into<PathBuf>) -> Self {
        Self {
            classpath: classpath.into(),
        }
    }

    pub fn classpath(&self) -> &Path {
        &self.classpath
    }

    /// Location of the base document (`None`) or of a profile overlay.
    pub fn document_path(&self, profile: Option<&str>) -> PathBuf {
        match profile {
            Some(profile) => self.classpath.join(format!("{}-{}.json", BASE_NAME, profile)),
            None => self.classpath.join(format!("{}.json", BASE_NAME)),
        }
    }

    /// Load the base document and merge the active profiles on top.
    ///
    /// A non-empty `active_profiles` list takes precedence over the base
    /// document's `profiles` field. Every declared profile must have a document.
    pub fn resolve(&self, active_profiles: Option<&str>) -> Result<Properties, ConfigError> {
        let mut merged = defaults();

        let base = self.read_document(None)?;
        let declared = base
            .get("profiles")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        merge(&mut merged, Value::Object(base));

        let profiles = match active_profiles {
            Some(list) if !parse_profiles(list).is_empty() => list.to_string(),
            _ => declared,
        };
        let profiles = parse_profiles(&profiles);

        if !profiles.is_empty() {
            tracing::info!(profiles = ?profiles, "Application active profiles");
        }

        for profile in &profiles {
            let mut overlay = self.read_document(Some(profile))?;
            overlay.remove("profiles");
            merge(&mut merged, Value::Object(overlay));
            tracing::debug!(profile = %profile, "Profile overlay merged");
        }

        let mut properties: Properties =
            serde_json::from_value(merged).map_err(ConfigError::Invalid)?;
        properties.profiles = profiles.join(",");

        tracing::info!(
            classpath = %self.classpath.display(),
            "Application properties resolved"
        );

        Ok(properties)
    }

    fn read_document(&self, profile: Option<&str>) -> Result<Map<String, Value>, ConfigError> {
        let path = self.document_path(profile);
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::NotAnObject { path }),
        }
    }
}

/// Resolve properties from `classpath` with the given comma-separated profiles.
pub fn resolve(classpath: &Path, active_profiles: &str) -> Result<Properties, ConfigError> {
    PropertyResolver::new(classpath).resolve(Some(active_profiles))
}

/// Split a comma-separated profile list, dropping blanks.
pub fn parse_profiles(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deep-merge `overlay` onto `base`.
///
/// Objects merge key by key; any other overlay value replaces the base value.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn defaults() -> Value {
    // Serializing a plain data struct cannot fail.
    serde_json::to_value(Properties::default()).unwrap_or(Value::Object(Map::new()))
}
