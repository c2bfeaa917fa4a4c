//! Configuration validation.
//!
//! Serde handles the syntax; the checks here gate whether a datasource may
//! be constructed or started.

use thiserror::Error;

use crate::config::schema::DbProperties;

/// A required setting is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("database is not set; set property {{\"db\": {{\"database\": \"...\"}}}}")]
    MissingDatabase,

    #[error("datastore type is not set; set property {{\"db\": {{\"type\": \"postgresql\" | \"mongodb\"}}}}")]
    MissingType,

    #[error("db.host and db.port do not form a valid address")]
    InvalidAddress,
}

impl ValidationError {
    /// Dotted path of the offending setting.
    pub fn setting(&self) -> &'static str {
        match self {
            ValidationError::MissingDatabase => "db.database",
            ValidationError::MissingType => "db.type",
            ValidationError::InvalidAddress => "db.host",
        }
    }
}

/// Check the settings every datasource needs before it may connect.
pub fn validate_db(props: &DbProperties) -> Result<(), ValidationError> {
    if props.database.trim().is_empty() {
        return Err(ValidationError::MissingDatabase);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DbKind;

    #[test]
    fn empty_database_is_rejected() {
        let props = DbProperties::for_kind(DbKind::Postgres);
        let err = validate_db(&props).unwrap_err();
        assert_eq!(err, ValidationError::MissingDatabase);
        assert_eq!(err.setting(), "db.database");
        assert!(err.to_string().contains("database"));
    }

    #[test]
    fn blank_database_is_rejected() {
        let mut props = DbProperties::for_kind(DbKind::Mongo);
        props.database = "   ".into();
        assert!(validate_db(&props).is_err());
    }

    #[test]
    fn named_database_passes() {
        let mut props = DbProperties::for_kind(DbKind::Postgres);
        props.database = "app".into();
        assert!(validate_db(&props).is_ok());
    }
}
