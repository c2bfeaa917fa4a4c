//! Explicit construction of a datasource variant.

use crate::config::validation::validate_db;
use crate::config::{DbKind, DbProperties, ValidationError};
use crate::datasource::{AnyDatasource, MongoDriver, PostgresDriver, StoreDatasource};

/// Builder for [`AnyDatasource`] with per-kind defaults.
///
/// ```
/// use app_bootstrap::datasource::DatasourceBuilder;
///
/// let datasource = DatasourceBuilder::postgres()
///     .username("app")
///     .password("secret")
///     .database("orders")
///     .build()
///     .unwrap();
/// assert!(datasource.kind().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DatasourceBuilder {
    properties: DbProperties,
}

impl DatasourceBuilder {
    /// Start from the defaults of `kind` (host `localhost`, default port).
    pub fn new(kind: DbKind) -> Self {
        Self {
            properties: DbProperties::for_kind(kind),
        }
    }

    pub fn postgres() -> Self {
        Self::new(DbKind::Postgres)
    }

    pub fn mongo() -> Self {
        Self::new(DbKind::Mongo)
    }

    /// Start from already-resolved properties.
    pub fn from_properties(properties: DbProperties) -> Self {
        Self { properties }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.properties.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.properties.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.properties.database = database.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.properties.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.properties.port = Some(port);
        self
    }

    /// Validate the required settings and construct the variant.
    pub fn build(self) -> Result<AnyDatasource, ValidationError> {
        validate_db(&self.properties)?;
        match self.properties.kind {
            Some(DbKind::Postgres) => Ok(AnyDatasource::Relational(StoreDatasource::new(
                PostgresDriver,
                self.properties,
            ))),
            Some(DbKind::Mongo) => Ok(AnyDatasource::Document(StoreDatasource::new(
                MongoDriver,
                self.properties,
            ))),
            None => Err(ValidationError::MissingType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::Datasource;

    #[test]
    fn build_requires_database() {
        let result = DatasourceBuilder::mongo().username("u").build();
        assert!(matches!(result, Err(ValidationError::MissingDatabase)));
    }

    #[test]
    fn build_requires_type() {
        let mut props = DbProperties::default();
        props.database = "app".into();
        let result = DatasourceBuilder::from_properties(props).build();
        assert!(matches!(result, Err(ValidationError::MissingType)));
    }

    #[test]
    fn build_applies_kind_defaults() {
        let ds = DatasourceBuilder::postgres().database("app").build().unwrap();
        match ds {
            AnyDatasource::Relational(ref inner) => {
                let props = inner.properties().unwrap();
                assert_eq!(props.host, "localhost");
                assert_eq!(props.effective_port(), 5432);
            }
            _ => panic!("expected the relational variant"),
        }
        assert!(ds.can_start());
        assert_eq!(ds.name(), "postgresql");
    }

    #[test]
    fn explicit_port_wins() {
        let ds = DatasourceBuilder::mongo()
            .database("app")
            .host("db.internal")
            .port(27018)
            .build()
            .unwrap();
        match ds {
            AnyDatasource::Document(inner) => {
                let props = inner.properties().unwrap();
                assert_eq!(props.host, "db.internal");
                assert_eq!(props.effective_port(), 27018);
            }
            _ => panic!("expected the document variant"),
        }
    }
}
