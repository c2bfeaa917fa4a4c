//! Relational datasource backed by PostgreSQL.
//!
//! # Responsibilities
//! - Build connect options from `db` properties
//! - Verify the connection with `SELECT version()`
//! - Create one table per registered entity (`CREATE TABLE IF NOT EXISTS`)

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::{DbKind, DbProperties};
use crate::datasource::driver::{StoreDatasource, StoreDriver};
use crate::datasource::{DatasourceError, EntityDescriptor};

/// Relational variant.
pub type PostgresDatasource = StoreDatasource<PostgresDriver>;

/// `sqlx` implementation of [`StoreDriver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl PostgresDriver {
    fn connect_options(props: &DbProperties) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&props.host)
            .port(props.effective_port())
            .database(&props.database);

        if !props.username.is_empty() {
            options = options.username(&props.username);
        }
        if !props.password.is_empty() {
            options = options.password(&props.password);
        }
        options
    }
}

#[async_trait]
impl StoreDriver for PostgresDriver {
    type Handle = PgPool;

    fn kind(&self) -> DbKind {
        DbKind::Postgres
    }

    async fn connect(&self, props: &DbProperties) -> Result<PgPool, DatasourceError> {
        PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(Self::connect_options(props))
            .await
            .map_err(|e| DatasourceError::Connection {
                kind: DbKind::Postgres,
                source: Box::new(e),
            })
    }

    async fn ping(
        &self,
        pool: &PgPool,
        _props: &DbProperties,
    ) -> Result<Option<String>, DatasourceError> {
        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(pool)
            .await
            .map_err(|e| DatasourceError::Liveness {
                kind: DbKind::Postgres,
                source: Box::new(e),
            })?;
        Ok(Some(version))
    }

    async fn provision(
        &self,
        pool: &PgPool,
        _props: &DbProperties,
        entities: &[EntityDescriptor],
    ) -> Result<(), DatasourceError> {
        for entity in entities {
            let statement = create_table_statement(entity)?;
            sqlx::query(&statement)
                .execute(pool)
                .await
                .map_err(|e| DatasourceError::Provisioning {
                    entity: entity.name().to_string(),
                    source: Box::new(e),
                })?;
            tracing::debug!(table = %entity.name(), "Table provisioned");
        }
        Ok(())
    }

    async fn close(&self, pool: PgPool) -> Result<(), DatasourceError> {
        pool.close().await;
        Ok(())
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for an entity.
pub fn create_table_statement(entity: &EntityDescriptor) -> Result<String, DatasourceError> {
    if entity.name().trim().is_empty() {
        return Err(DatasourceError::InvalidEntity {
            entity: entity.name().to_string(),
            reason: "table name is empty",
        });
    }

    let mut columns = Vec::with_capacity(entity.columns().len());
    for column in entity.columns() {
        if column.name.trim().is_empty() || column.sql_type.trim().is_empty() {
            return Err(DatasourceError::InvalidEntity {
                entity: entity.name().to_string(),
                reason: "column name and type must be set",
            });
        }

        let mut definition = format!("{} {}", quote_ident(&column.name), column.sql_type);
        if column.primary_key {
            definition.push_str(" PRIMARY KEY");
        } else if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        columns.push(definition);
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(entity.name()),
        columns.join(", ")
    ))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::Column;

    #[test]
    fn renders_idempotent_ddl() {
        let entity = EntityDescriptor::new("users")
            .column(Column::new("id", "BIGSERIAL").primary_key())
            .column(Column::new("email", "TEXT").not_null())
            .column(Column::new("nickname", "TEXT"));

        assert_eq!(
            create_table_statement(&entity).unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "users" ("id" BIGSERIAL PRIMARY KEY, "email" TEXT NOT NULL, "nickname" TEXT)"#
        );
    }

    #[test]
    fn entity_without_columns_is_allowed() {
        let entity = EntityDescriptor::new("audit");
        assert_eq!(
            create_table_statement(&entity).unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "audit" ()"#
        );
    }

    #[test]
    fn identifiers_are_escaped() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn empty_table_name_is_rejected() {
        let err = create_table_statement(&EntityDescriptor::new(" ")).unwrap_err();
        assert!(matches!(err, DatasourceError::InvalidEntity { .. }));
    }

    #[test]
    fn connect_options_use_kind_default_port() {
        let mut props = DbProperties::for_kind(DbKind::Postgres);
        props.port = None;
        props.database = "app".into();
        let options = PostgresDriver::connect_options(&props);
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_database(), Some("app"));
    }
}
