//! Document datasource backed by MongoDB.
//!
//! # Responsibilities
//! - Build the `mongodb://` URI from `db` properties
//! - Verify the connection with a `ping` command
//! - Create one collection per registered entity, skipping existing ones

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Client;
use url::Url;

use crate::config::{DbKind, DbProperties, ValidationError};
use crate::datasource::driver::{StoreDatasource, StoreDriver};
use crate::datasource::{DatasourceError, EntityDescriptor};

/// Document variant.
pub type MongoDatasource = StoreDatasource<MongoDriver>;

/// `mongodb` implementation of [`StoreDriver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

#[async_trait]
impl StoreDriver for MongoDriver {
    type Handle = Client;

    fn kind(&self) -> DbKind {
        DbKind::Mongo
    }

    async fn connect(&self, props: &DbProperties) -> Result<Client, DatasourceError> {
        let uri = connection_uri(props)?;
        Client::with_uri_str(uri.as_str())
            .await
            .map_err(|e| DatasourceError::Connection {
                kind: DbKind::Mongo,
                source: Box::new(e),
            })
    }

    async fn ping(
        &self,
        client: &Client,
        props: &DbProperties,
    ) -> Result<Option<String>, DatasourceError> {
        client
            .database(&props.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatasourceError::Liveness {
                kind: DbKind::Mongo,
                source: Box::new(e),
            })?;
        Ok(None)
    }

    async fn provision(
        &self,
        client: &Client,
        props: &DbProperties,
        entities: &[EntityDescriptor],
    ) -> Result<(), DatasourceError> {
        let database = client.database(&props.database);
        let mut existing = database
            .list_collection_names()
            .await
            .map_err(|e| DatasourceError::Provisioning {
                entity: props.database.clone(),
                source: Box::new(e),
            })?;

        for entity in entities {
            let name = entity.name();
            if name.trim().is_empty() {
                return Err(DatasourceError::InvalidEntity {
                    entity: name.to_string(),
                    reason: "collection name is empty",
                });
            }
            if existing.iter().any(|c| c == name) {
                tracing::debug!(collection = %name, "Collection already exists");
                continue;
            }

            database
                .create_collection(name)
                .await
                .map_err(|e| DatasourceError::Provisioning {
                    entity: name.to_string(),
                    source: Box::new(e),
                })?;
            existing.push(name.to_string());
            tracing::debug!(collection = %name, "Collection provisioned");
        }
        Ok(())
    }

    async fn close(&self, client: Client) -> Result<(), DatasourceError> {
        client.shutdown().await;
        Ok(())
    }
}

/// `mongodb://[user[:password]@]host:port/database`, with the credentials and
/// the database name percent-encoded.
pub fn connection_uri(props: &DbProperties) -> Result<Url, DatasourceError> {
    let invalid = || DatasourceError::Configuration(ValidationError::InvalidAddress);

    let mut uri = Url::parse(&format!(
        "mongodb://{}:{}",
        props.host,
        props.effective_port()
    ))
    .map_err(|_| invalid())?;
    uri.path_segments_mut()
        .map_err(|_| invalid())?
        .clear()
        .push(&props.database);

    if !props.username.is_empty() {
        uri.set_username(&props.username).map_err(|_| invalid())?;
        if !props.password.is_empty() {
            uri.set_password(Some(&props.password)).map_err(|_| invalid())?;
        }
    }
    Ok(uri)
}
