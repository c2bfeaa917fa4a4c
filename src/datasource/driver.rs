//! Shared start/stop lifecycle over a store-specific driver.

use std::time::Instant;

use async_trait::async_trait;

use crate::config::validation::validate_db;
use crate::config::{DbKind, DbProperties};
use crate::context::{Context, ContextKey};
use crate::datasource::{Datasource, DatasourceError, EntityDescriptor};
use crate::observability::metrics;

/// Store-specific operations behind a [`StoreDatasource`].
#[async_trait]
pub trait StoreDriver: Send + Sync + 'static {
    /// Live connection handle published into the context.
    type Handle: Clone + Send + Sync + 'static;

    fn kind(&self) -> DbKind;

    /// Context key the handle is published under.
    fn context_key(&self) -> ContextKey {
        match self.kind() {
            DbKind::Postgres => ContextKey::Relational,
            DbKind::Mongo => ContextKey::Document,
        }
    }

    /// Open a connection. `props.database` is known to be non-empty.
    async fn connect(&self, props: &DbProperties) -> Result<Self::Handle, DatasourceError>;

    /// Post-connect health check. May return a server version string.
    async fn ping(
        &self,
        handle: &Self::Handle,
        props: &DbProperties,
    ) -> Result<Option<String>, DatasourceError>;

    /// Create every missing table/collection. Must succeed when they already exist.
    async fn provision(
        &self,
        handle: &Self::Handle,
        props: &DbProperties,
        entities: &[EntityDescriptor],
    ) -> Result<(), DatasourceError>;

    async fn close(&self, handle: Self::Handle) -> Result<(), DatasourceError>;
}

/// A datasource driving one [`StoreDriver`].
pub struct StoreDatasource<D: StoreDriver> {
    driver: D,
    properties: Option<DbProperties>,
}

impl<D: StoreDriver> StoreDatasource<D> {
    pub fn new(driver: D, properties: DbProperties) -> Self {
        Self {
            driver,
            properties: Some(properties),
        }
    }

    /// A datasource without configuration; it never starts.
    pub fn unconfigured(driver: D) -> Self {
        Self {
            driver,
            properties: None,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn properties(&self) -> Option<&DbProperties> {
        self.properties.as_ref()
    }
}

#[async_trait]
impl<D: StoreDriver> Datasource for StoreDatasource<D> {
    fn name(&self) -> &'static str {
        self.driver.kind().as_str()
    }

    fn can_start(&self) -> bool {
        self.properties.is_some()
    }

    async fn start(&self, ctx: &mut Context) -> Result<(), DatasourceError> {
        let props = self
            .properties
            .as_ref()
            .ok_or(DatasourceError::NotConfigured)?;
        validate_db(props)?;

        let entities = ctx
            .value::<Vec<EntityDescriptor>>(ContextKey::Entities)
            .cloned()
            .ok_or(DatasourceError::MissingEntities)?;

        let kind = self.driver.kind();
        let started = Instant::now();

        tracing::info!(
            kind = %kind,
            host = %props.host,
            port = props.effective_port(),
            database = %props.database,
            "Connecting to datastore"
        );

        let handle = self.driver.connect(props).await?;
        // Published before the liveness check so a failed start can still be stopped.
        *ctx = ctx.with_value(self.driver.context_key(), handle.clone());

        let version = self.driver.ping(&handle, props).await?;
        tracing::info!(kind = %kind, "Connection to datastore succeeded");
        if let Some(version) = version {
            tracing::info!(kind = %kind, version = %version, "Datastore version");
        }

        self.driver.provision(&handle, props, &entities).await?;
        metrics::record_entities_provisioned(kind, entities.len());
        metrics::set_datasource_up(kind, true);

        tracing::info!(
            kind = %kind,
            entities = entities.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Datastore started"
        );

        Ok(())
    }

    async fn stop(&self, ctx: &mut Context) -> Result<(), DatasourceError> {
        let key = self.driver.context_key();
        let Some(handle) = ctx.value::<D::Handle>(key).cloned() else {
            tracing::debug!(kind = %self.driver.kind(), "No datastore handle published, nothing to stop");
            return Ok(());
        };

        *ctx = ctx.without(key);
        metrics::set_datasource_up(self.driver.kind(), false);

        self.driver.close(handle).await?;
        tracing::info!(kind = %self.driver.kind(), "Datastore disconnected");
        Ok(())
    }
}
