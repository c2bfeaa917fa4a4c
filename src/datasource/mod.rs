//! Datasource subsystem.
//!
//! # Data Flow
//! ```text
//! Properties.db
//!     → AnyDatasource::from_properties (variant picked once, by db.type)
//!     → can_start() gates start()
//!     → start(): validate → connect → publish handle → liveness → provision
//!     → stop(): look up handle → mask it in the context → close
//! ```
//!
//! # Design Decisions
//! - One closed set of variants; dispatch happens at construction
//! - Store-specific calls live behind `StoreDriver`; the lifecycle rules live
//!   once in `StoreDatasource`
//! - Errors propagate unmodified; nothing is retried
//! - Provisioning failures leave already-created objects in place

pub mod builder;
pub mod driver;
pub mod entity;
pub mod mongo;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{DbKind, DbProperties, ValidationError};
use crate::context::Context;

pub use builder::DatasourceBuilder;
pub use driver::{StoreDatasource, StoreDriver};
pub use entity::{Column, Entity, EntityDescriptor};
pub use mongo::{MongoDatasource, MongoDriver};
pub use postgres::{PostgresDatasource, PostgresDriver};

/// Boxed driver error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for datasource operations.
#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ValidationError),

    #[error("registered entity list missing from the application context")]
    MissingEntities,

    #[error("no datastore configured")]
    NotConfigured,

    #[error("failed to connect to {kind}: {source}")]
    Connection {
        kind: DbKind,
        #[source]
        source: BoxError,
    },

    #[error("{kind} liveness check failed: {source}")]
    Liveness {
        kind: DbKind,
        #[source]
        source: BoxError,
    },

    #[error("failed to provision `{entity}`: {source}")]
    Provisioning {
        entity: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid entity `{entity}`: {reason}")]
    InvalidEntity { entity: String, reason: &'static str },

    #[error("failed to disconnect from {kind}: {source}")]
    Disconnect {
        kind: DbKind,
        #[source]
        source: BoxError,
    },
}

/// Start/stop capability of a backing store.
///
/// The orchestrator calls `start` at most once, and only when `can_start`
/// returns true. `stop` tolerates a missing handle.
#[async_trait]
pub trait Datasource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// True iff configuration for this datasource is present.
    fn can_start(&self) -> bool;

    /// Connect, check liveness, provision entities, and publish the handle
    /// into `ctx`.
    async fn start(&self, ctx: &mut Context) -> Result<(), DatasourceError>;

    /// Close the published handle, if any.
    async fn stop(&self, ctx: &mut Context) -> Result<(), DatasourceError>;
}

/// The datasource variants this crate ships.
pub enum AnyDatasource {
    Relational(PostgresDatasource),
    Document(MongoDatasource),
    /// No `db` section configured.
    Unconfigured,
}

impl AnyDatasource {
    /// Pick the variant named by `db.type`.
    pub fn from_properties(props: Option<&DbProperties>) -> Result<Self, DatasourceError> {
        let Some(props) = props else {
            return Ok(AnyDatasource::Unconfigured);
        };

        match props.kind {
            Some(DbKind::Postgres) => Ok(AnyDatasource::Relational(StoreDatasource::new(
                PostgresDriver,
                props.clone(),
            ))),
            Some(DbKind::Mongo) => Ok(AnyDatasource::Document(StoreDatasource::new(
                MongoDriver,
                props.clone(),
            ))),
            None => Err(ValidationError::MissingType.into()),
        }
    }

    pub fn kind(&self) -> Option<DbKind> {
        match self {
            AnyDatasource::Relational(_) => Some(DbKind::Postgres),
            AnyDatasource::Document(_) => Some(DbKind::Mongo),
            AnyDatasource::Unconfigured => None,
        }
    }
}

#[async_trait]
impl Datasource for AnyDatasource {
    fn name(&self) -> &'static str {
        match self {
            AnyDatasource::Relational(ds) => ds.name(),
            AnyDatasource::Document(ds) => ds.name(),
            AnyDatasource::Unconfigured => "none",
        }
    }

    fn can_start(&self) -> bool {
        match self {
            AnyDatasource::Relational(ds) => ds.can_start(),
            AnyDatasource::Document(ds) => ds.can_start(),
            AnyDatasource::Unconfigured => false,
        }
    }

    async fn start(&self, ctx: &mut Context) -> Result<(), DatasourceError> {
        match self {
            AnyDatasource::Relational(ds) => ds.start(ctx).await,
            AnyDatasource::Document(ds) => ds.start(ctx).await,
            AnyDatasource::Unconfigured => Err(DatasourceError::NotConfigured),
        }
    }

    async fn stop(&self, ctx: &mut Context) -> Result<(), DatasourceError> {
        match self {
            AnyDatasource::Relational(ds) => ds.stop(ctx).await,
            AnyDatasource::Document(ds) => ds.stop(ctx).await,
            AnyDatasource::Unconfigured => Ok(()),
        }
    }
}
