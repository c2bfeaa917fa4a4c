//! Application bootstrap library.
//!
//! Loads layered JSON properties, starts a relational or document datastore,
//! serves the embedder's HTTP routes, and shuts everything down on SIGINT or
//! SIGTERM.

pub mod config;
pub mod context;
pub mod datasource;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::Properties;
pub use context::{Context, ContextKey};
pub use datasource::{AnyDatasource, Datasource, DatasourceError, Entity, EntityDescriptor};
pub use lifecycle::{App, AppBuilder, AppError, LifecycleState, ShutdownOrder};
