//! Application lifecycle orchestrator.
//!
//! # Responsibilities
//! - Resolve the classpath and the layered properties
//! - Select, gate, and start the datasource before any traffic is accepted
//! - Serve the embedder's controllers on their own task
//! - On a termination signal, stop the datasource and drain the server
//!
//! Every startup error is returned as-is; the caller is expected to log it and
//! exit. Nothing is retried and no partial startup is rolled back.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use axum::Router;
use thiserror::Error;

use crate::config::{ConfigError, Properties, PropertyResolver};
use crate::context::{Context, ContextKey};
use crate::datasource::{AnyDatasource, Datasource, DatasourceError, Entity, EntityDescriptor};
use crate::http::{self, CorsError, Server, ServerError, ServerHandle};
use crate::lifecycle::state::{Lifecycle, LifecycleError, LifecycleState};
use crate::lifecycle::{signals, startup};
use crate::observability::metrics;

/// Error type for the application lifecycle.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to resolve classpath: {0}")]
    Classpath(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("datasource failed to start: {0}")]
    Datasource(#[source] DatasourceError),

    #[error("datasource failed to stop: {0}")]
    DatasourceStop(#[source] DatasourceError),

    #[error(transparent)]
    Cors(#[from] CorsError),

    #[error(transparent)]
    Server(ServerError),

    #[error("server failed to shut down: {0}")]
    ServerShutdown(#[source] ServerError),

    #[error("failed to wait for a termination signal: {0}")]
    Signal(#[source] io::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Order in which resources are released on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownOrder {
    /// Stop the datastore, then drain the server.
    #[default]
    DatasourceFirst,
    /// Drain the server, then stop the datastore.
    ServerFirst,
}

/// Builder for [`App`].
#[derive(Default)]
pub struct AppBuilder {
    classpath: Option<PathBuf>,
    profiles: Option<String>,
    datasource: Option<Box<dyn Datasource>>,
    controllers: Option<Router>,
    entities: Vec<EntityDescriptor>,
    shutdown_order: ShutdownOrder,
}

impl AppBuilder {
    /// Directory holding `application*.json`.
    pub fn classpath(mut self, classpath: impl Into<PathBuf>) -> Self {
        self.classpath = Some(classpath.into());
        self
    }

    /// Comma-separated profile list. Overrides the base document's `profiles`.
    pub fn profiles(mut self, profiles: impl Into<String>) -> Self {
        self.profiles = Some(profiles.into());
        self
    }

    /// Use this datasource instead of the one selected from `db.type`.
    pub fn datasource(mut self, datasource: impl Datasource + 'static) -> Self {
        self.datasource = Some(Box::new(datasource));
        self
    }

    /// Application routes. Repeated calls merge the routers.
    pub fn rest(mut self, controllers: Router) -> Self {
        self.controllers = Some(match self.controllers.take() {
            Some(existing) => existing.merge(controllers),
            None => controllers,
        });
        self
    }

    /// Register an entity type for provisioning.
    pub fn entity<E: Entity>(self) -> Self {
        self.register(E::descriptor())
    }

    pub fn register(mut self, descriptor: EntityDescriptor) -> Self {
        self.entities.push(descriptor);
        self
    }

    pub fn shutdown_order(mut self, order: ShutdownOrder) -> Self {
        self.shutdown_order = order;
        self
    }

    pub fn build(self) -> App {
        App {
            classpath: self.classpath,
            profiles: self.profiles,
            datasource: self.datasource,
            controllers: self.controllers,
            entities: self.entities,
            shutdown_order: self.shutdown_order,
            lifecycle: Lifecycle::new(),
            context: Context::root(),
            properties: None,
            local_addr: None,
        }
    }
}

/// A bootstrapped application.
pub struct App {
    classpath: Option<PathBuf>,
    profiles: Option<String>,
    datasource: Option<Box<dyn Datasource>>,
    controllers: Option<Router>,
    entities: Vec<EntityDescriptor>,
    shutdown_order: ShutdownOrder,
    lifecycle: Lifecycle,
    context: Context,
    properties: Option<Properties>,
    local_addr: Option<SocketAddr>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Current application context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Resolved properties, once loaded.
    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    pub fn classpath(&self) -> Option<&Path> {
        self.classpath.as_deref()
    }

    /// Address the server listens on, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Start, then block until SIGINT/SIGTERM and shut down.
    pub async fn run(&mut self) -> Result<(), AppError> {
        self.run_until(signals::wait_for_termination()).await
    }

    /// Start, then block until `signal` resolves and shut down.
    ///
    /// A server that exits on its own before the signal is a fatal error.
    pub async fn run_until<F>(&mut self, signal: F) -> Result<(), AppError>
    where
        F: Future<Output = io::Result<&'static str>>,
    {
        let mut server = self.start().await?;

        tokio::select! {
            received = signal => {
                let name = received.map_err(AppError::Signal)?;
                tracing::info!(signal = name, "Termination signal received");
            }
            result = server.stopped() => {
                let err = match result {
                    Err(e) => e,
                    Ok(()) => ServerError::Serve(io::Error::other(
                        "server exited before shutdown was requested",
                    )),
                };
                tracing::error!(error = %err, "HTTP server terminated");
                return Err(AppError::Server(err));
            }
        }

        self.shutdown(server).await
    }

    /// Run every startup phase and return the running server.
    pub async fn start(&mut self) -> Result<ServerHandle, AppError> {
        // Classpath
        let phase = self.enter(LifecycleState::ConfiguringClasspath)?;
        self.context = Context::root();
        let classpath =
            startup::resolve_classpath(self.classpath.take()).map_err(AppError::Classpath)?;
        tracing::info!(classpath = %classpath.display(), "Application classpath configured");
        self.classpath = Some(classpath.clone());
        metrics::record_phase(LifecycleState::ConfiguringClasspath, phase);

        // Properties
        let phase = self.enter(LifecycleState::LoadingProperties)?;
        let properties = PropertyResolver::new(&classpath).resolve(self.profiles.as_deref())?;
        if properties.observability.metrics_enabled {
            match properties.observability.metrics_address.parse() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(_) => tracing::error!(
                    metrics_address = %properties.observability.metrics_address,
                    "Failed to parse metrics address"
                ),
            }
        }
        self.context = self
            .context
            .with_value(ContextKey::Application, properties.clone());
        self.properties = Some(properties.clone());
        metrics::record_phase(LifecycleState::LoadingProperties, phase);

        // Datasource
        let phase = self.enter(LifecycleState::StartingDatasource)?;
        let datasource: Box<dyn Datasource> = match self.datasource.take() {
            Some(datasource) => datasource,
            None => Box::new(
                AnyDatasource::from_properties(properties.db.as_ref())
                    .map_err(AppError::Datasource)?,
            ),
        };
        self.context = self
            .context
            .with_value(ContextKey::Entities, self.entities.clone());

        let datasource = self.datasource.insert(datasource);
        if datasource.can_start() {
            datasource
                .start(&mut self.context)
                .await
                .map_err(AppError::Datasource)?;
        } else {
            tracing::info!("No datastore configured, skipping datasource start");
        }
        metrics::record_phase(LifecycleState::StartingDatasource, phase);

        // Server
        let phase = self.enter(LifecycleState::StartingServer)?;
        let controllers = self.controllers.take().unwrap_or_default();
        let router = http::build_router(controllers, &properties.cors)?;
        let server = Server::bind(&properties.server, router)
            .await
            .map_err(AppError::Server)?;
        let handle = server.spawn().map_err(AppError::Server)?;
        self.local_addr = Some(handle.local_addr());
        metrics::record_phase(LifecycleState::StartingServer, phase);

        self.enter(LifecycleState::Running)?;
        tracing::info!(address = %handle.local_addr(), "Application running");

        Ok(handle)
    }

    /// Release the datastore and the server in the configured order.
    ///
    /// Either failure is returned immediately; the remaining step is skipped.
    /// With [`ShutdownOrder::DatasourceFirst`], a failed datasource stop leaves
    /// the server serving until the process exits.
    pub async fn shutdown(&mut self, server: ServerHandle) -> Result<(), AppError> {
        self.enter(LifecycleState::ShuttingDown)?;
        tracing::info!("Application shutting down");

        let deadline = Duration::from_secs(
            self.properties
                .as_ref()
                .map(|p| p.server.shutdown_timeout_secs)
                .unwrap_or(30),
        );

        match self.shutdown_order {
            ShutdownOrder::DatasourceFirst => {
                self.stop_datasource().await?;
                server
                    .shutdown(deadline)
                    .await
                    .map_err(AppError::ServerShutdown)?;
            }
            ShutdownOrder::ServerFirst => {
                server
                    .shutdown(deadline)
                    .await
                    .map_err(AppError::ServerShutdown)?;
                self.stop_datasource().await?;
            }
        }

        self.enter(LifecycleState::Stopped)?;
        tracing::info!("Application stopped");
        Ok(())
    }

    async fn stop_datasource(&mut self) -> Result<(), AppError> {
        if let Some(datasource) = self.datasource.as_ref() {
            datasource
                .stop(&mut self.context)
                .await
                .map_err(AppError::DatasourceStop)?;
        }
        Ok(())
    }

    fn enter(&mut self, state: LifecycleState) -> Result<Instant, AppError> {
        self.lifecycle.advance(state)?;
        Ok(Instant::now())
    }
}
