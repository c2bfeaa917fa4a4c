//! HTTP server wrapper.
//!
//! # Responsibilities
//! - Bind the configured host/port
//! - Serve the application router on its own task
//! - Stop accepting on shutdown, drain in-flight requests up to a deadline,
//!   and abort the server task once the deadline passes

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::ServerProperties;
use crate::lifecycle::Shutdown;

/// Error type for server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("server did not drain within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("server task terminated abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A bound, not yet serving, HTTP server.
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Bind to `host:port` from the server properties.
    pub async fn bind(props: &ServerProperties, router: Router) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((props.host.as_str(), props.port))
            .await
            .map_err(|source| ServerError::Bind {
                address: props.address(),
                source,
            })?;

        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::Serve)
    }

    /// Serve until `shutdown` fires, then drain.
    ///
    /// A dropped sender is not a shutdown request: the server keeps serving
    /// until the trigger fires or the runtime goes away.
    pub async fn listen_and_serve(
        self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                if let Err(RecvError::Closed) = shutdown.recv().await {
                    std::future::pending::<()>().await;
                }
            })
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run [`Server::listen_and_serve`] on its own task.
    pub fn spawn(self) -> Result<ServerHandle, ServerError> {
        let local_addr = self.local_addr()?;
        let shutdown = Shutdown::new();
        let task = tokio::spawn(self.listen_and_serve(shutdown.subscribe()));

        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
            finished: false,
        })
    }
}

/// Handle to a server running on its own task.
///
/// Dropping the handle leaves the server running; only
/// [`ServerHandle::shutdown`] stops it.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), ServerError>>,
    finished: bool,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Resolves when the server task exits without being asked to.
    pub async fn stopped(&mut self) -> Result<(), ServerError> {
        let result = (&mut self.task).await;
        self.finished = true;
        result?
    }

    /// Stop accepting connections and wait up to `deadline` for in-flight
    /// requests. On timeout the server task is aborted.
    pub async fn shutdown(mut self, deadline: Duration) -> Result<(), ServerError> {
        if self.finished {
            return Ok(());
        }

        tracing::info!(deadline = ?deadline, "HTTP server shutting down");
        self.shutdown.trigger();

        match tokio::time::timeout(deadline, &mut self.task).await {
            Ok(joined) => joined?,
            Err(_) => {
                self.task.abort();
                tracing::warn!(deadline = ?deadline, "HTTP server drain timed out, aborting");
                Err(ServerError::ShutdownTimeout(deadline))
            }
        }
    }
}
