//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Application controllers (axum::Router supplied by the embedder)
//!     → mod.rs (request id, tracing, CORS layers)
//!     → server.rs (bind, serve on its own task, drain on shutdown)
//! ```
//!
//! Routes themselves belong to the embedding application.

pub mod cors;
pub mod health;
pub mod server;

use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsProperties;

pub use cors::CorsError;
pub use server::{Server, ServerError, ServerHandle};

/// Wrap the application's controllers with the standard middleware stack.
pub fn build_router(controllers: Router, cors: &CorsProperties) -> Result<Router, CorsError> {
    let cors = cors::cors_layer(cors)?;

    Ok(controllers
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}
