//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! <classpath>/application.json
//!     → loader.rs (parse, merge onto defaults)
//! <classpath>/application-<profile>.json (for each active profile, in order)
//!     → loader.rs (deep merge onto the accumulated tree)
//!     → Properties (immutable once resolved)
//!     → validation.rs (datasource preconditions)
//! ```
//!
//! # Design Decisions
//! - Every field has a default so minimal documents work
//! - Overlays are partial: absent fields keep the earlier value
//! - A declared profile without a document is fatal

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, PropertyResolver};
pub use schema::{
    CorsProperties, DbKind, DbProperties, ObservabilityProperties, Properties, ServerProperties,
};
pub use validation::ValidationError;
