//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (app.rs + startup.rs):
//!     Resolve classpath → Load properties → Start datasource → Start server
//!
//! Running:
//!     Server task serves requests; main task waits in signals.rs
//!
//! Shutdown (app.rs + shutdown.rs):
//!     Signal received → Stop datasource → Drain server (bounded) → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and skips shutdown
//! - Startup phases run sequentially on the caller's task
//! - The datasource is started before the listener accepts anything
//! - Only server draining is bounded by the shutdown deadline

pub mod app;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use app::{App, AppBuilder, AppError, ShutdownOrder};
pub use shutdown::Shutdown;
pub use state::{Lifecycle, LifecycleError, LifecycleState};
