//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (lifecycle phase timings, datastore gauges)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
