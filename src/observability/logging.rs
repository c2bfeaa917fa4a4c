//! Structured logging.
//!
//! The binary installs the subscriber once at startup; the library only emits
//! `tracing` events.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "app_bootstrap=info,tower_http=info";

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `fallback`. Returns an error if a subscriber is
/// already installed.
pub fn init(fallback: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
