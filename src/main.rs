//! Application bootstrap binary.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                         lifecycle::App                        │
//!   │                                                              │
//!   │  classpath ──▶ config (application.json + profiles)          │
//!   │                    │                                         │
//!   │                    ▼                                         │
//!   │              datasource (postgresql | mongodb)               │
//!   │                    │   handle + entities in context          │
//!   │                    ▼                                         │
//!   │              http::Server (own task) ◀── controllers          │
//!   │                    │                                         │
//!   │   SIGINT/SIGTERM ──┴──▶ stop datasource ──▶ drain server      │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use app_bootstrap::http::health::health_router;
use app_bootstrap::observability::logging;
use app_bootstrap::App;

#[derive(Parser)]
#[command(name = "app-bootstrap")]
#[command(about = "Bootstraps properties, datastore and HTTP server", long_about = None)]
struct Cli {
    /// Directory holding application.json and its profile overlays.
    #[arg(short, long, env = "APP_CLASSPATH")]
    classpath: Option<PathBuf>,

    /// Comma-separated active profiles; overrides `profiles` in application.json.
    #[arg(short, long, env = "APP_PROFILES")]
    profiles: Option<String>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = logging::DEFAULT_FILTER)]
    log_filter: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_filter) {
        eprintln!("failed to initialize logging: {}", e);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "app-bootstrap starting");

    let mut builder = App::builder().rest(health_router());
    if let Some(classpath) = cli.classpath {
        builder = builder.classpath(classpath);
    }
    if let Some(profiles) = cli.profiles {
        builder = builder.profiles(profiles);
    }

    let mut app = builder.build();
    if let Err(e) = app.run().await {
        tracing::error!(error = %e, state = %app.state(), "Fatal error");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}
