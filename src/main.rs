//! Edge gatekeeper
//!
//! ```text
//!     Client ──▶ request id ──▶ trace ──▶ timeout ──▶ gatekeeper ──▶ admin gate ──▶ upstream
//!                                                        │               │
//!                                                        ▼               ▼
//!                                                  JSON denial     307 → "/"
//!                                                  (403/400/429)
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_gatekeeper::config;
use edge_gatekeeper::lifecycle::startup;
use edge_gatekeeper::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "edge-gatekeeper")]
#[command(about = "Edge request gatekeeper", long_about = None)]
struct Args {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(short, long, env = "GATEKEEPER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = config::load(args.config.as_deref())?;
    init_tracing(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        "edge-gatekeeper starting"
    );

    startup::run(config).await?;
    Ok(())
}
