//! HTTP Server Binary for hdt-query
//!
//! Opens one index snapshot and serves its query endpoints.
//!
//! Usage:
//!   cargo run --bin http_server -- --index data/store.idx --host 0.0.0.0 --port 8080

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hdt_query::{http::start_server, Document, QueryConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hdt-query HTTP Server")]
#[command(about = "HTTP API server for hdt-query", long_about = None)]
struct Args {
    #[arg(short, long)]
    index: PathBuf,

    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker pool size, overrides the config file
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => QueryConfig::load_from_file(path)?,
        None => QueryConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.max_concurrent_queries = workers;
    }
    config.validate()?;

    info!("Opening index at: {}", args.index.display());
    let document = Arc::new(Document::open(&args.index, config).await?);
    info!("  - Workers: {}", document.config().max_concurrent_queries);
    info!("  - Literal search: {}", document.features().search_literals);

    let addr = format!("{}:{}", args.host, args.port);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        result = start_server(&addr, Arc::clone(&document)) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        () = shutdown_signal => {
            document.close()?;
            info!("Server shut down gracefully");
        }
    }

    Ok(())
}
