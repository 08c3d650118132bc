//!
//! depot server binary
//! -------------------
//! Serves the upload, delete and listing endpoints over one upload directory.
//! Flags override the `PORT`, `UPLOAD_DIR` and `MAX_FILE_SIZE` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use depot_server::{ServerConfig, router};

#[derive(Parser)]
#[command(author, version, about = "depot file store", long_about = None)]
struct Args {
    /// HTTP port (env: PORT, default 8080)
    #[arg(long)]
    port: Option<u16>,

    /// directory holding uploaded files (env: UPLOAD_DIR, default ./uploads)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// per-file limit in bytes, 0 for unlimited (env: MAX_FILE_SIZE)
    #[arg(long)]
    max_file_size: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let args = Args::parse();
    let mut cfg = ServerConfig::from_env();
    if let Some(p) = args.port {
        cfg.port = p;
    }
    if let Some(d) = args.upload_dir {
        cfg.upload_dir = d;
    }
    if let Some(m) = args.max_file_size {
        cfg.max_file_size = m;
    }

    tokio::fs::create_dir_all(&cfg.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", cfg.upload_dir.display()))?;
    cfg.log_limits();

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("Server starting on port {}...", cfg.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(cfg)).await?;
    Ok(())
}
