pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use depot_core::ClientConfig;
use depot_core::error::Result;
use clap::Parser;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = ClientConfig::load(cli.config.as_deref(), cli.url)?;
    match cli.command {
        Commands::Upload { paths, recursive } => handlers::handle_upload(cfg, paths, recursive).await,
        Commands::Ls => handlers::handle_ls(cfg).await,
        Commands::Rm { name, yes } => handlers::handle_rm(cfg, name, yes).await,
        Commands::Get { name, out } => handlers::handle_get(cfg, name, out).await,
    }
}
