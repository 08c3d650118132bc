use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "depot upload client", long_about = None)]
pub struct Cli {
    /// Base URL of the file store (overrides DEPOT_URL and the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// JSON client config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload files; all of them start at once. Pass `-` to read paths from stdin
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// descend into subdirectories of directory arguments
        #[arg(long, short)]
        recursive: bool,
    },

    /// List files on the store
    Ls,

    /// Delete a stored file
    Rm {
        name: String,

        /// skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Download a stored file
    Get {
        name: String,
        /// output path (defaults to the file name in the current directory)
        out: Option<PathBuf>,
    },
}
