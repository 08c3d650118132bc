mod application;

mod presentation {
    pub mod cli;
    pub mod terminal;
}

use depot_core::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    application::run().await
}
