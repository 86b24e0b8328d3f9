//! src/main.rs
//!
//! Binary entry point. Responsible for initializing tracing, loading
//! configuration, reading the server-name CLI argument, instantiating the
//! `App`, and running it to completion (§4.10, §6).

use anyhow::Context;
use geomesh::{App, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the tracing subscriber.
    // RUST_LOG=info will be the default.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let self_name = std::env::args()
        .nth(1)
        .context("usage: geomesh <server-name>")?;

    // Load configuration.
    let config = Config::load().context("Failed to load configuration")?;

    // Create and run the server.
    let app = App::new(config, self_name).context("Failed to start server")?;
    if let Err(e) = app.run().await {
        tracing::error!(error = %e, "💥 Server failed");
        std::process::exit(1);
    }

    Ok(())
}
