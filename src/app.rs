//! src/app.rs
//!
//! Defines the main `App` struct, which encapsulates one server's runtime
//! state and manages the lifecycle of its single concurrent service: the
//! Connection Acceptor (§4.5, §4.10).

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::Context;
use crate::logsink::LogSink;
use crate::places::PlacesClient;
use crate::registry::Registry;
use crate::transport::Acceptor;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Encapsulates one federation member: its identity, its configuration, and
/// the lifecycle management of its Acceptor task.
pub struct App {
    self_name: String,
    config: Arc<Config>,
    shutdown_token: CancellationToken,
}

impl App {
    /// Creates a new `App` for `self_name`, validating it against the
    /// configured topology (§6): an unknown server name is a startup
    /// failure, not a runtime one.
    pub fn new(config: Config, self_name: impl Into<String>) -> Result<Self> {
        let self_name = self_name.into();
        if !config.has_server(&self_name) {
            return Err(Error::UnknownServer(self_name));
        }
        Ok(Self {
            self_name,
            config: Arc::new(config),
            shutdown_token: CancellationToken::new(),
        })
    }

    /// A token the caller can cancel to trigger graceful shutdown, e.g. from
    /// a test harness that wants to stop a spawned server without relying on
    /// Ctrl+C.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// The main run loop for the server.
    ///
    /// This function performs the following steps:
    ///   1. Opens the append-only log sink for this server.
    ///   2. Constructs the shared Registry and Places adapter.
    ///   3. Binds the Connection Acceptor to this server's configured port.
    ///   4. Spawns the Acceptor in its own asynchronous Tokio task.
    ///   5. Waits for a shutdown signal (like Ctrl+C) and gracefully
    ///      terminates the task.
    pub async fn run(self) -> Result<()> {
        tracing::info!(server = %self.self_name, "🚀 Starting server...");

        let log_sink = Arc::new(LogSink::open(self.config.log_path(&self.self_name)).await);
        let registry = Arc::new(Registry::new());
        let places = PlacesClient::new(
            self.config.places_url.clone(),
            self.config.places_api_key.clone(),
        );

        let ctx = Context {
            self_name: self.self_name.clone(),
            config: Arc::clone(&self.config),
            registry,
            places,
            log_sink,
        };

        let acceptor = Acceptor::bind(ctx).await?;
        tracing::debug!(server = %self.self_name, "Connection Acceptor bound.");

        let acceptor_task = tokio::spawn(acceptor.run(self.shutdown_token.clone()));

        let shutdown_token = self.shutdown_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received. Initiating graceful shutdown...");
                shutdown_token.cancel();
            }
        });

        self.shutdown_token.cancelled().await;

        if let Err(e) = acceptor_task.await {
            tracing::error!(error = ?e, "Acceptor task failed");
        }

        tracing::info!(server = %self.self_name, "👋 Server has shut down gracefully.");
        Ok(())
    }
}
