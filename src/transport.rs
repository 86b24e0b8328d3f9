//! src/transport.rs
//!
//! The Connection Acceptor (§4.5): listens on this server's configured
//! port, spawns one task per inbound connection, and hands each connection
//! exactly one line. The protocol is strictly one line in, zero-or-one line
//! out — connections are never reused across requests.

use crate::error::{Error, Result};
use crate::handlers::{self, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub struct Acceptor {
    listener: TcpListener,
    ctx: Context,
}

impl Acceptor {
    pub async fn bind(ctx: Context) -> Result<Self> {
        let port = ctx
            .config
            .port_of(&ctx.self_name)
            .ok_or_else(|| Error::UnknownServer(ctx.self_name.clone()))?;
        let listener = TcpListener::bind((ctx.config.bind_host, port)).await?;
        Ok(Self { listener, ctx })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown_token` is cancelled, spawning one
    /// task per connection (§5).
    pub async fn run(self, shutdown_token: CancellationToken) {
        tracing::info!(
            server = %self.ctx.self_name,
            addr = ?self.listener.local_addr(),
            "Connection Acceptor listening"
        );

        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    tracing::info!(server = %self.ctx.self_name, "Acceptor received shutdown signal.");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((socket, peer_addr)) => {
                            let ctx = self.ctx.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(ctx, socket).await {
                                    tracing::warn!(peer = %peer_addr, error = %e, "connection handling failed");
                                }
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }
}

async fn handle_connection(ctx: Context, socket: tokio::net::TcpStream) -> Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line).await?;
    if bytes_read == 0 {
        tracing::debug!("peer disconnected before sending a request");
        return Ok(());
    }

    let trimmed = line.trim_end_matches(['\n', '\r']);
    if let Some(response) = handlers::handle_line(&ctx, trimmed).await {
        write_half.write_all(response.as_bytes()).await?;
    }

    Ok(())
}
