//! src/gossip.rs
//!
//! The Gossip Engine (§4.3): forwards a registry-accepted update to every
//! direct peer of `self_name`. One short-lived outbound TCP connection per
//! peer, opened concurrently; failures are logged and swallowed so a down
//! peer never fails the triggering request.

use crate::config::Config;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Forwards `update_line` (without a trailing newline) to every direct peer
/// of `self_name`, per the adjacency in `config`. Launches one task per
/// peer and waits for all of them before returning (§5).
pub async fn flood(config: &Config, self_name: &str, update_line: &str) {
    let peers = config.peers_of(self_name);
    if peers.is_empty() {
        tracing::debug!(server = self_name, "no peers configured, nothing to flood");
        return;
    }

    let sends = peers.iter().map(|peer| {
        let peer = peer.clone();
        let line = update_line.to_string();
        let bind_host = config.bind_host;
        let port = config.port_of(&peer);
        let timeout = config.gossip_dial_timeout();
        async move {
            match port {
                Some(port) => send_to_peer(bind_host, port, &line, timeout).await,
                None => {
                    tracing::warn!(peer = %peer, "peer has no configured port, skipping");
                }
            }
        }
    });

    futures::future::join_all(sends).await;
}

async fn send_to_peer(host: IpAddr, port: u16, line: &str, timeout: Duration) {
    let addr = SocketAddr::new(host, port);
    let connect = tokio::time::timeout(timeout, TcpStream::connect(addr));
    let stream = match connect.await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::warn!(peer = %addr, error = %e, "failed to connect to peer for gossip");
            return;
        }
        Err(_) => {
            tracing::warn!(peer = %addr, "timed out connecting to peer for gossip");
            return;
        }
    };

    let mut stream = stream;
    let payload = format!("{line}\n");
    if let Err(e) = stream.write_all(payload.as_bytes()).await {
        tracing::warn!(peer = %addr, error = %e, "failed to write gossip message to peer");
    }
}
