//! src/config.rs
//!
//! Defines the strongly-typed `Config` struct for all runtime parameters,
//! loaded from files and environment variables via `figment`. `Config` is the
//! single source of truth for the peer topology, port table, and Places
//! credentials — nothing else in the crate hard-codes these values.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level struct holding all application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Host all servers in the topology bind to and dial each other on.
    pub bind_host: IpAddr,
    /// Undirected adjacency: server name -> names of its direct peers.
    pub peers: HashMap<String, Vec<String>>,
    /// server name -> TCP port.
    pub ports: HashMap<String, u16>,
    /// Base URL of the external Places `nearbysearch`-shaped endpoint.
    pub places_url: String,
    /// API key passed as the `key` query parameter on every Places call.
    pub places_api_key: String,
    /// Directory the `<server>_log.txt` append-only sink is created in.
    pub log_dir: PathBuf,
    /// Upper bound on how long a gossip dial to one peer may take.
    pub gossip_dial_timeout_ms: u64,
}

/// Every field of [`Config`], optional, for layering partial overrides from
/// `config.toml`/env on top of the reference-topology defaults.
///
/// Figment merges providers key-wise: two dictionaries sharing a key are
/// merged recursively, not replaced (that's what makes scalar overrides like
/// `places_api_key` work below). Applying that same recursive merge to
/// `peers`/`ports` directly would union a deployer's topology into the
/// five-server reference set instead of letting it stand alone, so those
/// two fields are extracted here and, if present at all, replace the
/// default's map wholesale rather than being merged into it (§4.7).
#[derive(Debug, Deserialize)]
struct ConfigOverrides {
    bind_host: Option<IpAddr>,
    peers: Option<HashMap<String, Vec<String>>>,
    ports: Option<HashMap<String, u16>>,
    places_url: Option<String>,
    places_api_key: Option<String>,
    log_dir: Option<PathBuf>,
    gossip_dial_timeout_ms: Option<u64>,
}

impl Config {
    /// Loads configuration from `config.toml` and environment variables,
    /// layered on top of the reference-topology defaults.
    pub fn load() -> Result<Self, figment::Error> {
        let overrides: ConfigOverrides = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("GEOMESH_"))
            .extract()?;

        let mut config = Config::default();
        if let Some(bind_host) = overrides.bind_host {
            config.bind_host = bind_host;
        }
        if let Some(peers) = overrides.peers {
            config.peers = peers;
        }
        if let Some(ports) = overrides.ports {
            config.ports = ports;
        }
        if let Some(places_url) = overrides.places_url {
            config.places_url = places_url;
        }
        if let Some(places_api_key) = overrides.places_api_key {
            config.places_api_key = places_api_key;
        }
        if let Some(log_dir) = overrides.log_dir {
            config.log_dir = log_dir;
        }
        if let Some(gossip_dial_timeout_ms) = overrides.gossip_dial_timeout_ms {
            config.gossip_dial_timeout_ms = gossip_dial_timeout_ms;
        }

        Ok(config)
    }

    /// Direct peers of `server_name`, or an empty slice if it has none configured.
    pub fn peers_of(&self, server_name: &str) -> &[String] {
        self.peers
            .get(server_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The port `server_name` listens on, if it is a member of the topology.
    pub fn port_of(&self, server_name: &str) -> Option<u16> {
        self.ports.get(server_name).copied()
    }

    /// Whether `server_name` is a recognized member of the configured topology.
    pub fn has_server(&self, server_name: &str) -> bool {
        self.ports.contains_key(server_name)
    }

    pub fn gossip_dial_timeout(&self) -> Duration {
        Duration::from_millis(self.gossip_dial_timeout_ms)
    }

    /// Path of the append-only log sink for `server_name`.
    pub fn log_path(&self, server_name: &str) -> PathBuf {
        self.log_dir.join(format!("{server_name}_log.txt"))
    }
}

impl Default for Config {
    /// The reference deployment: five servers in a small partial mesh of
    /// diameter two, taken verbatim from the project this system reimplements.
    fn default() -> Self {
        let peers = [
            ("Bailey", vec!["Bona", "Campbell"]),
            ("Bona", vec!["Bailey", "Clark", "Campbell"]),
            ("Campbell", vec!["Bailey", "Bona", "Jaquez"]),
            ("Clark", vec!["Bona", "Jaquez"]),
            ("Jaquez", vec!["Clark", "Campbell"]),
        ]
        .into_iter()
        .map(|(name, neighbors)| {
            (
                name.to_string(),
                neighbors.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

        let ports = [
            ("Bailey", 10000),
            ("Bona", 10001),
            ("Campbell", 10002),
            ("Clark", 10003),
            ("Jaquez", 10004),
        ]
        .into_iter()
        .map(|(name, port)| (name.to_string(), port))
        .collect();

        Self {
            bind_host: IpAddr::from([127, 0, 0, 1]),
            peers,
            ports,
            places_url: "https://maps.googleapis.com/maps/api/place/nearbysearch/json"
                .to_string(),
            places_api_key: "VALID API KEY".to_string(),
            log_dir: PathBuf::from("."),
            gossip_dial_timeout_ms: 2_000,
        }
    }
}
