//! src/error.rs
//!
//! Defines the library's custom, comprehensive `Error` enum using `thiserror`.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown server name {0:?}; not present in the configured topology")]
    UnknownServer(String),

    #[error("Places lookup failed: {0}")]
    Places(#[from] reqwest::Error),

    #[error("Places provider returned an undecodable document: {0}")]
    PlacesDecode(#[from] serde_json::Error),

    #[error("Tokio task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
