//! src/places.rs
//!
//! The Places Adapter (§4.6): a thin async wrapper around the external
//! Places provider. Formats the geo-query, awaits the JSON body, and
//! truncates `results` to the caller's limit while leaving every other
//! top-level field untouched.

use crate::error::{Error, Result};
use serde_json::Value;

/// Wraps a single, connection-pooled `reqwest::Client` shared across every
/// handler, rather than constructing one per call (§4.6).
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Issues the `nearbysearch`-shaped HTTPS GET and truncates `results`
    /// to at most `limit` entries, preserving all other top-level fields
    /// and their order (§4.4, §4.6, §9).
    pub async fn search(&self, center: &str, radius_m: u64, limit: u32) -> Result<Value> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("location", center),
                ("radius", &radius_m.to_string()),
                ("key", &self.api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        let mut document: Value = serde_json::from_slice(&bytes).map_err(Error::from)?;

        if let Some(results) = document.get_mut("results").and_then(Value::as_array_mut) {
            results.truncate(limit as usize);
        }

        Ok(document)
    }
}
