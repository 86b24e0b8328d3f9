//! src/registry.rs
//!
//! The Location Registry (§4.2): the single source of truth for each
//! client's latest report, and for whether an update is worth gossiping.

use crate::domain::ClientReport;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Outcome of an [`Registry::upsert`] call. Gossip is triggered exactly by
/// `Accepted` (§4.2, §4.3) — this is the type that couples registry
/// acceptance to flood termination (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Accepted,
    Rejected,
}

/// In-memory `client_name -> ClientReport` map guarded by a single mutex.
/// Every `upsert` performs its lookup-compare-replace sequence atomically
/// with respect to other registry operations (§5).
#[derive(Default)]
pub struct Registry {
    reports: Mutex<HashMap<String, ClientReport>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `report` under `client_name` if the client is unknown, or if
    /// `report.ts_sent` is strictly newer than what is stored. Otherwise the
    /// registry is left untouched.
    pub async fn upsert(&self, client_name: &str, report: ClientReport) -> UpsertOutcome {
        let mut reports = self.reports.lock().await;
        let accept = match reports.get(client_name) {
            Some(existing) => report.ts_sent.is_strictly_after(&existing.ts_sent),
            None => true,
        };
        if accept {
            reports.insert(client_name.to_string(), report);
            UpsertOutcome::Accepted
        } else {
            UpsertOutcome::Rejected
        }
    }

    /// Returns a clone of the stored report for `client_name`, if any.
    pub async fn get(&self, client_name: &str) -> Option<ClientReport> {
        self.reports.lock().await.get(client_name).cloned()
    }
}
