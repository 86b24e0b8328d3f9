//! src/handlers.rs
//!
//! The Request Handlers (§4.4): one per command kind, composing the Codec,
//! Registry, Gossip Engine and Places Adapter into the four responses the
//! wire protocol defines.

use crate::config::Config;
use crate::domain::{format_skew, now_timestamp, ClientReport, Timestamp};
use crate::gossip;
use crate::logsink::LogSink;
use crate::places::PlacesClient;
use crate::protocol::{classify, Command};
use crate::registry::{Registry, UpsertOutcome};
use std::sync::Arc;

/// Everything a handler needs beyond the request line itself: this
/// server's identity, the shared registry, the static topology/ports, and
/// the Places adapter. Cheap to clone — every field is already an `Arc` or
/// a connection-pooled client handle.
#[derive(Clone)]
pub struct Context {
    pub self_name: String,
    pub config: Arc<Config>,
    pub registry: Arc<Registry>,
    pub places: PlacesClient,
    pub log_sink: Arc<LogSink>,
}

/// Handles one inbound line and returns the bytes to write back to the
/// caller, if any. `UPDATE` never produces a response (§4.4); everything
/// else produces exactly one framed reply.
pub async fn handle_line(ctx: &Context, line: &str) -> Option<String> {
    match classify(line) {
        Command::IAmAt {
            client_name,
            location,
            ts_sent,
        } => Some(handle_iamat(ctx, client_name, location, ts_sent).await),
        Command::WhatsAt {
            client_name,
            radius_km,
            limit,
        } => Some(handle_whatsat(ctx, line, client_name, radius_km, limit).await),
        Command::Update {
            client_name,
            location,
            ts_received,
            ts_sent,
            origin_server,
        } => {
            handle_update(ctx, line, client_name, location, ts_received, ts_sent, origin_server)
                .await;
            None
        }
        Command::Invalid => Some(format!("? {line}\n")),
    }
}

async fn handle_iamat(
    ctx: &Context,
    client_name: String,
    location: crate::domain::Location,
    ts_sent: String,
) -> String {
    let ts_received = now_timestamp();
    let ts_sent = Timestamp::new(ts_sent);
    let skew = format_skew(&ts_received, &ts_sent);

    let report = ClientReport {
        location: location.clone(),
        ts_sent: ts_sent.clone(),
        ts_received: ts_received.clone(),
        origin_server: ctx.self_name.clone(),
    };
    let outcome = ctx.registry.upsert(&client_name, report).await;

    if outcome == UpsertOutcome::Accepted {
        let update_line = format!(
            "UPDATE {client_name} {location} {ts_received} {ts_sent} {}",
            ctx.self_name
        );
        ctx.log_sink
            .log(&format!("Flooding update: {update_line}"))
            .await;
        gossip::flood(&ctx.config, &ctx.self_name, &update_line).await;
    }

    format!(
        "AT {} {skew} {client_name} {location} {ts_sent}\n",
        ctx.self_name
    )
}

async fn handle_whatsat(
    ctx: &Context,
    original_line: &str,
    client_name: String,
    radius_km: u32,
    limit: u32,
) -> String {
    let report = match ctx.registry.get(&client_name).await {
        Some(report) => report,
        None => {
            ctx.log_sink
                .log(&format!("Unknown client on WHATSAT: {client_name}"))
                .await;
            return format!("? {original_line}\n");
        }
    };

    let skew = format_skew(&report.ts_received, &report.ts_sent);
    let at_line = format!(
        "AT {} {skew} {client_name} {} {}\n",
        report.origin_server, report.location, report.ts_sent
    );

    // An UPDATE's location is never validated (§4.1), so the stored report
    // behind a WHATSAT can in principle carry text that isn't sign-shaped.
    // Treat that the same as a Places lookup failure (§7): the server
    // cannot answer the question right now.
    let center = match report.location.as_places_center() {
        Some(center) => center,
        None => {
            tracing::warn!(client = %client_name, "stored location has no valid Places center");
            return format!("? {original_line}\n");
        }
    };
    let radius_m = u64::from(radius_km) * 1000;
    match ctx.places.search(&center, radius_m, limit).await {
        Ok(document) => {
            let pretty = serde_json::to_string_pretty(&document)
                .expect("a decoded JSON document always re-serializes");
            format!("{at_line}{pretty}\n")
        }
        Err(e) => {
            tracing::warn!(error = %e, client = %client_name, "Places lookup failed");
            format!("? {original_line}\n")
        }
    }
}

async fn handle_update(
    ctx: &Context,
    original_line: &str,
    client_name: String,
    location: crate::domain::Location,
    ts_received: String,
    ts_sent: String,
    origin_server: String,
) {
    let report = ClientReport {
        location,
        ts_sent: Timestamp::new(ts_sent),
        ts_received: Timestamp::new(ts_received),
        origin_server,
    };

    let outcome = ctx.registry.upsert(&client_name, report).await;
    if outcome == UpsertOutcome::Accepted {
        gossip::flood(&ctx.config, &ctx.self_name, original_line).await;
    }
}
