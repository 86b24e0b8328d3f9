//! tests/integration/adversarial.rs
//!
//! S6 (peer down) from §8, plus the idempotence-of-UPDATE and
//! flood-termination invariants (§8 items 2 and 4).

use crate::common::harness::Cluster;
use std::time::Duration;
use test_log::test;

/// Bailey has two peers so killing one (Bona) still leaves a live path
/// (Bailey-Campbell) for convergence.
const THREE_SERVERS: &[(&str, &[&str])] = &[
    ("Bailey", &["Bona", "Campbell"]),
    ("Bona", &["Bailey"]),
    ("Campbell", &["Bailey"]),
];

#[test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn s6_a_down_peer_does_not_block_the_triggering_request_or_the_live_component() {
    let cluster = Cluster::spawn(THREE_SERVERS, 5).await.unwrap();
    cluster.kill("Bona");

    // Bailey must still answer promptly even though one of its two peers is
    // down; the bound here is generous but well under a hang.
    let response = tokio::time::timeout(
        Duration::from_secs(2),
        cluster.send(
            "Bailey",
            "IAMAT kiwi.cs.ucla.edu +34.068930-118.445127 1621464827.959498503",
        ),
    )
    .await
    .expect("IAMAT must not hang when a peer is down")
    .unwrap();
    assert!(response.starts_with("AT Bailey "));

    // The live peer (Campbell) still converges.
    cluster
        .send_until(
            "Campbell",
            "WHATSAT kiwi.cs.ucla.edu 10 5",
            Duration::from_secs(5),
            |r| r.starts_with("AT Bailey "),
        )
        .await
        .unwrap();
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn update_idempotence_repeated_delivery_is_a_no_op_after_the_first_accept() {
    let cluster = Cluster::spawn(THREE_SERVERS, 5).await.unwrap();

    // Deliver the same peer-originated UPDATE to Bailey five times, as if
    // it were replayed by a misbehaving or retrying peer.
    let update_line = "UPDATE kiwi +34.0-118.0 2000.0 1000 Clark";
    for _ in 0..5 {
        let response = cluster.send("Bailey", update_line).await.unwrap();
        assert!(response.is_empty(), "UPDATE never produces a response line");
    }

    // Both of Bailey's peers converge on exactly the report carried by the
    // (repeatedly delivered, but only-once-accepted) UPDATE.
    for server in ["Bona", "Campbell"] {
        let response = cluster
            .send_until(
                server,
                "WHATSAT kiwi 10 5",
                Duration::from_secs(5),
                |r| r.starts_with("AT Clark "),
            )
            .await
            .unwrap();
        assert!(
            response.starts_with("AT Clark +1000 kiwi +34.0-118.0 1000"),
            "got: {response:?}"
        );
    }
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn update_with_a_malformed_location_is_accepted_on_arity_alone() {
    let cluster = Cluster::spawn(THREE_SERVERS, 5).await.unwrap();

    // UPDATE's location field has no validation beyond arity (§4.1), unlike
    // IAMAT's — a six-token UPDATE whose location isn't sign-shaped still
    // reaches the registry instead of being echoed back as `?` on a peer
    // socket nobody reads.
    let response = cluster
        .send("Bailey", "UPDATE kiwi not-a-location 2000.0 1000 Clark")
        .await
        .unwrap();
    // An Invalid classification would have echoed "? UPDATE ..." back over
    // this same (peer) connection; a genuine accept produces no response.
    assert!(response.is_empty(), "UPDATE never produces a response line");

    // The report landed in the registry with its literal (malformed) text,
    // so a later WHATSAT finds the client but can't derive a Places center
    // from "not-a-location" and falls back to the malformed-request form
    // (§7) rather than treating the client as unknown.
    let whatsat = cluster.send("Bailey", "WHATSAT kiwi 10 5").await.unwrap();
    assert_eq!(whatsat, "? WHATSAT kiwi 10 5\n");
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn flood_terminates_instead_of_storming_a_connected_mesh() {
    // A triangle: every server is every other server's peer, so a naive
    // "forward on every receipt" implementation would storm forever.
    let triangle: &[(&str, &[&str])] = &[
        ("Bailey", &["Bona", "Campbell"]),
        ("Bona", &["Bailey", "Campbell"]),
        ("Campbell", &["Bailey", "Bona"]),
    ];
    let cluster = Cluster::spawn(triangle, 5).await.unwrap();

    cluster
        .send(
            "Bailey",
            "IAMAT kiwi.cs.ucla.edu +34.068930-118.445127 1621464827.959498503",
        )
        .await
        .unwrap();

    for server in ["Bona", "Campbell"] {
        cluster
            .send_until(
                server,
                "WHATSAT kiwi.cs.ucla.edu 10 5",
                Duration::from_secs(5),
                |r| r.starts_with("AT Bailey "),
            )
            .await
            .unwrap();
    }

    // The flood has converged and acceptance is monotone, so the network is
    // now quiescent: sending the same IAMAT's resulting registry state
    // again produces no further change anywhere, and the cluster stays
    // responsive rather than wedged in an unbounded forwarding loop.
    let response = tokio::time::timeout(
        Duration::from_secs(2),
        cluster.send("Campbell", "WHATSAT kiwi.cs.ucla.edu 10 5"),
    )
    .await
    .expect("the mesh must still be responsive once the flood has quiesced")
    .unwrap();
    assert!(response.starts_with("AT Bailey "));
}
