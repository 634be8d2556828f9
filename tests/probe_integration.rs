//! Probe Integration Tests for relayping
//!
//! Runs the full pipeline against stub relays served on loopback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use relayping::probe::FAILURE_LATENCY_MS;
use relayping::{OutcomeKind, ProbeOptions, ProbeRunner, ProtocolKind, RelayServer};

// =============================================================================
// Test Helpers
// =============================================================================

type RequestLog = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

/// Serve a stub relay on an ephemeral loopback port, returning its address.
async fn spawn_relay(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr.to_string()
}

/// Loopback address with nothing listening on it.
async fn unreachable_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");
    drop(listener);

    addr.to_string()
}

/// Relay whose targets always answer.
fn online_relay() -> Router {
    Router::new().route("/PING/{target}", get(|| async { StatusCode::OK }))
}

/// Relay that reaches its targets but never gets an answer.
fn busy_relay() -> Router {
    Router::new().route("/PING/{target}", get(|| async { StatusCode::GATEWAY_TIMEOUT }))
}

/// Relay that answers after a fixed delay.
fn slow_relay(delay: Duration) -> Router {
    Router::new().route(
        "/PING/{target}",
        get(move || async move {
            tokio::time::sleep(delay).await;
            StatusCode::OK
        }),
    )
}

/// Relay that records every request it serves.
fn recording_relay(log: RequestLog) -> Router {
    Router::new().route(
        "/PING/{target}",
        get(
            move |Path(target): Path<String>, Query(params): Query<HashMap<String, String>>| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push((target, params));
                    StatusCode::OK
                }
            },
        ),
    )
}

/// Relay speaking the reported dialect: always 200 with a JSON body.
fn reported_relay(body: Value) -> Router {
    Router::new().route(
        "/PING/{target}",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    )
}

/// Relay that answers 200 with a body that is not JSON.
fn garbled_relay() -> Router {
    Router::new().route("/PING/{target}", get(|| async { "pong" }))
}

fn options() -> ProbeOptions {
    ProbeOptions::new().with_timeout(Duration::from_secs(2))
}

// =============================================================================
// Status Dialect Tests
// =============================================================================

#[tokio::test]
async fn test_online_relay_produces_full_report() {
    let relay_addr = spawn_relay(online_relay()).await;
    let servers = vec![RelayServer::new(1, relay_addr.clone()).with_name("stub-1")];

    let runner = ProbeRunner::new(servers, &options()).expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.address, "db.example.net");
    assert_eq!(report.online_count, 3);
    assert_eq!(report.timeout_count, 0);
    assert_eq!(report.offline_count, 0);
    assert_eq!(report.total_count, 3);
    assert!(report.min_latency_ms >= 0.0);
    assert!(report.min_latency_ms <= report.avg_latency_ms);
    assert!(report.avg_latency_ms <= report.max_latency_ms);

    assert_eq!(report.servers.len(), 1);
    let result = &report.servers[0];
    assert_eq!(result.server_id, 1);
    assert_eq!(result.server_address, relay_addr);

    let indices: Vec<u32> = result.responses.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    for response in &result.responses {
        assert_eq!(response.kind, OutcomeKind::Online);
        assert_eq!(response.server_id, 1);
        assert!(response.latency_ms >= 0.0);
    }
}

#[tokio::test]
async fn test_busy_relay_counts_timeouts() {
    let relay_addr = spawn_relay(busy_relay()).await;
    let servers = vec![RelayServer::new(2, relay_addr)];

    let runner = ProbeRunner::new(servers, &options()).expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    let report = &reports[0];
    assert_eq!(report.timeout_count, 3);
    assert_eq!(report.online_count, 0);
    assert_eq!(report.offline_count, 0);
    assert_eq!(report.total_count, 3);

    // no online attempts, aggregates stay zero
    assert_eq!(report.min_latency_ms, 0.0);
    assert_eq!(report.max_latency_ms, 0.0);
    assert_eq!(report.avg_latency_ms, 0.0);

    // the relay answered, so round trips were measured
    for response in &report.servers[0].responses {
        assert_eq!(response.kind, OutcomeKind::Timeout);
        assert!(response.latency_ms >= 0.0);
    }
}

#[tokio::test]
async fn test_unreachable_relay_counts_offline() {
    let relay_addr = unreachable_addr().await;
    let servers = vec![RelayServer::new(4, relay_addr)];

    let runner = ProbeRunner::new(servers, &options()).expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    let report = &reports[0];
    assert_eq!(report.offline_count, 3);
    assert_eq!(report.online_count, 0);
    assert_eq!(report.timeout_count, 0);
    assert_eq!(report.min_latency_ms, 0.0);
    assert_eq!(report.avg_latency_ms, 0.0);

    for response in &report.servers[0].responses {
        assert_eq!(response.kind, OutcomeKind::Offline);
        assert_eq!(response.latency_ms, FAILURE_LATENCY_MS);
    }
}

#[tokio::test]
async fn test_status_dialect_ignores_body() {
    let relay_addr = spawn_relay(garbled_relay()).await;
    let servers = vec![RelayServer::new(5, relay_addr)];

    let runner = ProbeRunner::new(servers, &options()).expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    // status dialect classifies on the code alone; the body never matters
    assert_eq!(reports[0].online_count, 3);
}

// =============================================================================
// Ordering and Concurrency Tests
// =============================================================================

#[tokio::test]
async fn test_reports_follow_request_order() {
    // slow relay deliberately first: completion order inverts input order
    let slow_addr = spawn_relay(slow_relay(Duration::from_millis(150))).await;
    let fast_addr = spawn_relay(online_relay()).await;
    let servers = vec![
        RelayServer::new(7, slow_addr).with_name("slow"),
        RelayServer::new(3, fast_addr).with_name("fast"),
    ];

    let runner = ProbeRunner::new(servers, &options()).expect("Failed to build runner");
    let addresses = vec!["alpha.example.net".to_string(), "beta.example.net".to_string()];
    let reports = runner.run(&addresses).await.expect("Probe run failed");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].address, "alpha.example.net");
    assert_eq!(reports[1].address, "beta.example.net");

    for report in &reports {
        let ids: Vec<u32> = report.servers.iter().map(|s| s.server_id).collect();
        assert_eq!(ids, vec![7, 3]);
        assert_eq!(report.total_count, 6);
        assert_eq!(report.online_count, 6);
    }
}

#[tokio::test]
async fn test_relays_probed_concurrently() {
    let delay = Duration::from_millis(300);
    let relay_addr = spawn_relay(slow_relay(delay)).await;
    let servers = (1..=4)
        .map(|id| RelayServer::new(id, relay_addr.clone()))
        .collect();

    let runner = ProbeRunner::new(servers, &options().with_attempts(1))
        .expect("Failed to build runner");

    let start = Instant::now();
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");
    let elapsed = start.elapsed();

    assert_eq!(reports[0].online_count, 4);
    // four relays in sequence would need 1200ms; concurrent fan-out stays
    // near one delay
    assert!(
        elapsed < Duration::from_millis(900),
        "fan-out took {elapsed:?}, expected well under 900ms"
    );
}

// =============================================================================
// Wire Format Tests
// =============================================================================

#[tokio::test]
async fn test_ping_wire_format() {
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let relay_addr = spawn_relay(recording_relay(log.clone())).await;
    let servers = vec![RelayServer::new(1, relay_addr)];

    let runner = ProbeRunner::new(servers, &options()).expect("Failed to build runner");
    runner
        .run(&["target.example.net".to_string()])
        .await
        .expect("Probe run failed");

    let requests = log.lock().unwrap();
    assert_eq!(requests.len(), 3);
    for (attempt, (target, params)) in requests.iter().enumerate() {
        assert_eq!(target, "target.example.net");
        assert_eq!(params.get("trID").map(String::as_str), Some(attempt.to_string().as_str()));
        assert_eq!(params.get("nPing").map(String::as_str), Some("1"));
    }
}

// =============================================================================
// Reported Dialect Tests
// =============================================================================

#[tokio::test]
async fn test_reported_dialect_online() {
    let relay_addr = spawn_relay(reported_relay(json!({"ms": 42}))).await;
    let servers = vec![RelayServer::new(1, relay_addr)];

    let runner = ProbeRunner::new(servers, &options().with_protocol(ProtocolKind::Reported))
        .expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    let report = &reports[0];
    assert_eq!(report.online_count, 3);
    // latency comes from the relay body, not the local clock
    assert_eq!(report.min_latency_ms, 42.0);
    assert_eq!(report.max_latency_ms, 42.0);
    assert_eq!(report.avg_latency_ms, 42.0);
}

#[tokio::test]
async fn test_reported_dialect_timeout() {
    let body = json!({
        "ms": 87,
        "err": {"message": "no reply from target", "name": "TimeoutError"}
    });
    let relay_addr = spawn_relay(reported_relay(body)).await;
    let servers = vec![RelayServer::new(1, relay_addr)];

    let runner = ProbeRunner::new(servers, &options().with_protocol(ProtocolKind::Reported))
        .expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    let report = &reports[0];
    assert_eq!(report.timeout_count, 3);
    assert_eq!(report.online_count, 0);
    assert_eq!(report.avg_latency_ms, 0.0);

    for response in &report.servers[0].responses {
        assert_eq!(response.kind, OutcomeKind::Timeout);
        assert_eq!(response.latency_ms, 87.0);
    }
}

#[tokio::test]
async fn test_reported_dialect_busy_relay_counts_offline() {
    let relay_addr = spawn_relay(busy_relay()).await;
    let servers = vec![RelayServer::new(1, relay_addr)];

    let runner = ProbeRunner::new(servers, &options().with_protocol(ProtocolKind::Reported))
        .expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    // a non-200 answer under this dialect is a protocol deviation, not a
    // timeout verdict
    let report = &reports[0];
    assert_eq!(report.offline_count, 3);
    assert_eq!(report.timeout_count, 0);
    assert_eq!(report.online_count, 0);
    for response in &report.servers[0].responses {
        assert_eq!(response.kind, OutcomeKind::Offline);
        assert_eq!(response.latency_ms, FAILURE_LATENCY_MS);
    }
}

#[tokio::test]
async fn test_reported_dialect_unreachable_relay_counts_offline() {
    let relay_addr = unreachable_addr().await;
    let servers = vec![RelayServer::new(1, relay_addr)];

    let runner = ProbeRunner::new(servers, &options().with_protocol(ProtocolKind::Reported))
        .expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    let report = &reports[0];
    assert_eq!(report.offline_count, 3);
    assert_eq!(report.online_count, 0);
    assert_eq!(report.timeout_count, 0);
    assert_eq!(report.avg_latency_ms, 0.0);
}

#[tokio::test]
async fn test_reported_dialect_malformed_body() {
    let relay_addr = spawn_relay(garbled_relay()).await;
    let servers = vec![RelayServer::new(1, relay_addr)];

    let runner = ProbeRunner::new(servers, &options().with_protocol(ProtocolKind::Reported))
        .expect("Failed to build runner");
    let reports = runner
        .run(&["db.example.net".to_string()])
        .await
        .expect("Probe run failed");

    // a relay that cannot speak the dialect counts as unreachable
    assert_eq!(reports[0].offline_count, 3);
    assert_eq!(reports[0].online_count, 0);
}
