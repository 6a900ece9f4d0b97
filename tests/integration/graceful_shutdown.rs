//! Shutdown gate and server drain tests

use crate::helpers::*;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_healthcheck::health::{BoxError, Healthcheck, OnDemand, SHUTDOWN_CHECK_NAME};
use tokio_util::sync::CancellationToken;

/// Tripping the gate turns readiness down with one synthetic entry
#[tokio::test]
async fn test_shutdown_gate_reports_down() {
    let hc = Healthcheck::new();
    hc.register(
        &CancellationToken::new(),
        OnDemand::new("db", Duration::from_secs(1), |_| async {
            Ok::<(), BoxError>(())
        }),
    );
    let server = TestServer::start(hc).await;

    let (status, _) = server.ready().await;
    assert_eq!(status, StatusCode::OK);

    server.health.shutdown();
    server.health.shutdown();

    let (status, body) = server.ready().await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(check_names(&body), vec!["db", SHUTDOWN_CHECK_NAME]);
    assert_eq!(
        body["checks"][1]["state"]["error"],
        "The application in shutting down process"
    );

    // Liveness is unaffected
    assert_status(&server.get("/live").await, StatusCode::OK);

    server.stop().await.unwrap();
}

/// An in-flight readiness request completes during shutdown
#[tokio::test]
async fn test_in_flight_request_completes() {
    let hc = Healthcheck::new();
    hc.register(
        &CancellationToken::new(),
        OnDemand::new("slow", Duration::from_secs(2), |_| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok::<(), BoxError>(())
        }),
    );
    let server = TestServer::start(hc).await;

    let request = tokio::spawn({
        let client = server.client.clone();
        let url = format!("{}/ready", server.base_url);
        async move { client.get(url).send().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.stop().await.unwrap();

    let resp = request.await.unwrap().expect("request should complete");
    assert_status(&resp, StatusCode::OK);
}

/// Drain is bounded by the shutdown timeout
#[tokio::test]
async fn test_drain_timeout_cancels_slow_request() {
    let hc = Healthcheck::new();
    hc.register(
        &CancellationToken::new(),
        OnDemand::new("hang", Duration::from_secs(30), |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), BoxError>(())
        }),
    );
    let server = TestServer::start_with_timeout(hc, Duration::from_millis(200)).await;

    let request = tokio::spawn({
        let client = server.client.clone();
        let url = format!("{}/ready", server.base_url);
        async move { client.get(url).send().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    server.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    let resp = request.await.unwrap().expect("request should complete");
    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["checks"][0]["state"]["error"], "context canceled");
}

/// Readiness reports down during the grace period, before the listener closes
#[tokio::test]
async fn test_grace_period_serves_down_readiness() {
    let hc = Healthcheck::new();
    hc.register(
        &CancellationToken::new(),
        OnDemand::new("db", Duration::from_secs(1), |_| async {
            Ok::<(), BoxError>(())
        }),
    );
    let server = TestServer::start(hc).await;

    let stopping = tokio::spawn({
        let status_server = Arc::clone(&server.server);
        async move {
            status_server
                .shutdown_gracefully(Duration::from_millis(300))
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = server.ready().await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(check_names(&body), vec!["db", SHUTDOWN_CHECK_NAME]);

    stopping.await.unwrap();
    server.wait().await.unwrap();
}
