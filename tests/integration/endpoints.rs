//! Liveness, metrics and routing tests

use crate::helpers::*;
use reqwest::StatusCode;
use std::time::Duration;
use tokio_healthcheck::health::{BoxError, Healthcheck, OnDemand};
use tokio_util::sync::CancellationToken;

/// /live answers 200 with an empty JSON body
#[tokio::test]
async fn test_live_endpoint() {
    let server = TestServer::start(Healthcheck::new()).await;
    let resp = server.get("/live").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");
    assert!(resp.text().await.unwrap().is_empty());

    server.stop().await.unwrap();
}

/// /live stays 200 while readiness is down
#[tokio::test]
async fn test_live_ignores_failing_checks() {
    let hc = Healthcheck::new();
    hc.register(
        &CancellationToken::new(),
        OnDemand::new("db", Duration::from_secs(1), |_| async {
            Err::<(), BoxError>("connection refused".into())
        }),
    );
    let server = TestServer::start(hc).await;

    assert_status(&server.get("/live").await, StatusCode::OK);
    assert_status(
        &server.get("/ready").await,
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    server.stop().await.unwrap();
}

/// /metrics exposes per-check gauges after a readiness run
#[tokio::test]
async fn test_metrics_endpoint() {
    let hc = Healthcheck::new();
    let token = CancellationToken::new();
    hc.register(
        &token,
        OnDemand::new("Cache-Primary", Duration::from_secs(1), |_| async {
            Ok::<(), BoxError>(())
        }),
    );
    hc.register(
        &token,
        OnDemand::new("queue", Duration::from_secs(1), |_| async {
            Err::<(), BoxError>("EOF".into())
        }),
    );
    let server = TestServer::start(hc).await;

    server.ready().await;
    let resp = server.get("/metrics").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "text/plain");
    let body = resp.text().await.unwrap();
    assert!(body.contains("healthcheck_status{check=\"cache_primary\"} 1"));
    assert!(body.contains("healthcheck_status{check=\"queue\"} 0"));
    assert!(body.contains("healthcheck_reports_total{status=\"down\"} 1"));

    server.stop().await.unwrap();
}

/// Unknown paths are 404
#[tokio::test]
async fn test_unknown_path() {
    let server = TestServer::start(Healthcheck::new()).await;

    assert_status(&server.get("/health").await, StatusCode::NOT_FOUND);
    assert_status(&server.get("/ready/extra").await, StatusCode::NOT_FOUND);

    server.stop().await.unwrap();
}
