//! Readiness endpoint tests

use crate::helpers::*;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tokio_healthcheck::health::{Background, BoxError, Healthcheck, Manual, OnDemand};
use tokio_util::sync::CancellationToken;

fn ok_check(name: &str) -> OnDemand {
    OnDemand::new(name, Duration::from_secs(1), |_| async {
        Ok::<(), BoxError>(())
    })
}

/// No checks registered means ready
#[tokio::test]
async fn test_empty_is_ready() {
    let server = TestServer::start(Healthcheck::new()).await;
    let (status, body) = server.ready().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert!(body["checks"].as_array().unwrap().is_empty());

    server.stop().await.unwrap();
}

/// Report JSON carries name, state and previous for every check
#[tokio::test]
async fn test_report_shape() {
    let hc = Healthcheck::new();
    hc.register(&CancellationToken::new(), ok_check("db"));
    let server = TestServer::start(hc).await;

    server.ready().await;
    let (status, body) = server.ready().await;

    assert_eq!(status, StatusCode::OK);
    let check = &body["checks"][0];
    assert_eq!(check["name"], "db");
    assert_eq!(check["state"]["status"], "up");
    assert_eq!(check["state"]["error"], "");
    assert!(check["state"]["actual_at"].as_str().unwrap().ends_with('Z'));
    assert_eq!(check["previous"].as_array().unwrap().len(), 1);
    assert_eq!(check["previous"][0]["status"], "up");

    server.stop().await.unwrap();
}

/// Identities are normalized and deduplicated in registration order
#[tokio::test]
async fn test_identities_in_report() {
    let hc = Healthcheck::new();
    let token = CancellationToken::new();
    for name in ["Check1", "CHECK1", "check-2"] {
        hc.register(&token, ok_check(name));
    }
    let server = TestServer::start(hc).await;

    let (_, body) = server.ready().await;
    assert_eq!(check_names(&body), vec!["check1", "check1_x", "check_2"]);

    server.stop().await.unwrap();
}

/// A hanging probe fails the report within its timeout
#[tokio::test]
async fn test_timeout_bounds_request() {
    let hc = Healthcheck::new();
    let token = CancellationToken::new();
    hc.register(&token, ok_check("always_ok"));
    hc.register(
        &token,
        OnDemand::new("stuck", Duration::from_millis(50), |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), BoxError>(())
        }),
    );
    let server = TestServer::start(hc).await;

    let started = Instant::now();
    let (status, body) = server.ready().await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["checks"][0]["state"]["status"], "up");
    assert_eq!(body["checks"][1]["state"]["error"], "context deadline exceeded");

    server.stop().await.unwrap();
}

/// Manual state changes show up on the next request
#[tokio::test]
async fn test_manual_check_transitions() {
    let hc = Healthcheck::new();
    let warmup = Manual::new("warmup");
    hc.register(&CancellationToken::new(), warmup.clone());
    let server = TestServer::start(hc).await;

    let (status, body) = server.ready().await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["checks"][0]["state"]["error"], "initial");

    warmup.set_ok();
    let (status, _) = server.ready().await;
    assert_eq!(status, StatusCode::OK);

    warmup.set_error("cache cold");
    let (status, body) = server.ready().await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["checks"][0]["state"]["error"], "cache cold");
    assert_eq!(body["checks"][0]["previous"][0]["status"], "up");
    assert_eq!(body["checks"][0]["previous"][1]["error"], "initial");

    server.stop().await.unwrap();
}

/// Background checks report their initial state until the first poll
#[tokio::test]
async fn test_background_check() {
    let hc = Healthcheck::new();
    let token = CancellationToken::new();
    hc.register(
        &token,
        Background::new(
            "upstream",
            Err("not polled yet"),
            Duration::from_millis(50),
            Duration::from_millis(50),
            Duration::from_secs(1),
            |_| async { Ok::<(), BoxError>(()) },
        ),
    );
    let server = TestServer::start(hc).await;

    let (status, body) = server.ready().await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["checks"][0]["state"]["error"], "not polled yet");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let (status, _) = server.ready().await;
    assert_eq!(status, StatusCode::OK);

    token.cancel();
    server.stop().await.unwrap();
}
