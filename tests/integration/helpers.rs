//! Test helpers and utilities

use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tokio_healthcheck::config::ServerConfig;
use tokio_healthcheck::health::Healthcheck;
use tokio_healthcheck::observability::Metrics;
use tokio_healthcheck::server::{ServerError, StatusServer};

/// Status server running in the test's runtime
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub health: Arc<Healthcheck>,
    pub server: Arc<StatusServer>,
    task: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Serve `health` on 127.0.0.1 with a random port
    pub async fn start(health: Healthcheck) -> Self {
        Self::start_with_timeout(health, Duration::from_secs(3)).await
    }

    pub async fn start_with_timeout(health: Healthcheck, shutdown_timeout: Duration) -> Self {
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
        let health = Arc::new(health.with_status_hook(metrics.status_hook()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let config = ServerConfig {
            listen_addr: addr,
            shutdown_timeout,
        };
        let server = Arc::new(StatusServer::new(
            config,
            Arc::clone(&health),
            metrics,
        ));

        let task = tokio::spawn({
            let server = Arc::clone(&server);
            async move { server.run(listener).await }
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
            health,
            server,
            task,
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET `/ready` and parse the JSON body
    pub async fn ready(&self) -> (StatusCode, serde_json::Value) {
        let resp = self.get("/ready").await;
        let status = resp.status();
        let body = resp.json().await.expect("Readiness body is not JSON");
        (status, body)
    }

    /// Trigger shutdown and wait for the server task to finish
    pub async fn stop(self) -> Result<(), ServerError> {
        self.server.trigger_shutdown();
        self.wait().await
    }

    /// Wait for the server task to finish after shutdown was triggered elsewhere
    pub async fn wait(self) -> Result<(), ServerError> {
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("Server did not stop in time")
            .expect("Server task panicked")
    }
}

/// Assert response status code
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header with prefix
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Names of the checks in a readiness body, in order
pub fn check_names(body: &serde_json::Value) -> Vec<String> {
    body["checks"]
        .as_array()
        .expect("checks should be an array")
        .iter()
        .map(|c| c["name"].as_str().unwrap_or_default().to_string())
        .collect()
}
