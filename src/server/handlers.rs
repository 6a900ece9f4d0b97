//! Request handlers for the status server.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::health::Healthcheck;
use crate::observability::Metrics;

/// Body served when a report cannot be serialized.
pub const UNKNOWN_REPORT_BODY: &str = r#"{"status":"unknown","checks":[]}"#;

const JSON: &str = "application/json";
const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Shared state for every request.
pub struct RequestContext {
    pub health: Arc<Healthcheck>,
    pub metrics: Arc<Metrics>,
    /// Parent token for readiness runs.
    pub token: CancellationToken,
}

/// Route a request. Never fails: every outcome is an HTTP response.
pub async fn handle_request<B>(req: Request<B>, ctx: &RequestContext) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();

    let response = match path.as_str() {
        "/live" => respond(StatusCode::OK, JSON, Bytes::new()),
        "/ready" => ready(ctx).await,
        "/metrics" => respond(
            StatusCode::OK,
            PROMETHEUS_TEXT,
            Bytes::from(ctx.metrics.export()),
        ),
        _ => respond(
            StatusCode::NOT_FOUND,
            "text/plain",
            Bytes::from_static(b"Not Found"),
        ),
    };

    ctx.metrics
        .record_http_request(&path, response.status().as_u16());
    response
}

async fn ready(ctx: &RequestContext) -> Response<Full<Bytes>> {
    let start = Instant::now();
    let report = ctx.health.run_all(&ctx.token.child_token()).await;
    ctx.metrics
        .record_report(&report, start.elapsed().as_secs_f64());

    let body = match serde_json::to_vec(&report) {
        Ok(body) => Bytes::from(body),
        Err(e) => {
            error!(error = %e, "Failed to serialize readiness report");
            Bytes::from_static(UNKNOWN_REPORT_BODY.as_bytes())
        }
    };

    let status = if report.is_up() {
        StatusCode::OK
    } else {
        warn!(
            report = %String::from_utf8_lossy(&body),
            "Readiness check failed"
        );
        StatusCode::INTERNAL_SERVER_ERROR
    };

    respond(status, JSON, body)
}

fn respond(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
