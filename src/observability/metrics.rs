//! Prometheus metrics for tokio_healthcheck.
//!
//! Per-check status gauges fed by the report runner, plus counters and a
//! latency histogram for the status server itself.

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use tracing::error;

use crate::health::{Report, Status, StatusHook};

/// Prometheus metrics registry with all application metrics.
pub struct Metrics {
    registry: Registry,

    // === Check Metrics ===
    /// Last resolved status per check identity: 1 up, 0 down
    pub check_status: GaugeVec,

    /// Readiness reports produced, by aggregate status
    pub reports_total: CounterVec,

    /// Time to produce a readiness report, by aggregate status
    pub report_duration_seconds: HistogramVec,

    // === HTTP Metrics ===
    /// Status server requests by path, status
    pub http_requests_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics registry with all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Report latency buckets (in seconds)
        let report_buckets = vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ];

        let check_status = GaugeVec::new(
            Opts::new("healthcheck_status", "Check status (1 = up, 0 = down)"),
            &["check"],
        )?;
        registry.register(Box::new(check_status.clone()))?;

        let reports_total = CounterVec::new(
            Opts::new("healthcheck_reports_total", "Total readiness reports"),
            &["status"],
        )?;
        registry.register(Box::new(reports_total.clone()))?;

        let report_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "healthcheck_report_duration_seconds",
                "Readiness report duration in seconds",
            )
            .buckets(report_buckets),
            &["status"],
        )?;
        registry.register(Box::new(report_duration_seconds.clone()))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "healthcheck_http_requests_total",
                "Total status server requests",
            ),
            &["path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            check_status,
            reports_total,
            report_duration_seconds,
            http_requests_total,
        })
    }

    /// Record the resolved status of one check.
    pub fn record_check_status(&self, check: &str, status: Status) {
        self.check_status
            .with_label_values(&[check])
            .set(status_value(status));
    }

    /// Hook for [`crate::health::Healthcheck::with_status_hook`] that keeps
    /// `healthcheck_status` current.
    pub fn status_hook(&self) -> StatusHook {
        let gauge = self.check_status.clone();
        std::sync::Arc::new(move |check: &str, status: Status| {
            gauge.with_label_values(&[check]).set(status_value(status));
        })
    }

    /// Record a finished readiness report.
    pub fn record_report(&self, report: &Report, duration_secs: f64) {
        let status = report.status.as_str();
        self.reports_total.with_label_values(&[status]).inc();
        self.report_duration_seconds
            .with_label_values(&[status])
            .observe(duration_secs);
    }

    /// Record a status server request.
    pub fn record_http_request(&self, path: &str, status: u16) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[normalize_path(path), status_str.as_str()])
            .inc();
    }

    /// Export metrics in Prometheus text format.
    ///
    /// Encoding failures are logged and yield an empty exposition.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_else(|e| {
            error!(error = %e, "Invalid UTF-8 in metrics");
            String::new()
        })
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn status_value(status: Status) -> f64 {
    if status.is_up() {
        1.0
    } else {
        0.0
    }
}

/// Collapse unknown paths into one label value to bound cardinality.
fn normalize_path(path: &str) -> &str {
    match path {
        "/live" | "/ready" | "/metrics" => path,
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckReport, Outcome};

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.record_http_request("/live", 200);
        assert!(metrics.export().contains("# HELP"));
    }

    #[test]
    fn test_status_hook_sets_gauge() {
        let metrics = Metrics::new().expect("Should create metrics");
        let hook = metrics.status_hook();

        hook("db", Status::Up);
        hook("cache", Status::Down);

        assert_eq!(metrics.check_status.with_label_values(&["db"]).get(), 1.0);
        assert_eq!(metrics.check_status.with_label_values(&["cache"]).get(), 0.0);

        hook("db", Status::Down);
        assert_eq!(metrics.check_status.with_label_values(&["db"]).get(), 0.0);

        let output = metrics.export();
        assert!(output.contains("healthcheck_status{check=\"cache\"} 0"));
    }

    #[test]
    fn test_report_recording() {
        let metrics = Metrics::new().expect("Should create metrics");
        let report = Report::from_checks(vec![CheckReport {
            name: "db".into(),
            state: Outcome::now(Ok(())).to_state(),
            previous: Vec::new(),
        }]);

        metrics.record_report(&report, 0.01);
        metrics.record_report(&report, 0.02);

        assert_eq!(metrics.reports_total.with_label_values(&["up"]).get(), 2.0);
        assert!(metrics
            .export()
            .contains("healthcheck_report_duration_seconds_count{status=\"up\"} 2"));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path("/ready"), "/ready");
        assert_eq!(normalize_path("/live"), "/live");
        assert_eq!(normalize_path("/admin/123"), "other");
    }

    #[test]
    fn test_record_check_status() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.record_check_status("queue", Status::Up);
        assert!(metrics
            .export()
            .contains("healthcheck_status{check=\"queue\"} 1"));
    }
}
