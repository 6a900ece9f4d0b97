//! Observability module: Prometheus metrics for health checks.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokio_healthcheck::observability::Metrics;
//!
//! let metrics = Arc::new(Metrics::new()?);
//! let hc = Healthcheck::new().with_status_hook(metrics.status_hook());
//! // ... serve `/ready` ...
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

// Re-exports
pub use metrics::Metrics;
