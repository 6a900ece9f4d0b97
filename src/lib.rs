//! tokio_healthcheck - Health check aggregation for orchestrator probes.
//!
//! Applications register named checks; a readiness request runs them all
//! concurrently and folds the outcomes into one up/down report.
//!
//! # Features
//!
//! - **Three check kinds**: on-demand probes, manually set states, background polling
//! - **Bounded runs**: every check resolves within its timeout, even if the probe hangs
//! - **History**: each check keeps its last few outcomes for the report
//! - **Graceful shutdown**: a one-way gate turns readiness down before the process stops
//! - **Status server**: `/live`, `/ready` and `/metrics` over HTTP/1.1
//! - **Structured logging**: JSON lines via tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_healthcheck::health::{Healthcheck, Manual, OnDemand};
//!
//! let hc = Healthcheck::new();
//! let token = CancellationToken::new();
//! hc.register(&token, OnDemand::new("postgres", Duration::from_secs(1), ping));
//!
//! let warmup = Manual::new("warmup");
//! hc.register(&token, warmup.clone());
//! warmup.set_ok();
//!
//! let report = hc.run_all(&token).await;
//! println!("{}", serde_json::to_string(&report)?);
//! ```

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod health;
pub mod logging;
pub mod observability;
pub mod server;

// Re-exports for convenience
pub use config::Config;
pub use health::{Healthcheck, Report, Status};
pub use server::StatusServer;
