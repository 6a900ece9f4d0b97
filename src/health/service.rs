//! Health check service: registration, report runs and shutdown.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::check::Check;
use super::registry::Registry;
use super::runner::{Clock, Runner, StatusHook};
use super::shutdown::ShutdownGate;
use super::status::Report;

/// Aggregates registered checks into readiness reports.
///
/// ```rust,ignore
/// let hc = Healthcheck::new().with_status_hook(metrics.status_hook());
/// hc.register(&token, OnDemand::new("postgres", Duration::from_secs(1), ping));
///
/// let report = hc.run_all(&CancellationToken::new()).await;
/// ```
pub struct Healthcheck {
    registry: Registry,
    runner: Runner,
    gate: ShutdownGate,
}

impl Healthcheck {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            runner: Runner::new(),
            gate: ShutdownGate::new(),
        }
    }

    /// Call `hook(id, status)` for every check on every run.
    pub fn with_status_hook(mut self, hook: StatusHook) -> Self {
        self.runner = self.runner.with_status_hook(hook);
        self
    }

    /// Timestamp synthesized outcomes with `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.runner = self.runner.with_clock(clock);
        self
    }

    /// Share a gate that other components can trip.
    pub fn with_shutdown_gate(mut self, gate: ShutdownGate) -> Self {
        self.gate = gate;
        self
    }

    /// Register a check; returns its identity.
    ///
    /// Background checks start polling here and stop when `token` is cancelled.
    /// Registered outside a Tokio runtime they are kept but never polled.
    pub fn register<C: Check>(&self, token: &CancellationToken, check: C) -> String {
        self.registry.register(token, check)
    }

    /// Run all checks now. Never fails; problems show up as down entries.
    pub async fn run_all(&self, token: &CancellationToken) -> Report {
        self.runner
            .run_all(self.registry.snapshot(), &self.gate, token)
            .await
    }

    /// Trip the shutdown gate: every later report is down.
    ///
    /// Call once graceful termination starts. Background checks keep polling
    /// until their registration token is cancelled.
    pub fn shutdown(&self) {
        self.gate.trip();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.gate.is_tripped()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Healthcheck {
    fn default() -> Self {
        Self::new()
    }
}
