//! Concurrent evaluation of all registered checks.
//!
//! # Data Flow
//! ```text
//! registry snapshot
//!     → one future per entry (joined, full-wait barrier)
//!         → probe spawned on its own task
//!         → raced against caller cancellation and the check timeout
//!         → status hook(id, status)
//!     → shutdown entry appended if the gate is tripped
//!     → aggregate status
//! ```
//!
//! A probe that loses the race is not aborted. Its task is detached and its
//! token cancelled; a probe that ignores the token keeps running (and holding
//! whatever it holds) until it returns, and its result is discarded.

use std::sync::Arc;

use futures_util::future::join_all;
use ::time::OffsetDateTime;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::CheckError;
use super::registry::RegistryEntry;
use super::shutdown::ShutdownGate;
use super::status::{CheckReport, Outcome, Report, Status};

/// Name of the synthetic entry appended while shutting down.
pub const SHUTDOWN_CHECK_NAME: &str = "__shutting_down__";

/// Callback invoked once per check per run with the resolved status.
///
/// Runs inline on the report path and must not block.
pub type StatusHook = Arc<dyn Fn(&str, Status) + Send + Sync>;

/// Source of timestamps for outcomes the runner synthesizes.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Hook that does nothing.
pub fn noop_status_hook() -> StatusHook {
    Arc::new(|_: &str, _: Status| {})
}

/// Runs checks and folds their outcomes into a [`Report`].
pub struct Runner {
    status_hook: StatusHook,
    clock: Arc<dyn Clock>,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            status_hook: noop_status_hook(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_status_hook(mut self, hook: StatusHook) -> Self {
        self.status_hook = hook;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run every entry concurrently and wait for all of them.
    ///
    /// Cancelling `token` resolves every outstanding check as canceled.
    pub async fn run_all(
        &self,
        entries: Vec<RegistryEntry>,
        gate: &ShutdownGate,
        token: &CancellationToken,
    ) -> Report {
        let runs = entries.into_iter().map(|entry| self.run_one(entry, token));
        let mut checks = join_all(runs).await;

        if gate.is_tripped() {
            checks.push(CheckReport {
                name: SHUTDOWN_CHECK_NAME.to_string(),
                state: Outcome::new(self.clock.now(), Err(CheckError::ShuttingDown)).to_state(),
                previous: Vec::new(),
            });
        }

        Report::from_checks(checks)
    }

    async fn run_one(&self, entry: RegistryEntry, token: &CancellationToken) -> CheckReport {
        let check_token = token.child_token();
        // Also fires when this future is dropped mid-run.
        let _cancel_on_drop = check_token.clone().drop_guard();
        let timeout = entry.check.timeout();

        let check = Arc::clone(&entry.check);
        let probe_token = check_token.clone();
        let mut handle = tokio::spawn(async move { check.run(probe_token).await });

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Outcome::new(self.clock.now(), Err(CheckError::Canceled)),
            _ = time::sleep(timeout) => Outcome::new(self.clock.now(), Err(CheckError::DeadlineExceeded)),
            joined = &mut handle => match joined {
                Ok(outcome) => outcome,
                Err(e) => Outcome::new(self.clock.now(), Err(CheckError::probe(format!("check task failed: {}", e)))),
            },
        };
        // Stops cooperative probes that lost the race; the task itself is left running.
        check_token.cancel();
        drop(handle);

        let status = outcome.status();
        (self.status_hook)(&entry.id, status);

        if let Some(e) = outcome.error() {
            debug!(check = %entry.id, error = %e, "Check down");
        }

        CheckReport {
            name: entry.id,
            state: outcome.to_state(),
            previous: entry
                .check
                .history()
                .iter()
                .map(Outcome::to_state)
                .collect(),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
