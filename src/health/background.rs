//! Checks polled by a dedicated task.
//!
//! # Scheduling
//!
//! ```text
//! Idle ──start()──▶ WaitingDelay ──delay elapsed──▶ Polling ──token cancelled──▶ Stopped
//!                        │                             ▲   │
//!                        └──────token cancelled────────┼───┴──▶ Stopped
//!                                                      │
//!                              probe → put outcome → wait for period tick
//! ```
//!
//! `Stopped` is terminal: once the registration token is cancelled no outcome is
//! written, even for a probe that was in flight at that moment.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::check::{probe_fn, Check, CheckFn, UNBOUNDED_TIMEOUT};
use super::error::{BoxError, CheckError};
use super::history::HistoryRing;
use super::status::Outcome;

/// Smallest accepted poll period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Lifecycle of a background check's polling task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundState {
    /// Not registered yet.
    Idle,
    /// Registered, waiting for the initial delay.
    WaitingDelay,
    /// Probing once per period.
    Polling,
    /// Registration token cancelled; no further outcomes.
    Stopped,
}

impl BackgroundState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::WaitingDelay,
            2 => Self::Polling,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::WaitingDelay => 1,
            Self::Polling => 2,
            Self::Stopped => 3,
        }
    }
}

impl fmt::Display for BackgroundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::WaitingDelay => write!(f, "waiting_delay"),
            Self::Polling => write!(f, "polling"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Check for slow or expensive probes.
///
/// The probe runs on its own schedule and readiness requests only read the
/// latest stored outcome, so they never wait for the probe. The polling task is
/// spawned when the check is registered and lives until the registration token
/// is cancelled; the period should be longer than the per-run timeout.
#[derive(Clone)]
pub struct Background {
    inner: Arc<BackgroundInner>,
}

struct BackgroundInner {
    name: String,
    delay: Duration,
    period: Duration,
    timeout: Duration,
    probe: CheckFn,
    history: HistoryRing,
    initial: Result<(), CheckError>,
    state: AtomicU8,
    started: AtomicBool,
}

impl Background {
    /// Create a background check.
    ///
    /// * `initial` - reported until the first probe completes
    /// * `delay` - wait before the first probe
    /// * `period` - interval between probe starts (minimum 1ms)
    /// * `timeout` - bound for a single probe
    pub fn new<E, F, Fut>(
        name: impl Into<String>,
        initial: Result<(), E>,
        delay: Duration,
        period: Duration,
        timeout: Duration,
        probe: F,
    ) -> Self
    where
        E: fmt::Display,
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let initial = initial.map_err(CheckError::probe);
        let history = HistoryRing::new();
        history.put(Outcome::now(initial.clone()));

        Self {
            inner: Arc::new(BackgroundInner {
                name: name.into(),
                delay,
                period: period.max(MIN_PERIOD),
                timeout,
                probe: probe_fn(probe),
                history,
                initial,
                state: AtomicU8::new(BackgroundState::Idle.as_u8()),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Keep `capacity` outcomes instead of the default.
    ///
    /// Meant for construction time, before the check is registered.
    pub fn with_history_capacity(self, capacity: usize) -> Self {
        let inner = &self.inner;
        let history = HistoryRing::with_capacity(capacity);
        history.put(Outcome::now(inner.initial.clone()));

        Self {
            inner: Arc::new(BackgroundInner {
                name: inner.name.clone(),
                delay: inner.delay,
                period: inner.period,
                timeout: inner.timeout,
                probe: Arc::clone(&inner.probe),
                history,
                initial: inner.initial.clone(),
                state: AtomicU8::new(BackgroundState::Idle.as_u8()),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Current scheduling state.
    pub fn state(&self) -> BackgroundState {
        self.inner.state()
    }

    /// Poll period.
    pub fn period(&self) -> Duration {
        self.inner.period
    }
}

impl BackgroundInner {
    fn state(&self) -> BackgroundState {
        BackgroundState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: BackgroundState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    async fn poll(self: Arc<Self>, token: CancellationToken) {
        self.set_state(BackgroundState::WaitingDelay);
        debug!(check = %self.name, delay_ms = self.delay.as_millis() as u64, "Background check waiting");

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.stop();
                return;
            }
            _ = time::sleep(self.delay) => {}
        }

        self.set_state(BackgroundState::Polling);

        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let probe_token = token.child_token();
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                res = time::timeout(self.timeout, (self.probe)(probe_token.clone())) => match res {
                    Ok(result) => result.map_err(CheckError::from),
                    Err(_) => Err(CheckError::DeadlineExceeded),
                },
            };
            probe_token.cancel();

            if token.is_cancelled() {
                break;
            }

            if let Err(ref e) = result {
                debug!(check = %self.name, error = %e, "Background probe failed");
            }
            self.history.put(Outcome::now(result));
        }

        self.stop();
    }

    fn stop(&self) {
        self.set_state(BackgroundState::Stopped);
        info!(check = %self.name, "Background check stopped");
    }
}

#[async_trait]
impl Check for Background {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn timeout(&self) -> Duration {
        UNBOUNDED_TIMEOUT
    }

    async fn run(&self, _token: CancellationToken) -> Outcome {
        self.inner
            .history
            .last()
            .unwrap_or_else(|| Outcome::now(Ok(())))
    }

    fn history(&self) -> Vec<Outcome> {
        self.inner.history.previous()
    }

    /// Spawn the polling task on the current Tokio runtime.
    ///
    /// Outside a runtime the check stays `Idle` and keeps its initial outcome.
    fn start(&self, token: CancellationToken) {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(
                    check = %self.inner.name,
                    error = %e,
                    "No Tokio runtime, background check not started"
                );
                return;
            }
        };

        if self.inner.started.swap(true, Ordering::AcqRel) {
            warn!(check = %self.inner.name, "Background check already started, ignoring");
            return;
        }

        info!(
            check = %self.inner.name,
            period_ms = self.inner.period.as_millis() as u64,
            timeout_ms = self.inner.timeout.as_millis() as u64,
            "Background check started"
        );
        runtime.spawn(Arc::clone(&self.inner).poll(token));
    }
}
