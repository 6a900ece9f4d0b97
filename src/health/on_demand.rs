//! Checks evaluated on every readiness probe.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::check::{probe_fn, Check, CheckFn};
use super::error::{BoxError, CheckError};
use super::history::HistoryRing;
use super::status::Outcome;

/// Check that calls its probe each time the runner evaluates it.
///
/// ```rust,ignore
/// hc.register(&token, OnDemand::new("postgres", Duration::from_secs(1), move |_token| {
///     let pool = pool.clone();
///     async move { pool.ping().await.map_err(Into::into) }
/// }));
/// ```
pub struct OnDemand {
    name: String,
    timeout: Duration,
    probe: CheckFn,
    history: HistoryRing,
}

impl OnDemand {
    pub fn new<F, Fut>(name: impl Into<String>, timeout: Duration, probe: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            timeout,
            probe: probe_fn(probe),
            history: HistoryRing::new(),
        }
    }

    /// Keep `capacity` outcomes instead of the default.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = HistoryRing::with_capacity(capacity);
        self
    }
}

#[async_trait]
impl Check for OnDemand {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, token: CancellationToken) -> Outcome {
        let result = (self.probe)(token).await.map_err(CheckError::from);
        let outcome = Outcome::now(result);
        self.history.put(outcome.clone());
        outcome
    }

    fn history(&self) -> Vec<Outcome> {
        self.history.previous()
    }
}
