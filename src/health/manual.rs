//! Checks whose state is set by the application.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::check::{Check, UNBOUNDED_TIMEOUT};
use super::error::CheckError;
use super::history::HistoryRing;
use super::status::Outcome;

/// Check driven by explicit `set_*` calls.
///
/// A fresh check is down with the `initial` error until the application
/// reports otherwise. Clones share state, so one handle can be registered while
/// another stays with the code that flips it.
///
/// ```rust,ignore
/// let warmup = Manual::new("cache-warmup");
/// hc.register(&token, warmup.clone());
/// // ... later
/// warmup.set_ok();
/// ```
#[derive(Clone)]
pub struct Manual {
    inner: Arc<ManualInner>,
}

struct ManualInner {
    name: String,
    current: RwLock<Outcome>,
    history: HistoryRing,
}

impl Manual {
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), HistoryRing::new())
    }

    /// Keep `capacity` outcomes instead of the default.
    ///
    /// Meant for construction time: the returned handle no longer shares state
    /// with clones taken earlier.
    pub fn with_history_capacity(self, capacity: usize) -> Self {
        Self::build(self.inner.name.clone(), HistoryRing::with_capacity(capacity))
    }

    fn build(name: String, history: HistoryRing) -> Self {
        let initial = Outcome::now(Err(CheckError::Initial));
        history.put(initial.clone());

        Self {
            inner: Arc::new(ManualInner {
                name,
                current: RwLock::new(initial),
                history,
            }),
        }
    }

    /// Record a new state. Every call is recorded, repeats included.
    pub fn set_result<E: fmt::Display>(&self, result: Result<(), E>) {
        let outcome = Outcome::now(result.map_err(CheckError::probe));

        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = outcome.clone();
        self.inner.history.put(outcome);
    }

    /// Mark the check healthy.
    pub fn set_ok(&self) {
        self.set_result::<CheckError>(Ok(()));
    }

    /// Mark the check failed with `err`.
    pub fn set_error(&self, err: impl fmt::Display) {
        self.set_result(Err(err));
    }

    /// Latest recorded state.
    pub fn current(&self) -> Outcome {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for Manual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manual")
            .field("name", &self.inner.name)
            .field("current", &self.current())
            .finish()
    }
}

#[async_trait]
impl Check for Manual {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn timeout(&self) -> Duration {
        UNBOUNDED_TIMEOUT
    }

    async fn run(&self, _token: CancellationToken) -> Outcome {
        self.current()
    }

    fn history(&self) -> Vec<Outcome> {
        self.inner.history.previous()
    }
}
