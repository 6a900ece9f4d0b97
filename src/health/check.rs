//! The capability set shared by every check variant.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::error::BoxError;
use super::status::Outcome;

/// Timeout reported by checks whose `run` only reads stored state.
///
/// There is no work to bound, so the runner effectively never times them out.
pub const UNBOUNDED_TIMEOUT: Duration = Duration::from_secs(3600);

/// Boxed future returned by a probe.
pub type ProbeFuture = BoxFuture<'static, Result<(), BoxError>>;

/// Probe function: receives a token that is cancelled when the caller stops
/// waiting, and resolves to `Ok(())` when the probed dependency is healthy.
pub type CheckFn = Arc<dyn Fn(CancellationToken) -> ProbeFuture + Send + Sync>;

/// Box an async closure into a [`CheckFn`].
pub fn probe_fn<F, Fut>(f: F) -> CheckFn
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |token| Box::pin(f(token)))
}

/// A named unit of health evaluation.
///
/// Implemented by [`OnDemand`](super::OnDemand), [`Manual`](super::Manual) and
/// [`Background`](super::Background).
#[async_trait]
pub trait Check: Send + Sync + 'static {
    /// Requested name; the registry derives the check identity from it.
    fn name(&self) -> &str;

    /// Upper bound the runner applies to a single `run`.
    fn timeout(&self) -> Duration;

    /// Evaluate the check once.
    async fn run(&self, token: CancellationToken) -> Outcome;

    /// Stored outcomes preceding the latest one, most recent first.
    fn history(&self) -> Vec<Outcome>;

    /// Hook invoked once at registration, bound to the registration token.
    ///
    /// Only checks that own a long-lived task do anything here.
    fn start(&self, _token: CancellationToken) {}
}
