//! Health check aggregation for orchestrator probes.
//!
//! Checks come in three kinds:
//! - **OnDemand**: probe called on every readiness request, bounded by its timeout
//! - **Manual**: state set by the application (`set_ok` / `set_error`)
//! - **Background**: probe polled by its own task; requests read the last result
//!
//! # Data Flow
//! ```text
//! Healthcheck::register(token, check)
//!     → Registry (identity normalized, deduplicated; background task started)
//!
//! Healthcheck::run_all(token)
//!     → Registry snapshot
//!     → Runner (all checks concurrently, per-check timeout)
//!     → HistoryRing of each check supplies `previous`
//!     → ShutdownGate adds `__shutting_down__` once tripped
//!     → Report { status, checks }
//! ```
//!
//! # Kubernetes Integration
//!
//! ```yaml
//! livenessProbe:
//!   httpGet:
//!     path: /live
//!     port: 8000
//!
//! readinessProbe:
//!   httpGet:
//!     path: /ready
//!     port: 8000
//!   periodSeconds: 5
//! ```

mod background;
mod check;
mod error;
mod history;
mod manual;
mod on_demand;
mod registry;
mod runner;
mod service;
mod shutdown;
mod status;

pub use background::{Background, BackgroundState};
pub use check::{probe_fn, Check, CheckFn, ProbeFuture, UNBOUNDED_TIMEOUT};
pub use error::{BoxError, CheckError};
pub use history::{HistoryRing, DEFAULT_HISTORY_CAPACITY};
pub use manual::Manual;
pub use on_demand::OnDemand;
pub use registry::{normalize_name, Registry, RegistryEntry};
pub use runner::{noop_status_hook, Clock, Runner, StatusHook, SystemClock, SHUTDOWN_CHECK_NAME};
pub use service::Healthcheck;
pub use shutdown::ShutdownGate;
pub use status::{CheckReport, CheckState, Outcome, Report, Status};
