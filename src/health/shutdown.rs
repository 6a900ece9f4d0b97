//! One-way readiness latch for graceful termination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// Latch that forces every subsequent report down once tripped.
///
/// Clones share the same flag. There is no way back: the gate is meant to be
/// tripped when graceful shutdown starts, so the orchestrator stops routing
/// traffic before the process stops serving it.
#[derive(Clone, Debug, Default)]
pub struct ShutdownGate {
    tripped: Arc<AtomicBool>,
}

impl ShutdownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the gate. Repeated calls are no-ops.
    pub fn trip(&self) {
        if self.tripped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutdown gate tripped, readiness reports down from now on");
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}
