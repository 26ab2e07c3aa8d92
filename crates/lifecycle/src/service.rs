//! Shared runnable state of the owning service.

use std::sync::atomic::{AtomicBool, Ordering};

/// Runnable flag shared between the service and its per-connection handlers.
///
/// While the service is shutting down, transport errors are expected noise:
/// handlers consult this flag and take no close action once `shutdown` has
/// been called, so they never race the orderly teardown already in progress.
#[derive(Debug)]
pub struct ServiceState {
    running: AtomicBool,
}

impl ServiceState {
    pub fn new() -> Self {
        Self { running: AtomicBool::new(true) }
    }

    pub fn is_run_allowed(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}
