//! Application state management

use tasklight_core::{RunCounts, TaskScope};

/// Main application state
///
/// Owns the lifecycle scope and the run-count store, the explicit
/// replacement for a view-model: counters live exactly as long as this
/// state, and `shutdown` cancels any work still in flight.
pub struct AppState {
    pub scope: TaskScope,
    pub counts: RunCounts,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            scope: TaskScope::new(),
            counts: RunCounts::new(),
        }
    }

    /// Tear down the lifecycle scope, cancelling outstanding work.
    pub fn shutdown(&self) {
        self.scope.shutdown();
    }
}
