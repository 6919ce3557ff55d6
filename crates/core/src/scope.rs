//! Lifecycle-bound task scope
//!
//! The Rust stand-in for a view-model scope: asynchronous actions are
//! spawned on it, and tearing it down cancels everything still in flight.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::AbortHandle;

use crate::error::{Error, Result};

/// Cancellation scope for asynchronous work.
///
/// Cloning produces another handle to the same scope. `shutdown` aborts
/// every outstanding task and rejects later spawns.
#[derive(Clone)]
pub struct TaskScope {
    inner: Arc<Mutex<ScopeState>>,
}

struct ScopeState {
    tasks: Vec<AbortHandle>,
    shut_down: bool,
}

impl TaskScope {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScopeState {
                tasks: Vec::new(),
                shut_down: false,
            })),
        }
    }

    /// Spawn `future` as a task tracked by the scope.
    ///
    /// Fails with [`Error::ScopeShutDown`] after teardown; in that case the
    /// future is dropped without ever running.
    pub fn spawn<F>(&self, future: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.inner.lock().unwrap();
        if state.shut_down {
            return Err(Error::ScopeShutDown);
        }

        // Reap handles of tasks that already finished
        state.tasks.retain(|task| !task.is_finished());

        let handle = tokio::spawn(future);
        state.tasks.push(handle.abort_handle());
        Ok(())
    }

    /// Tear the scope down, aborting all outstanding tasks.
    ///
    /// Idempotent. Aborting drops each task's future, so drop-time effects
    /// attached to the future still run.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock().unwrap();
        if state.shut_down {
            return;
        }
        state.shut_down = true;

        let outstanding = state.tasks.len();
        for task in state.tasks.drain(..) {
            task.abort();
        }
        tracing::debug!(outstanding, "task scope shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().unwrap().shut_down
    }
}

impl Default for TaskScope {
    fn default() -> Self {
        Self::new()
    }
}
