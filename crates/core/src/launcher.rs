//! Stateful launcher
//!
//! Wraps an asynchronous action in a non-blocking trigger that counts
//! in-flight invocations and exposes the derived is-running signal. The
//! launcher does not suppress overlapping invocations; it only tracks how
//! many are outstanding, and leaves re-entrancy policy to the caller.

use std::future::Future;
use std::hash::Hash;

use crate::counter::{IsRunning, RunCounter, RunCounts};
use crate::scope::TaskScope;

/// Invokable handle bundling a trigger with its run-state signal.
pub struct StatefulLauncher {
    trigger: Box<dyn Fn() + Send + Sync>,
    is_running: IsRunning,
}

impl StatefulLauncher {
    /// Fire the wrapped action. Never blocks; overlapping triggers are
    /// allowed and aggregate in the shared counter.
    pub fn trigger(&self) {
        (self.trigger)();
    }

    /// Current value of the is-running signal.
    pub fn is_running(&self) -> bool {
        self.is_running.get()
    }

    /// Subscribe to the is-running signal.
    pub fn signal(&self) -> IsRunning {
        self.is_running.clone()
    }
}

/// Decrements the run counter when dropped, whatever the exit path.
struct RunGuard {
    counter: RunCounter,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}

impl TaskScope {
    /// Build a launcher for `action`, counted under `key`.
    ///
    /// The counter is resolved from `counts`, so launchers built with the
    /// same key share run state and simultaneous triggers from different
    /// call sites aggregate. The increment is observable before the action
    /// body runs; the decrement fires on normal completion, panic, and
    /// cancellation alike.
    pub fn stateful_launcher<K, F, Fut>(
        &self,
        counts: &RunCounts<K>,
        key: K,
        action: F,
    ) -> StatefulLauncher
    where
        K: Eq + Hash + Clone,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let counter = counts.get(key);
        let is_running = counter.watch();
        let scope = self.clone();

        let trigger = Box::new(move || {
            counter.increment();
            let guard = RunGuard {
                counter: counter.clone(),
            };
            let body = action();

            // The guard rides along with the task; dropping the future on
            // abort or spawn rejection still decrements.
            let launched = scope.spawn(async move {
                let _guard = guard;
                body.await;
            });
            if launched.is_err() {
                tracing::debug!("trigger on a shut-down scope; action not launched");
            }
        });

        StatefulLauncher {
            trigger,
            is_running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::RunCounts;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    /// Action that parks until the test releases one permit.
    fn gated_action(
        gate: Arc<Semaphore>,
    ) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static
    {
        move || {
            let gate = gate.clone();
            Box::pin(async move {
                gate.acquire().await.unwrap().forget();
            })
        }
    }

    #[tokio::test]
    async fn test_single_invocation_lifecycle() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");
        let gate = Arc::new(Semaphore::new(0));
        let started = Arc::new(AtomicBool::new(false));

        let launcher = {
            let gate = gate.clone();
            let started = started.clone();
            scope.stateful_launcher(&counts, "fetch", move || {
                let gate = gate.clone();
                let started = started.clone();
                async move {
                    started.store(true, Ordering::SeqCst);
                    gate.acquire().await.unwrap().forget();
                }
            })
        };

        assert!(!launcher.is_running());

        launcher.trigger();

        // The increment is visible before the action body has run
        assert!(launcher.is_running());
        assert_eq!(counter.count(), 1);
        assert!(!started.load(Ordering::SeqCst));

        gate.add_permits(1);
        let mut signal = launcher.signal();
        signal.wait_until(false).await.unwrap();

        assert!(started.load(Ordering::SeqCst));
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_invocations_aggregate() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");
        let gate = Arc::new(Semaphore::new(0));

        let launcher = scope.stateful_launcher(&counts, "fetch", gated_action(gate.clone()));

        launcher.trigger();
        launcher.trigger();
        assert_eq!(counter.count(), 2);
        assert!(launcher.is_running());

        let mut count_rx = counter.subscribe();

        // First completes; still running
        gate.add_permits(1);
        count_rx.wait_for(|&count| count == 1).await.unwrap();
        assert!(launcher.is_running());

        // Second completes; idle again
        gate.add_permits(1);
        count_rx.wait_for(|&count| count == 0).await.unwrap();
        assert!(!launcher.is_running());
    }

    #[tokio::test]
    async fn test_returns_to_prior_count() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");
        let gate = Arc::new(Semaphore::new(0));

        // Simulate an invocation already in flight from elsewhere
        counter.increment();

        let launcher = scope.stateful_launcher(&counts, "fetch", gated_action(gate.clone()));
        for _ in 0..3 {
            launcher.trigger();
        }
        assert_eq!(counter.count(), 4);

        gate.add_permits(3);
        let mut count_rx = counter.subscribe();
        count_rx.wait_for(|&count| count == 1).await.unwrap();
        assert!(launcher.is_running());

        counter.decrement();
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_interfere() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let gate = Arc::new(Semaphore::new(0));

        let fetch = scope.stateful_launcher(&counts, "fetch", gated_action(gate.clone()));
        let sync = scope.stateful_launcher(&counts, "sync", gated_action(gate.clone()));

        fetch.trigger();
        assert!(fetch.is_running());
        assert!(!sync.is_running());
        assert_eq!(counts.get("sync").count(), 0);

        gate.add_permits(1);
        let mut signal = fetch.signal();
        signal.wait_until(false).await.unwrap();
        assert!(!sync.is_running());
    }

    #[tokio::test]
    async fn test_shared_key_across_launchers() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");
        let gate = Arc::new(Semaphore::new(0));

        // Re-created launchers (as on re-composition) share the counter
        let first = scope.stateful_launcher(&counts, "fetch", gated_action(gate.clone()));
        let second = scope.stateful_launcher(&counts, "fetch", gated_action(gate.clone()));

        first.trigger();
        second.trigger();
        assert_eq!(counter.count(), 2);
        assert!(first.is_running());
        assert!(second.is_running());

        gate.add_permits(2);
        let mut signal = first.signal();
        signal.wait_until(false).await.unwrap();
        assert!(!second.is_running());
    }

    #[tokio::test]
    async fn test_scope_teardown_decrements() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");

        let launcher =
            scope.stateful_launcher(&counts, "fetch", || std::future::pending::<()>());

        launcher.trigger();
        assert_eq!(counter.count(), 1);
        assert!(launcher.is_running());

        let mut signal = launcher.signal();
        scope.shutdown();

        // The aborted action's completion path still decrements
        signal.wait_until(false).await.unwrap();
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn test_trigger_after_shutdown_leaves_counter_unchanged() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");

        let launcher =
            scope.stateful_launcher(&counts, "fetch", || std::future::pending::<()>());

        scope.shutdown();
        launcher.trigger();

        assert_eq!(counter.count(), 0);
        assert!(!launcher.is_running());
    }

    #[tokio::test]
    async fn test_panicking_action_still_decrements() {
        let scope = TaskScope::new();
        let counts: RunCounts = RunCounts::new();
        let counter = counts.get("fetch");

        let launcher = scope.stateful_launcher(&counts, "fetch", || async {
            panic!("simulated action failure");
        });

        launcher.trigger();
        let mut signal = launcher.signal();
        signal.wait_until(false).await.unwrap();

        assert_eq!(counter.count(), 0);
    }
}
