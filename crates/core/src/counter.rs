//! Keyed run counters and the derived is-running signal
//!
//! A `RunCounts` store maps a key to the number of in-flight invocations
//! registered under that key. Every handle obtained for the same key shares
//! one counter, and each mutation is published through a watch channel so
//! the derived boolean signal is recomputed on every change.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::{Error, Result};

/// Key used by launchers that do not need their own lifecycle grouping.
pub const DEFAULT_KEY: &str = "default";

/// Store of per-key run counters.
///
/// Counters are created lazily at zero on first access and live as long as
/// the store. The store is owned by the lifecycle object (the application
/// state), so counters are destroyed exactly when that scope ends.
pub struct RunCounts<K = &'static str> {
    counters: Mutex<HashMap<K, RunCounter>>,
}

impl<K: Eq + Hash + Clone> RunCounts<K> {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Get the counter for `key`, creating it at zero on first access.
    ///
    /// Handles returned for the same key share the same underlying count.
    pub fn get(&self, key: K) -> RunCounter {
        let mut counters = self.counters.lock().unwrap();
        counters.entry(key).or_insert_with(RunCounter::new).clone()
    }
}

impl<K: Eq + Hash + Clone> Default for RunCounts<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the count of in-flight invocations for one key.
#[derive(Clone)]
pub struct RunCounter {
    count: watch::Sender<u32>,
}

impl RunCounter {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { count: tx }
    }

    /// Atomically increment and return the new count.
    pub fn increment(&self) -> u32 {
        let mut updated = 0;
        self.count.send_modify(|count| {
            *count += 1;
            updated = *count;
        });
        tracing::debug!(count = updated, "run counter incremented");
        updated
    }

    /// Atomically decrement and return the new count.
    ///
    /// Saturates at zero; an unbalanced decrement indicates a bookkeeping
    /// bug and is logged rather than wrapping.
    pub fn decrement(&self) -> u32 {
        let mut updated = 0;
        self.count.send_modify(|count| {
            if *count == 0 {
                tracing::warn!("unbalanced run counter decrement");
            }
            *count = count.saturating_sub(1);
            updated = *count;
        });
        tracing::debug!(count = updated, "run counter decremented");
        updated
    }

    /// Current number of in-flight invocations.
    pub fn count(&self) -> u32 {
        *self.count.borrow()
    }

    /// Whether any invocation is currently in flight.
    pub fn is_running(&self) -> bool {
        self.count() > 0
    }

    /// Subscribe to raw count changes.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    /// Derived boolean signal, true while the count is above zero.
    pub fn watch(&self) -> IsRunning {
        IsRunning {
            count: self.count.subscribe(),
        }
    }
}

/// Read side of the derived "is running" boolean.
///
/// The value is a projection of the run counter (`count > 0`), recomputed
/// whenever the counter changes. Clones observe the same counter.
#[derive(Clone)]
pub struct IsRunning {
    count: watch::Receiver<u32>,
}

impl IsRunning {
    /// Current value of the signal.
    pub fn get(&self) -> bool {
        *self.count.borrow() > 0
    }

    /// Wait until the signal flips and return the new value.
    pub async fn changed(&mut self) -> Result<bool> {
        let current = self.get();
        self.count
            .wait_for(|count| (*count > 0) != current)
            .await
            .map_err(|_| Error::CounterClosed)?;
        Ok(!current)
    }

    /// Wait until the signal equals `running`.
    pub async fn wait_until(&mut self, running: bool) -> Result<()> {
        self.count
            .wait_for(|count| (*count > 0) == running)
            .await
            .map_err(|_| Error::CounterClosed)?;
        Ok(())
    }
}
