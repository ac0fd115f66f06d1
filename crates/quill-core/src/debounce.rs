//! Per-key debounce scheduling with explicit cancellation.
//!
//! Each key holds at most one pending action. Scheduling again within the
//! delay window aborts the pending task and restarts the timer, so for any
//! burst of calls exactly one action runs: the last one registered. Dropping
//! the controller cancels everything; nothing fires after the owning scope
//! is torn down.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Schedules deferred actions keyed by name. Requires a Tokio runtime.
#[derive(Default)]
pub struct DebounceController {
    // Generation currently owning each key; tasks re-check this after the
    // sleep so an abort that lands mid-wakeup still cannot double-fire.
    current: Arc<Mutex<HashMap<String, u64>>>,
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
    counter: AtomicU64,
}

impl DebounceController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` to run after `delay` of inactivity on `key`.
    ///
    /// A later call for the same key cancels the pending action and restarts
    /// the timer with the new closure.
    pub fn schedule<F, Fut>(&self, key: &str, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.current).insert(key.to_string(), generation);

        let current = Arc::clone(&self.current);
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if lock(&current).get(&task_key).copied() != Some(generation) {
                return;
            }
            action().await;
        });

        if let Some(previous) = lock(&self.handles).insert(key.to_string(), handle) {
            previous.abort();
        }
    }

    /// Cancel the pending action for `key`, if any.
    pub fn cancel(&self, key: &str) {
        lock(&self.current).remove(key);
        if let Some(handle) = lock(&self.handles).remove(key) {
            handle.abort();
        }
    }

    /// Cancel every pending action.
    pub fn cancel_all(&self) {
        lock(&self.current).clear();
        for (_, handle) in lock(&self.handles).drain() {
            handle.abort();
        }
    }
}

impl Drop for DebounceController {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
