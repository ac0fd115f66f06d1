//! Auto-save trigger
//!
//! Fire-and-forget saving through a persistence callback supplied by the
//! hosting application. The trigger owns no debounce of its own; callers
//! that want idle-save behavior wrap it with
//! [`crate::debounce::DebounceController`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;

use crate::draft::{DocumentSnapshot, SaveStatus};

/// Save failure classification, supplied by the persistence callback.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Persistence could not be reached; surfaces as [`SaveStatus::Offline`].
    #[error("Connectivity failure: {0}")]
    Connectivity(String),
    /// Any other failure; surfaces as [`SaveStatus::Error`].
    #[error("Save failed: {0}")]
    Other(String),
}

/// Boxed future returned by the persistence callback.
pub type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>> + Send>>;

/// Persistence callback: `save(content, title)`.
pub type SaveFn = Arc<dyn Fn(DocumentSnapshot, String) -> SaveFuture + Send + Sync>;

/// Published save state; last-write-wins across completed saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveState {
    pub status: SaveStatus,
    pub last_saved: Option<DateTime<Utc>>,
}

impl SaveState {
    fn idle() -> Self {
        Self {
            status: SaveStatus::Idle,
            last_saved: None,
        }
    }
}

/// Invokes the persistence callback and tracks save status.
///
/// Status reflects the most recently *completed* save. Overlapping saves are
/// not queued or ordered; callers needing ordering debounce upstream.
#[derive(Clone)]
pub struct Autosaver {
    on_save: SaveFn,
    state_tx: Arc<watch::Sender<SaveState>>,
}

impl Autosaver {
    #[must_use]
    pub fn new(on_save: SaveFn) -> Self {
        let (state_tx, _) = watch::channel(SaveState::idle());
        Self {
            on_save,
            state_tx: Arc::new(state_tx),
        }
    }

    /// Current save state snapshot.
    #[must_use]
    pub fn state(&self) -> SaveState {
        *self.state_tx.borrow()
    }

    /// Subscribe to save state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.state_tx.subscribe()
    }

    /// Kick off a save and return immediately.
    ///
    /// Requires a Tokio runtime. Status moves to `Saving` synchronously and
    /// settles to `Saved`/`Offline`/`Error` when the callback completes.
    pub fn trigger_save(&self, content: DocumentSnapshot, title: String) {
        self.mark_saving();
        let saver = self.clone();
        tokio::spawn(async move {
            saver.run_save(content, title).await;
        });
    }

    /// Save and wait for the outcome, e.g. on blur or an explicit shortcut.
    pub async fn save_now(&self, content: DocumentSnapshot, title: String) -> SaveState {
        self.mark_saving();
        self.run_save(content, title).await;
        self.state()
    }

    fn mark_saving(&self) {
        self.state_tx.send_modify(|state| {
            state.status = SaveStatus::Saving;
        });
    }

    async fn run_save(&self, content: DocumentSnapshot, title: String) {
        match (self.on_save)(content, title).await {
            Ok(()) => {
                let finished = Utc::now();
                self.state_tx.send_replace(SaveState {
                    status: SaveStatus::Saved,
                    last_saved: Some(finished),
                });
                tracing::debug!("Draft saved");
            }
            Err(SaveError::Connectivity(message)) => {
                self.state_tx.send_modify(|state| {
                    state.status = SaveStatus::Offline;
                });
                tracing::warn!("Save skipped, persistence unreachable: {message}");
            }
            Err(SaveError::Other(message)) => {
                self.state_tx.send_modify(|state| {
                    state.status = SaveStatus::Error;
                });
                tracing::error!("Failed to save draft: {message}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn snapshot() -> DocumentSnapshot {
        DocumentSnapshot(serde_json::json!({"type": "doc", "content": []}))
    }

    fn succeeding_save(calls: &Arc<AtomicUsize>) -> SaveFn {
        let calls = Arc::clone(calls);
        Arc::new(move |_content, _title| -> SaveFuture {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    fn failing_save(error: fn(String) -> SaveError) -> SaveFn {
        Arc::new(move |_content, _title| -> SaveFuture {
            Box::pin(async move { Err(error("boom".to_string())) })
        })
    }

    #[tokio::test]
    async fn successful_save_records_status_and_timestamp() {
        let calls = Arc::new(AtomicUsize::new(0));
        let saver = Autosaver::new(succeeding_save(&calls));

        let started = Utc::now();
        let state = saver.save_now(snapshot(), "Hello".to_string()).await;

        assert_eq!(state.status, SaveStatus::Saved);
        assert!(state.last_saved.expect("timestamp") >= started);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn trigger_save_is_fire_and_forget() {
        let calls = Arc::new(AtomicUsize::new(0));
        let saver = Autosaver::new(succeeding_save(&calls));
        let mut state_rx = saver.subscribe();

        saver.trigger_save(snapshot(), "Hello".to_string());
        assert_eq!(saver.state().status, SaveStatus::Saving);

        while saver.state().status != SaveStatus::Saved {
            state_rx.changed().await.expect("sender alive");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connectivity_failure_surfaces_as_offline() {
        let saver = Autosaver::new(failing_save(SaveError::Connectivity));
        let state = saver.save_now(snapshot(), "Hello".to_string()).await;
        assert_eq!(state.status, SaveStatus::Offline);
        assert_eq!(state.last_saved, None);
    }

    #[tokio::test]
    async fn other_failure_surfaces_as_error() {
        let saver = Autosaver::new(failing_save(SaveError::Other));
        let state = saver.save_now(snapshot(), "Hello".to_string()).await;
        assert_eq!(state.status, SaveStatus::Error);
    }

    #[tokio::test]
    async fn failure_preserves_previous_last_saved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let saver = Autosaver::new(succeeding_save(&calls));
        let saved = saver.save_now(snapshot(), "Hello".to_string()).await;

        let failing = Autosaver {
            on_save: failing_save(SaveError::Connectivity),
            state_tx: saver.state_tx,
        };
        let state = failing.save_now(snapshot(), "Hello".to_string()).await;

        assert_eq!(state.status, SaveStatus::Offline);
        assert_eq!(state.last_saved, saved.last_saved);
    }
}
