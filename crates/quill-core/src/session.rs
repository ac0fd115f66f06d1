//! Editing session orchestration.
//!
//! `EditorSession` is the single owner of a draft. The draft itself is
//! inert; this layer wires mutation events to their effects: title changes
//! schedule a debounced slug regeneration, and content or title changes
//! trigger an auto-save. Slug responses are guarded by a monotonic sequence
//! number so an in-flight response that lost the race to a newer request
//! can never overwrite fresher state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::autosave::{Autosaver, SaveFn, SaveState};
use crate::debounce::DebounceController;
use crate::draft::{DocumentSnapshot, Draft};
use crate::slug::SlugService;

/// Quiet period after the last keystroke before slug regeneration fires.
pub const SLUG_DEBOUNCE: Duration = Duration::from_millis(1000);

const SLUG_KEY: &str = "title";

/// Owns a draft and wires its mutations to debounce and auto-save effects.
///
/// Lives for the duration of the editing scope; dropping the session cancels
/// any pending slug regeneration.
pub struct EditorSession {
    draft: Arc<Mutex<Draft>>,
    debouncer: DebounceController,
    slug_service: Arc<SlugService>,
    autosaver: Autosaver,
    slug_debounce: Duration,
    slug_seq: AtomicU64,
    applied_slug_seq: Arc<AtomicU64>,
}

impl EditorSession {
    #[must_use]
    pub fn new(slug_service: SlugService, on_save: SaveFn) -> Self {
        Self {
            draft: Arc::new(Mutex::new(Draft::new())),
            debouncer: DebounceController::new(),
            slug_service: Arc::new(slug_service),
            autosaver: Autosaver::new(on_save),
            slug_debounce: SLUG_DEBOUNCE,
            slug_seq: AtomicU64::new(0),
            applied_slug_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the slug regeneration delay.
    #[must_use]
    pub fn with_slug_debounce(mut self, delay: Duration) -> Self {
        self.slug_debounce = delay;
        self
    }

    /// Apply a title keystroke.
    ///
    /// Saves immediately when content already exists, and (for non-empty
    /// titles) schedules a debounced slug regeneration that supersedes any
    /// pending one.
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        let content = {
            let mut draft = lock(&self.draft);
            draft.set_title(title.clone());
            draft.content.clone()
        };

        if let Some(content) = content {
            self.autosaver.trigger_save(content, title.clone());
        }

        if title.trim().is_empty() {
            self.debouncer.cancel(SLUG_KEY);
            return;
        }

        let seq = self.slug_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let service = Arc::clone(&self.slug_service);
        let draft = Arc::clone(&self.draft);
        let applied = Arc::clone(&self.applied_slug_seq);
        self.debouncer.schedule(SLUG_KEY, self.slug_debounce, move || async move {
            match service.generate_slug(&title).await {
                Ok(slug) => apply_slug_response(&draft, &applied, seq, &slug),
                // Failure leaves the slug exactly as it was.
                Err(error) => tracing::warn!("Slug generation failed: {error}"),
            }
        });
    }

    /// Apply an editor document change. Always triggers an auto-save.
    pub fn set_content(&self, content: DocumentSnapshot) {
        let title = {
            let mut draft = lock(&self.draft);
            draft.set_content(content.clone());
            draft.title.clone()
        };
        self.autosaver.trigger_save(content, title);
    }

    /// Snapshot of the draft with the current save state folded in.
    #[must_use]
    pub fn draft(&self) -> Draft {
        let mut draft = lock(&self.draft).clone();
        let save_state = self.autosaver.state();
        draft.save_status = save_state.status;
        draft.last_saved = save_state.last_saved;
        draft
    }

    /// The current slug; empty until the first generation completes.
    #[must_use]
    pub fn slug(&self) -> String {
        lock(&self.draft).slug().to_string()
    }

    /// Current save state snapshot.
    #[must_use]
    pub fn save_state(&self) -> SaveState {
        self.autosaver.state()
    }

    /// Subscribe to save state changes.
    #[must_use]
    pub fn subscribe_save_state(&self) -> watch::Receiver<SaveState> {
        self.autosaver.subscribe()
    }
}

/// Write a slug response unless a newer one has already been applied.
fn apply_slug_response(
    draft: &Arc<Mutex<Draft>>,
    applied: &Arc<AtomicU64>,
    seq: u64,
    slug: &str,
) {
    if applied.fetch_max(seq, Ordering::SeqCst) < seq {
        lock(draft).set_slug(slug);
    } else {
        tracing::debug!(seq, "Discarded stale slug response");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use pretty_assertions::assert_eq;

    use crate::draft::SaveStatus;

    use super::*;

    const TEST_DEBOUNCE: Duration = Duration::from_millis(20);
    const SETTLE: Duration = Duration::from_millis(200);

    fn counting_save(calls: &Arc<AtomicUsize>) -> SaveFn {
        let calls = Arc::clone(calls);
        Arc::new(move |_content, _title| -> crate::autosave::SaveFuture {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        })
    }

    fn session(calls: &Arc<AtomicUsize>) -> EditorSession {
        EditorSession::new(SlugService::local().unwrap(), counting_save(calls))
            .with_slug_debounce(TEST_DEBOUNCE)
    }

    fn snapshot() -> DocumentSnapshot {
        DocumentSnapshot(serde_json::json!({"type": "doc", "content": []}))
    }

    #[tokio::test]
    async fn title_edits_regenerate_slug_once_after_quiet_period() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = session(&calls);

        session.set_title("Hel");
        session.set_title("Hello");
        session.set_title("Hello World");

        tokio::time::sleep(SETTLE).await;
        assert_eq!(session.slug(), "hello-world");
    }

    #[tokio::test]
    async fn empty_title_schedules_no_slug_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = session(&calls);

        session.set_title("Hello");
        session.set_title("   ");

        tokio::time::sleep(SETTLE).await;
        assert_eq!(session.slug(), "");
    }

    #[tokio::test]
    async fn content_changes_trigger_saves() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = session(&calls);
        let mut state_rx = session.subscribe_save_state();

        session.set_content(snapshot());
        while session.save_state().status != SaveStatus::Saved {
            state_rx.changed().await.expect("sender alive");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let draft = session.draft();
        assert_eq!(draft.save_status, SaveStatus::Saved);
        assert!(draft.last_saved.is_some());
    }

    #[tokio::test]
    async fn title_edit_without_content_does_not_save() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = session(&calls);

        session.set_title("Hello");
        tokio::time::sleep(SETTLE).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.save_state().status, SaveStatus::Idle);
    }

    #[tokio::test]
    async fn title_edit_with_content_saves_with_latest_title() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = session(&calls);

        session.set_content(snapshot());
        session.set_title("Hello");
        tokio::time::sleep(SETTLE).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.draft().title, "Hello");
    }

    #[tokio::test]
    async fn dropping_session_cancels_pending_slug_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = session(&calls);
        let draft = Arc::clone(&session.draft);

        session.set_title("Hello");
        drop(session);

        tokio::time::sleep(SETTLE).await;
        assert_eq!(lock(&draft).slug(), "");
    }

    #[test]
    fn stale_slug_responses_are_discarded() {
        let draft = Arc::new(Mutex::new(Draft::new()));
        let applied = Arc::new(AtomicU64::new(0));

        apply_slug_response(&draft, &applied, 2, "newer-slug");
        apply_slug_response(&draft, &applied, 1, "stale-slug");

        assert_eq!(lock(&draft).slug(), "newer-slug");
    }

    #[test]
    fn equal_sequence_is_not_reapplied() {
        let draft = Arc::new(Mutex::new(Draft::new()));
        let applied = Arc::new(AtomicU64::new(0));

        apply_slug_response(&draft, &applied, 3, "first");
        apply_slug_response(&draft, &applied, 3, "second");

        assert_eq!(lock(&draft).slug(), "first");
    }
}
