//! quill-core - Core library for Quill
//!
//! This crate contains the draft model, slug generation, debounce scheduling,
//! and auto-save logic shared by the Quill API server and CLI.

pub mod autosave;
pub mod debounce;
pub mod draft;
pub mod editor;
pub mod session;
pub mod slug;
pub mod util;

pub use autosave::{Autosaver, SaveError, SaveFn, SaveState};
pub use debounce::DebounceController;
pub use draft::{DocumentSnapshot, Draft, DraftChange, DraftId, SaveStatus};
pub use session::EditorSession;
pub use slug::{sanitize_slug, sanitize_title, SlugError, SlugService, FALLBACK_SLUG, MAX_SLUG_LEN};
