//! Draft model
//!
//! A draft is the in-progress, unpersisted state of a post being edited. The
//! state holder is deliberately inert: setters mutate synchronously and
//! return a change notification, and the owning orchestration layer decides
//! which effects (debounced slug regeneration, auto-save) to wire to each
//! change. See [`crate::session`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::sanitize_slug;

/// A unique identifier for a draft, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(Uuid);

impl DraftId {
    /// Create a new unique draft ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DraftId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque editor document snapshot.
///
/// The rich-text engine produces these; the core never inspects them beyond
/// carrying them to the persistence callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot(pub serde_json::Value);

/// Auto-save status of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Offline,
    Error,
}

/// Change notification returned by draft setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftChange {
    Title,
    Content,
    Slug,
}

/// A post draft being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Unique identifier
    pub id: DraftId,
    /// Post title as typed by the user
    pub title: String,
    /// Opaque editor document, absent until the first edit
    pub content: Option<DocumentSnapshot>,
    /// URL-safe slug; only ever holds sanitizer output
    slug: String,
    /// Auto-save status
    pub save_status: SaveStatus,
    /// Completion time of the last successful save
    pub last_saved: Option<DateTime<Utc>>,
}

impl Draft {
    /// Create an empty draft, as on page load.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: DraftId::new(),
            title: String::new(),
            content: None,
            slug: String::new(),
            save_status: SaveStatus::Idle,
            last_saved: None,
        }
    }

    /// Replace the title.
    pub fn set_title(&mut self, title: impl Into<String>) -> DraftChange {
        self.title = title.into();
        DraftChange::Title
    }

    /// Replace the document snapshot.
    pub fn set_content(&mut self, content: DocumentSnapshot) -> DraftChange {
        self.content = Some(content);
        DraftChange::Content
    }

    /// Replace the slug.
    ///
    /// The value is passed through the strict sanitizer, so the slug field
    /// invariant (charset `[a-z0-9-]`, well-formed hyphens, length <= 50, or
    /// the literal fallback) holds no matter what the caller supplies.
    pub fn set_slug(&mut self, slug: &str) -> DraftChange {
        self.slug = sanitize_slug(slug);
        DraftChange::Slug
    }

    /// The current slug; empty until the first generation completes.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Whether the trimmed title is empty (slug generation must be skipped).
    #[must_use]
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}
