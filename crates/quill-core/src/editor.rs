//! Editor collaborator surface.
//!
//! The rich-text engine itself is an external collaborator; this module
//! holds the typed capability list the application assembles for it, plus
//! the paste/drop interception logic the core claims: media-URL embedding
//! and image upload validation.

use regex::Regex;
use thiserror::Error;

/// Maximum accepted image upload size (50 MiB).
pub const MAX_IMAGE_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// What kind of editor capability a descriptor declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Basic block content (paragraphs, headings, lists)
    Block,
    /// Embedded media (images, video)
    Media,
    /// Interactive commands (slash menu)
    Command,
}

/// A named editor capability the application wires into the engine.
///
/// Assembled explicitly rather than filtered out of an opaque extension list
/// by string tag, so the active set is visible in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorCapability {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: CapabilityKind,
}

/// The default capability set for the blog editor.
#[must_use]
pub fn default_capabilities() -> Vec<EditorCapability> {
    vec![
        EditorCapability {
            name: "text",
            description: "Plain paragraph text",
            kind: CapabilityKind::Block,
        },
        EditorCapability {
            name: "heading",
            description: "Section headings",
            kind: CapabilityKind::Block,
        },
        EditorCapability {
            name: "image",
            description: "Inline images with resize and upload",
            kind: CapabilityKind::Media,
        },
        EditorCapability {
            name: "youtube",
            description: "Embedded YouTube video",
            kind: CapabilityKind::Media,
        },
        EditorCapability {
            name: "slash-command",
            description: "Command palette triggered by /",
            kind: CapabilityKind::Command,
        },
    ]
}

/// A media embed recognized in pasted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedMedia {
    /// Canonical embed source URL
    pub embed_url: String,
    /// Provider-specific video identifier
    pub video_id: String,
}

/// Classify pasted plain text as an embeddable media URL.
///
/// Returns `Some` when the paste should be claimed and replaced with an
/// embed node; `None` passes the paste through to the editor untouched.
/// Currently recognizes YouTube watch/embed/shortlink URLs.
#[must_use]
pub fn classify_paste(text: &str) -> Option<EmbeddedMedia> {
    let re = Regex::new(
        r#"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .expect("Invalid regex");

    let video_id = re.captures(text)?.get(1)?.as_str().to_string();
    Some(EmbeddedMedia {
        embed_url: format!("https://www.youtube.com/embed/{video_id}"),
        video_id,
    })
}

/// Errors rejecting an image upload before it reaches the upload callback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Only image files can be uploaded")]
    NotAnImage,
    #[error("File size must not exceed 50MB")]
    TooLarge,
}

/// Validate an image paste/drop before invoking the upload callback.
pub fn validate_image_upload(mime_type: &str, size_bytes: u64) -> Result<(), UploadError> {
    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }
    if size_bytes > MAX_IMAGE_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}
