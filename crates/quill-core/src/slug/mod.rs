//! Slug sanitation: turning arbitrary title text into URL-safe slugs.
//!
//! Two entry points cover the two stages of slug generation:
//! [`sanitize_title`] for raw titles (whitespace becomes hyphens) and
//! [`sanitize_slug`] for text that should already be hyphenated, such as the
//! output of the remote generation model.

pub mod service;

pub use service::{SlugError, SlugService};

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when sanitation strips the entire input.
pub const FALLBACK_SLUG: &str = "untitled";

/// Sanitize a raw title into a URL-safe slug.
///
/// Lowercases, maps whitespace runs to single hyphens, drops everything
/// outside `[a-z0-9-]`, collapses and trims hyphens, and truncates to
/// [`MAX_SLUG_LEN`]. Empty results fall back to [`FALLBACK_SLUG`].
///
/// Idempotent: `sanitize_title(&sanitize_title(s)) == sanitize_title(s)`.
///
/// # Examples
///
/// ```
/// use quill_core::slug::sanitize_title;
///
/// assert_eq!(sanitize_title("Hello,  World!"), "hello-world");
/// assert_eq!(sanitize_title("안녕하세요"), "untitled");
/// ```
#[must_use]
pub fn sanitize_title(raw: &str) -> String {
    let mapped: String = raw
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect();
    normalize_hyphenated(&mapped)
}

/// Sanitize already-hyphenated text into a URL-safe slug.
///
/// Unlike [`sanitize_title`], whitespace is stripped rather than converted:
/// the remote generation strategy is instructed to hyphenate, so anything
/// else in its output is noise.
#[must_use]
pub fn sanitize_slug(raw: &str) -> String {
    let mapped: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        .collect();
    normalize_hyphenated(&mapped)
}

/// Collapse hyphen runs, trim boundary hyphens, truncate, and apply the
/// empty-input fallback. Input must already be restricted to `[a-z0-9-]`.
fn normalize_hyphenated(mapped: &str) -> String {
    let mut slug = String::with_capacity(mapped.len().min(MAX_SLUG_LEN));
    let mut pending_hyphen = false;
    for c in mapped.chars() {
        if c == '-' {
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }

    // All remaining chars are ASCII, so byte truncation is char-safe.
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
