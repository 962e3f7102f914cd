//! Denote slug generation.

use unicode_normalization::UnicodeNormalization;

/// Slug used when the input has nothing usable in it.
pub const FALLBACK_SLUG: &str = "untitled";

/// Convert arbitrary text into a Denote slug.
///
/// The result is lowercase ASCII restricted to `[a-z0-9-]`: the input is
/// NFKD-decomposed so accented characters fold to their ASCII base, non-ASCII
/// code points are dropped, runs of whitespace and hyphens collapse into a
/// single hyphen, and everything else is removed. Empty input, or input with
/// no usable characters, yields [`FALLBACK_SLUG`].
///
/// Total and deterministic; there is no error path.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.nfkd() {
        if !ch.is_ascii() {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
        // Anything else (punctuation, underscores) is dropped outright.
        // `_` separates tags in Denote filenames and may not occur in a slug.
    }

    if out.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        out
    }
}
