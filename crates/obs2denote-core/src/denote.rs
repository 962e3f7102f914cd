//! Denote filename derivation.
//!
//! A Denote filename is `<timestamp>--<slug>[__<tag1>_<tag2>...]<ext>`:
//! the timestamp is `YYYYMMDDTHHMMSS`, the slug comes from the note's title,
//! and the tag segment is omitted when the note has no tags.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::frontmatter::NoteMetadata;
use crate::slug::slugify;

static FIRST_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// The derived Denote identity of one note.
#[derive(Debug, Clone)]
pub struct DenoteName {
    /// Full output filename, extension included.
    pub filename: String,
    /// Resolved title before slugification.
    pub title: String,
    /// Deduplicated raw tags in first-seen order.
    pub tags: Vec<String>,
    /// Timestamp encoded in the filename.
    pub timestamp: NaiveDateTime,
}

impl DenoteName {
    /// Filename without its extension.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }
}

/// Derive the Denote name for a note.
///
/// The timestamp prefers the front matter `created` field over the file's
/// modification time. The title falls back through metadata title, first
/// alias, first top-level heading, and filename stem. `extra_tags` (folder
/// tags) are appended after the note's own tags.
pub fn derive(
    input: &Path,
    metadata: &NoteMetadata,
    body: &str,
    extra_tags: &[String],
    extension: &str,
) -> DenoteName {
    let timestamp = metadata
        .created
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or_else(|| modified_timestamp(input));
    let title = resolve_title(input, metadata, body);
    let tags = collect_tags(metadata, body, extra_tags);

    let mut filename = format!("{}--{}", timestamp.format("%Y%m%dT%H%M%S"), slugify(&title));
    if !tags.is_empty() {
        let joined = tags.iter().map(|t| slugify(t)).collect::<Vec<_>>().join("_");
        filename.push_str("__");
        filename.push_str(&joined);
    }
    filename.push_str(extension);

    DenoteName { filename, title, tags, timestamp }
}

/// Parse the ISO-ish datetime shapes front matter tends to carry.
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    let raw = raw.trim();
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

fn modified_timestamp(path: &Path) -> NaiveDateTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).naive_local())
        .unwrap_or_else(|_| Local::now().naive_local())
}

fn resolve_title(input: &Path, metadata: &NoteMetadata, body: &str) -> String {
    if let Some(title) = &metadata.title {
        return title.clone();
    }
    if let Some(alias) = metadata.aliases.first() {
        return alias.clone();
    }
    if let Some(caps) = FIRST_HEADING.captures(body) {
        return caps[1].trim().to_string();
    }
    if let Some(stem) = input.file_stem().and_then(|s| s.to_str())
        && !stem.is_empty()
    {
        return stem.to_string();
    }
    "untitled".to_string()
}

fn collect_tags(metadata: &NoteMetadata, body: &str, extra_tags: &[String]) -> Vec<String> {
    let mut tags = Vec::new();
    for tag in &metadata.tags {
        push_unique(&mut tags, tag);
    }
    for caps in INLINE_TAG.captures_iter(body) {
        push_unique(&mut tags, &caps[1]);
    }
    for tag in extra_tags {
        push_unique(&mut tags, tag);
    }
    tags
}

fn push_unique(tags: &mut Vec<String>, tag: &str) {
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}
