//! Wiki-link rewriting.
//!
//! `[[target]]` and `[[target|display]]` cross-references are rewritten for
//! the output target, resolving against the filenames generated earlier in
//! the same run. A target with no mapping entry passes through unchanged:
//! resolution is single-pass, so a note can only link to notes that were
//! converted before it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static EMBED_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());

/// Original note path to the Denote filename generated for it this run.
pub type FileMapping = HashMap<PathBuf, String>;

/// Rewrite wiki-links for the org target.
///
/// `[[target]]` becomes `[[file:target.org][target]]` (the bracketed target
/// replaced by its mapped Denote stem when one exists); any still-intact
/// embed `![[ref]]` becomes a raw org file link.
pub fn rewrite_org(content: &str, mapping: &FileMapping) -> String {
    let rewritten = WIKI_LINK.replace_all(content, |caps: &Captures| {
        let (target, display) = split_target(&caps[1]);
        format!("[[file:{}.org][{}]]", resolve_target(target, mapping), display)
    });
    EMBED_LINK.replace_all(&rewritten, "[[file:$1]]").into_owned()
}

/// Rewrite wiki-links for the markdown target.
///
/// With `preserve_links` the Obsidian syntax passes through untouched;
/// otherwise both forms become standard `[display](target.md)` links.
pub fn rewrite_markdown(content: &str, mapping: &FileMapping, preserve_links: bool) -> String {
    if preserve_links {
        return content.to_string();
    }
    WIKI_LINK
        .replace_all(content, |caps: &Captures| {
            let (target, display) = split_target(&caps[1]);
            format!("[{}]({}.md)", display, resolve_target(target, mapping))
        })
        .into_owned()
}

fn split_target(raw: &str) -> (&str, &str) {
    match raw.split_once('|') {
        Some((target, display)) => (target, display),
        None => (raw, raw),
    }
}

/// Look the target up in the run's file mapping by original filename stem.
fn resolve_target<'a>(target: &'a str, mapping: &'a FileMapping) -> &'a str {
    for (original, denote_name) in mapping {
        if original.file_stem().and_then(|s| s.to_str()) == Some(target) {
            return Path::new(denote_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(denote_name);
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_basic() {
        let result = rewrite_org("Check [[my-note]] for details", &FileMapping::new());
        assert_eq!(result, "Check [[file:my-note.org][my-note]] for details");
    }

    #[test]
    fn test_org_with_display() {
        let result = rewrite_org("See [[another note|description]]", &FileMapping::new());
        assert_eq!(result, "See [[file:another note.org][description]]");
    }

    #[test]
    fn test_org_resolves_mapped_stem() {
        let mut mapping = FileMapping::new();
        mapping.insert(
            PathBuf::from("/vault/another note.md"),
            "20240115T103000--another-note.org".to_string(),
        );
        let result = rewrite_org("See [[another note|description]]", &mapping);
        assert_eq!(result, "See [[file:20240115T103000--another-note.org][description]]");
    }

    #[test]
    fn test_org_unmapped_target_unchanged() {
        let mut mapping = FileMapping::new();
        mapping.insert(PathBuf::from("/vault/other.md"), "20240101T000000--other.org".to_string());
        let result = rewrite_org("See [[missing]]", &mapping);
        assert_eq!(result, "See [[file:missing.org][missing]]");
    }

    #[test]
    fn test_markdown_links() {
        let result = rewrite_markdown(
            "Check [[my-note]] and [[another note|description]]",
            &FileMapping::new(),
            false,
        );
        assert!(result.contains("[my-note](my-note.md)"));
        assert!(result.contains("[description](another note.md)"));
    }

    #[test]
    fn test_markdown_preserved() {
        let content = "Check [[my-note]] here";
        assert_eq!(rewrite_markdown(content, &FileMapping::new(), true), content);
    }

    #[test]
    fn test_note_embed_keeps_bang() {
        // A non-asset embed survives asset processing and is rewritten by
        // the generic rule, keeping the leading bang.
        let result = rewrite_org("![[some note]]", &FileMapping::new());
        assert_eq!(result, "![[file:some note.org][some note]]");
    }
}
