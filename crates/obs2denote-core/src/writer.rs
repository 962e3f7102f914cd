//! Output rendering for the org and markdown targets.
//!
//! The org target gets a full markup remap: a `#+title:`/`#+date:`/
//! `#+filetags:` header, a properties drawer for passthrough metadata, and a
//! line-by-line body rewrite driven by a small ordered set of substitution
//! rules (no parser, no AST). The markdown target is near-identity: link
//! rewriting plus a prepended Denote metadata preamble.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::{Captures, Regex};

use crate::frontmatter::NoteMetadata;
use crate::links::{self, FileMapping};

/// Output markup target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Denote's native org-mode markup.
    #[default]
    Org,
    /// Markdown with a Denote front-matter preamble.
    Markdown,
}

impl OutputFormat {
    /// Output filename extension, dot included.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Org => ".org",
            OutputFormat::Markdown => ".md",
        }
    }
}

// One alternation pass over each line: a span consumed by an earlier rule is
// never re-matched by a later one, so `**bold**` stays bold instead of being
// picked up again by the italic rule.
static INLINE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*(?P<bold>.+?)\*\*|__(?P<bold2>.+?)__|\*(?P<italic>[^*]+)\*|_(?P<italic2>[^_]+)_|~~(?P<strike>.+?)~~|`(?P<code>[^`]+)`",
    )
    .unwrap()
});

static UNORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s").unwrap());
static ORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)(\d+)\.\s").unwrap());
static UNCHECKED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)- \[ \]\s").unwrap());
static CHECKED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)- \[x\]\s").unwrap());

/// Render a note into an org document.
pub fn render_org(
    body: &str,
    metadata: &NoteMetadata,
    title: &str,
    tags: &[String],
    timestamp: NaiveDateTime,
    mapping: &FileMapping,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("#+title: {title}"));
    lines.push(format!("#+date: {}", timestamp.format("%Y-%m-%d")));
    if !tags.is_empty() {
        let filetags = tags.iter().map(|t| format!(":{t}:")).collect::<Vec<_>>().join(" ");
        lines.push(format!("#+filetags: {filetags}"));
    }
    if !metadata.extra.is_empty() {
        lines.push(String::new());
        lines.push(":PROPERTIES:".to_string());
        for (key, value) in &metadata.extra {
            lines.push(format!(":{}: {}", key.to_uppercase(), value));
        }
        lines.push(":END:".to_string());
    }
    lines.push(String::new());

    let mut in_code_block = false;
    for line in body.lines() {
        if let Some(fence_rest) = line.strip_prefix("```") {
            if in_code_block {
                lines.push("#+END_SRC".to_string());
            } else {
                let lang = fence_rest.trim();
                if lang.is_empty() {
                    lines.push("#+BEGIN_SRC".to_string());
                } else {
                    lines.push(format!("#+BEGIN_SRC {lang}"));
                }
            }
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            lines.push(line.to_string());
            continue;
        }

        let depth = line.chars().take_while(|&c| c == '#').count();
        if depth > 0 {
            lines.push(format!("{} {}", "*".repeat(depth), line[depth..].trim()));
            continue;
        }

        lines.push(remap_line(line));
    }

    links::rewrite_org(&lines.join("\n"), mapping)
}

/// Render a note into markdown: a Denote preamble plus the link-rewritten
/// body, with no other markup changes.
pub fn render_markdown(
    body: &str,
    title: &str,
    tags: &[String],
    timestamp: NaiveDateTime,
    mapping: &FileMapping,
    preserve_links: bool,
) -> String {
    let rewritten = links::rewrite_markdown(body, mapping, preserve_links);

    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("title: {title}\n"));
    out.push_str(&format!("date: {}\n", timestamp.format("%Y-%m-%d")));
    out.push_str(&format!("tags: {}\n", tags.join(", ")));
    out.push_str(&format!("identifier: {}\n", timestamp.format("%Y%m%dT%H%M%S")));
    out.push_str("---\n");
    out.push_str(&rewritten);
    out
}

/// Inline markup, list markers, and checkboxes for one non-heading line.
fn remap_line(line: &str) -> String {
    let line = remap_inline(line);
    let line = UNORDERED.replace(&line, "${1}- ");
    let line = ORDERED.replace(&line, "${1}${2}. ");
    let line = UNCHECKED.replace(&line, "${1}- [ ] ");
    let line = CHECKED.replace(&line, "${1}- [X] ");
    line.into_owned()
}

fn remap_inline(line: &str) -> String {
    INLINE_MARKUP
        .replace_all(line, |caps: &Captures| {
            if let Some(m) = caps.name("bold").or_else(|| caps.name("bold2")) {
                format!("*{}*", m.as_str())
            } else if let Some(m) = caps.name("italic").or_else(|| caps.name("italic2")) {
                format!("/{}/", m.as_str())
            } else if let Some(m) = caps.name("strike") {
                format!("+{}+", m.as_str())
            } else {
                format!("~{}~", &caps["code"])
            }
        })
        .into_owned()
}
