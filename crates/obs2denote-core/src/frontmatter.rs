//! YAML front matter extraction.
//!
//! Obsidian notes may open with a `---`-fenced YAML block. The block is
//! parsed into an owned [`NoteMetadata`]; a malformed block is swallowed and
//! the note is treated as having no metadata at all.

use saphyr::{LoadableYamlNode, Yaml};

/// Metadata extracted from a note's front matter.
///
/// `extra` keeps every key other than `title`, `tags`, and `aliases` in
/// document order; those feed the org properties drawer. `created` is
/// duplicated into its own field because it also drives the Denote timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMetadata {
    pub title: Option<String>,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub created: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl NoteMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.aliases.is_empty()
            && self.tags.is_empty()
            && self.created.is_none()
            && self.extra.is_empty()
    }
}

/// Split a note into front matter and body.
///
/// Returns the parsed metadata and the text after the closing `---` line.
/// A missing, unterminated, or malformed block yields empty metadata and the
/// input unchanged.
pub fn extract(content: &str) -> (NoteMetadata, &str) {
    if !content.starts_with("---\n") {
        return (NoteMetadata::default(), content);
    }
    let Some(rel) = content[4..].find("\n---\n") else {
        return (NoteMetadata::default(), content);
    };
    let yaml_src = &content[4..4 + rel];
    let body = &content[4 + rel + 5..];

    match parse_block(yaml_src) {
        Some(metadata) => (metadata, body),
        None => (NoteMetadata::default(), content),
    }
}

/// Parse the YAML between the fences. `None` means the block is not a usable
/// key/value mapping and the whole note should be treated as body text.
fn parse_block(source: &str) -> Option<NoteMetadata> {
    let docs = Yaml::load_from_str(source).ok()?;
    let doc = docs.first()?;
    let mapping = doc.as_mapping()?;

    let mut metadata = NoteMetadata::default();
    for (key, value) in mapping.iter() {
        let Some(key) = key.as_str() else { continue };
        match key {
            "title" => metadata.title = scalar_string(value),
            "aliases" => metadata.aliases = string_or_sequence(value),
            "tags" => metadata.tags = string_or_sequence(value),
            _ => {
                if key == "created" {
                    metadata.created = scalar_string(value);
                }
                if let Some(rendered) = render_value(value) {
                    metadata.extra.push((key.to_string(), rendered));
                }
            }
        }
    }
    Some(metadata)
}

/// A string-valued field is exactly a one-element list.
fn string_or_sequence(value: &Yaml) -> Vec<String> {
    if let Some(seq) = value.as_sequence() {
        seq.iter().filter_map(scalar_string).collect()
    } else {
        scalar_string(value).into_iter().collect()
    }
}

fn scalar_string(value: &Yaml) -> Option<String> {
    if let Some(s) = value.as_str() {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    } else if let Some(b) = value.as_bool() {
        Some(b.to_string())
    } else if let Some(i) = value.as_integer() {
        Some(i.to_string())
    } else if let Some(f) = value.as_floating_point() {
        Some(f.to_string())
    } else {
        None
    }
}

/// Render an arbitrary passthrough value; sequences come out comma-joined.
fn render_value(value: &Yaml) -> Option<String> {
    if let Some(seq) = value.as_sequence() {
        let parts: Vec<String> = seq.iter().filter_map(scalar_string).collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    } else {
        scalar_string(value)
    }
}
