//! Asset resolution and copying.
//!
//! Body text is scanned for three markup forms, in fixed order: Obsidian
//! embeds `![[ref]]`, standard markdown images `![alt](path)`, and bracketed
//! attachments `[[ref]]` / `[[ref|desc]]`. Each reference is resolved to a
//! physical file following Obsidian's lookup order and then handled per the
//! configured [`AssetHandling`] mode. An unresolved reference is left
//! untouched with a warning; it never fails the note.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};
use crate::writer::OutputFormat;

static EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());
static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
// The regex crate has no look-behind, so the not-an-embed guard is a captured
// prefix character re-emitted by the replacement.
static ATTACHMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(^|[^!])\[\[([^\]|]+\.(?:pdf|docx?|xlsx?|pptx?|zip|mp4|mp3|wav))(?:\|([^\]]+))?\]\]",
    )
    .unwrap()
});

/// Extensions treated as assets in `![[ref]]` embed syntax; anything else is
/// a note embed and stays untouched.
const EMBED_EXTENSIONS: [&str; 14] = [
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "pdf", "mp4", "mp3", "wav", "mov", "docx", "xlsx",
    "pptx",
];

/// How referenced assets are handled during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetHandling {
    /// Copy resolved assets into the output assets directory.
    #[default]
    Copy,
    /// Rewrite references to point at the resolved original paths.
    Link,
    /// Leave asset markup completely untouched.
    Ignore,
}

/// Resolved source path to its output-relative destination path. Shared
/// across all notes of a run so each asset is copied exactly once.
pub type AssetMapping = HashMap<PathBuf, String>;

/// Everything asset processing needs to know about the current note.
pub struct AssetContext<'a> {
    pub note_dir: &'a Path,
    pub vault_root: &'a Path,
    pub output_dir: &'a Path,
    pub assets_dir: &'a str,
    pub format: OutputFormat,
    pub handling: AssetHandling,
}

/// Rewrite all asset references in `content`, copying files as configured.
pub fn process(content: &str, ctx: &AssetContext<'_>, mapping: &mut AssetMapping) -> Result<String> {
    if ctx.handling == AssetHandling::Ignore {
        return Ok(content.to_string());
    }

    let mut failure: Option<ConvertError> = None;

    let pass = EMBED.replace_all(content, |caps: &Captures| {
        let original = caps[0].to_string();
        let file_ref = &caps[1];
        if !has_embed_extension(file_ref) {
            return original; // a note embed, not an asset
        }
        let Some(found) = find_asset(file_ref, ctx.note_dir, ctx.vault_root) else {
            warn!("asset not found: {file_ref}");
            return original;
        };
        let stem = display_stem(&found);
        if ctx.handling == AssetHandling::Copy {
            match copy_asset(&found, ctx, mapping) {
                Ok(dest) => render_embed(ctx.format, &dest, &stem),
                Err(e) => {
                    failure.get_or_insert(e);
                    original
                }
            }
        } else {
            render_embed(ctx.format, &found.to_string_lossy(), &stem)
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    let mut failure: Option<ConvertError> = None;
    let pass = MD_IMAGE.replace_all(&pass, |caps: &Captures| {
        let original = caps[0].to_string();
        let alt = caps[1].to_string();
        let path = &caps[2];
        if path.starts_with("http://") || path.starts_with("https://") {
            return original;
        }
        let Some(found) = find_asset(path, ctx.note_dir, ctx.vault_root) else {
            warn!("image not found: {path}");
            return original;
        };
        if ctx.handling == AssetHandling::Copy {
            match copy_asset(&found, ctx, mapping) {
                Ok(dest) => render_image(ctx.format, &dest, &alt),
                Err(e) => {
                    failure.get_or_insert(e);
                    original
                }
            }
        } else {
            // Link mode keeps markdown image markup exactly as written.
            match ctx.format {
                OutputFormat::Org => format!("[[file:{}]]", found.to_string_lossy()),
                OutputFormat::Markdown => original,
            }
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    let mut failure: Option<ConvertError> = None;
    let pass = ATTACHMENT.replace_all(&pass, |caps: &Captures| {
        let original = caps[0].to_string();
        let prefix = caps[1].to_string();
        let file_ref = &caps[2];
        let display = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| display_stem(Path::new(file_ref)));
        let Some(found) = find_asset(file_ref, ctx.note_dir, ctx.vault_root) else {
            warn!("attachment not found: {file_ref}");
            return original;
        };
        let rendered = if ctx.handling == AssetHandling::Copy {
            match copy_asset(&found, ctx, mapping) {
                Ok(dest) => render_attachment(ctx.format, &dest, &display),
                Err(e) => {
                    failure.get_or_insert(e);
                    return original;
                }
            }
        } else {
            render_attachment(ctx.format, &found.to_string_lossy(), &display)
        };
        format!("{prefix}{rendered}")
    });
    if let Some(e) = failure {
        return Err(e);
    }

    Ok(pass.into_owned())
}

/// Locate a referenced file on disk, following Obsidian's resolution order:
/// the note's directory, the vault root, conventional attachment folders,
/// and finally a recursive search over the whole vault.
pub fn find_asset(file_ref: &str, note_dir: &Path, fallback_root: &Path) -> Option<PathBuf> {
    let file_ref = file_ref.split('|').next().unwrap_or(file_ref).trim();
    let vault_root = locate_vault_root(note_dir, fallback_root);

    let candidates = [
        note_dir.join(file_ref),
        vault_root.join(file_ref),
        vault_root.join("attachments").join(file_ref),
        vault_root.join("Attachments").join(file_ref),
        vault_root.join("assets").join(file_ref),
        vault_root.join("Assets").join(file_ref),
        vault_root.join("images").join(file_ref),
        vault_root.join("Images").join(file_ref),
        vault_root.join("Files").join(file_ref),
        note_dir.join("attachments").join(file_ref),
        note_dir.join("assets").join(file_ref),
    ];
    for candidate in candidates {
        if candidate.is_file() {
            debug!("found asset {} at {}", file_ref, candidate.display());
            return Some(candidate);
        }
    }

    // Last resort: search the whole vault for the bare filename.
    let needle = Path::new(file_ref).file_name()?.to_os_string();
    debug!("searching vault for {}", needle.to_string_lossy());
    WalkDir::new(&vault_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == needle)
        .map(|e| e.into_path())
}

/// Nearest ancestor of `note_dir` containing a `.obsidian` marker folder,
/// else `fallback_root`.
fn locate_vault_root(note_dir: &Path, fallback_root: &Path) -> PathBuf {
    let mut dir = note_dir;
    loop {
        if dir.join(".obsidian").exists() {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return fallback_root.to_path_buf(),
        }
    }
}

/// Copy an asset into the output assets directory under a collision-safe
/// name (`<stem>_<8-hex-digest-of-source-path><ext>`) and record the
/// mapping. Later references to the same source reuse the first copy.
fn copy_asset(source: &Path, ctx: &AssetContext<'_>, mapping: &mut AssetMapping) -> Result<String> {
    if let Some(existing) = mapping.get(source) {
        return Ok(existing.clone());
    }

    let digest = format!("{:x}", md5::compute(source.to_string_lossy().as_bytes()));
    let stem = display_stem(source);
    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let new_name = format!("{}_{}{}", stem, &digest[..8], extension);

    let assets_dir = ctx.output_dir.join(ctx.assets_dir);
    fs::create_dir_all(&assets_dir).map_err(|e| ConvertError::CreateDir {
        path: assets_dir.clone(),
        source: e,
    })?;
    let dest = assets_dir.join(&new_name);
    fs::copy(source, &dest).map_err(|e| ConvertError::CopyAsset {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;
    debug!("copied asset {} -> {}", source.display(), dest.display());

    let relative = format!("{}/{}", ctx.assets_dir, new_name);
    mapping.insert(source.to_path_buf(), relative.clone());
    Ok(relative)
}

fn has_embed_extension(file_ref: &str) -> bool {
    let clean = file_ref.split('|').next().unwrap_or(file_ref).trim();
    Path::new(clean)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EMBED_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn display_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string())
}

fn render_embed(format: OutputFormat, path: &str, stem: &str) -> String {
    match format {
        OutputFormat::Org => format!("[[file:{path}]]"),
        OutputFormat::Markdown => format!("![{stem}]({path})"),
    }
}

fn render_image(format: OutputFormat, path: &str, alt: &str) -> String {
    match format {
        OutputFormat::Org => format!("[[file:{path}]]"),
        OutputFormat::Markdown => format!("![{alt}]({path})"),
    }
}

fn render_attachment(format: OutputFormat, path: &str, display: &str) -> String {
    match format {
        OutputFormat::Org => format!("[[file:{path}][{display}]]"),
        OutputFormat::Markdown => format!("[{display}]({path})"),
    }
}
