//! Per-note conversion pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::assets::{self, AssetContext, AssetHandling, AssetMapping};
use crate::denote;
use crate::error::{ConvertError, Result};
use crate::frontmatter;
use crate::links::FileMapping;
use crate::writer::{self, OutputFormat};

/// Options fixed at converter construction.
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    pub format: OutputFormat,
    /// Markdown target only: pass wiki-links through untouched.
    pub preserve_links: bool,
    pub assets: AssetHandling,
    /// Name of the assets subdirectory under the output directory.
    pub assets_dir: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Org,
            preserve_links: false,
            assets: AssetHandling::Copy,
            assets_dir: "assets".to_string(),
        }
    }
}

/// Result of converting one note.
#[derive(Debug, Clone)]
pub struct ConvertedNote {
    pub denote_filename: String,
    pub output_path: PathBuf,
    pub title: String,
    pub tags: Vec<String>,
}

/// Converts Obsidian notes to Denote files.
///
/// One converter instance spans one conversion run. It owns the two
/// process-lifetime mappings: original path → Denote filename (so later
/// notes can resolve links to earlier ones) and asset source → destination
/// (so each asset is copied exactly once). Neither is ever persisted.
pub struct Converter {
    options: ConverterOptions,
    file_mapping: FileMapping,
    asset_mapping: AssetMapping,
}

impl Converter {
    pub fn new(options: ConverterOptions) -> Self {
        Self {
            options,
            file_mapping: FileMapping::new(),
            asset_mapping: AssetMapping::new(),
        }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Number of distinct assets copied so far in this run.
    pub fn assets_copied(&self) -> usize {
        self.asset_mapping.len()
    }

    /// Convert a single note into `output_dir`.
    ///
    /// `relative` is the note's path relative to the walked input root, used
    /// when mirroring directory structure; `vault_root` anchors asset
    /// resolution (defaults to the note's own directory); `extra_tags` are
    /// appended to the note's tag set before the filename is derived.
    pub fn convert_file(
        &mut self,
        input: &Path,
        output_dir: &Path,
        relative: Option<&Path>,
        preserve_structure: bool,
        vault_root: Option<&Path>,
        extra_tags: &[String],
    ) -> Result<ConvertedNote> {
        let content = fs::read_to_string(input).map_err(|e| ConvertError::Read {
            path: input.to_path_buf(),
            source: e,
        })?;
        let (metadata, body) = frontmatter::extract(&content);

        let note_dir = input.parent().unwrap_or_else(|| Path::new("."));
        let vault_root = vault_root.unwrap_or(note_dir);

        // Assets first: the rewritten references are what the rendered body
        // and the inline tag scan see.
        let ctx = AssetContext {
            note_dir,
            vault_root,
            output_dir,
            assets_dir: &self.options.assets_dir,
            format: self.options.format,
            handling: self.options.assets,
        };
        let body = assets::process(body, &ctx, &mut self.asset_mapping)?;

        let name = denote::derive(input, &metadata, &body, extra_tags, self.options.format.extension());
        // Recorded before rendering so a note's links to itself resolve.
        self.file_mapping.insert(input.to_path_buf(), name.filename.clone());

        let rendered = match self.options.format {
            OutputFormat::Org => writer::render_org(
                &body,
                &metadata,
                &name.title,
                &name.tags,
                name.timestamp,
                &self.file_mapping,
            ),
            OutputFormat::Markdown => writer::render_markdown(
                &body,
                &name.title,
                &name.tags,
                name.timestamp,
                &self.file_mapping,
                self.options.preserve_links,
            ),
        };

        let target_dir = match relative.and_then(|r| r.parent()) {
            Some(parent) if preserve_structure && !parent.as_os_str().is_empty() => {
                output_dir.join(parent)
            }
            _ => output_dir.to_path_buf(),
        };
        fs::create_dir_all(&target_dir).map_err(|e| ConvertError::CreateDir {
            path: target_dir.clone(),
            source: e,
        })?;

        let output_path = target_dir.join(&name.filename);
        fs::write(&output_path, &rendered).map_err(|e| ConvertError::Write {
            path: output_path.clone(),
            source: e,
        })?;
        debug!("converted {} -> {}", input.display(), output_path.display());

        Ok(ConvertedNote {
            denote_filename: name.filename,
            output_path,
            title: name.title,
            tags: name.tags,
        })
    }
}
