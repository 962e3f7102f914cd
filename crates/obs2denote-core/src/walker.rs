//! Batch conversion over a note tree.

use std::path::{Component, Path, PathBuf};

use log::{error, info};
use walkdir::{DirEntry, WalkDir};

use crate::converter::{ConvertedNote, Converter};
use crate::error::ConvertError;
use crate::slug::slugify;

/// Options for a directory walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Mirror the input's relative directory layout instead of flattening.
    pub preserve_structure: bool,
    /// Append slugified folder-path components as tags.
    pub add_folder_tags: bool,
}

/// Outcome of converting one file during a walk.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<ConvertedNote, ConvertError>,
}

/// Per-file outcomes of one batch conversion.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> impl Iterator<Item = &ConvertedNote> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ConvertError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.input.as_path(), e)))
    }

    pub fn converted_count(&self) -> usize {
        self.converted().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Convert every markdown file under `input_dir` into `output_dir`.
///
/// A failing file is recorded in the report and logged, never fatal to the
/// batch. Files are visited in path order, so a note's links can only
/// resolve to notes that sorted before it — the single-pass resolution
/// model, made reproducible.
pub fn convert_directory(
    converter: &mut Converter,
    input_dir: &Path,
    output_dir: &Path,
    options: WalkOptions,
) -> BatchReport {
    let files = collect_note_files(input_dir);
    info!("found {} markdown files under {}", files.len(), input_dir.display());

    let mut report = BatchReport::default();
    for file in files {
        let relative = file.strip_prefix(input_dir).unwrap_or(&file).to_path_buf();

        let mut extra_tags = Vec::new();
        if options.add_folder_tags
            && let Some(parent) = relative.parent()
        {
            for component in parent.components() {
                if let Component::Normal(name) = component {
                    extra_tags.push(slugify(&name.to_string_lossy()));
                }
            }
        }

        let result = converter.convert_file(
            &file,
            output_dir,
            Some(&relative),
            options.preserve_structure,
            Some(input_dir),
            &extra_tags,
        );
        match &result {
            Ok(note) => info!("converted {} -> {}", relative.display(), note.denote_filename),
            Err(e) => error!("error converting {}: {e}", file.display()),
        }
        report.outcomes.push(FileOutcome { input: file, result });
    }
    report
}

/// Recursively collect `.md`/`.markdown` files, skipping the `.obsidian`
/// marker folder and hidden entries, sorted for a reproducible order.
fn collect_note_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
        })
        .collect();
    files.sort();
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
