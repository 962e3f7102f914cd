//! obs2denote-core: Core library for converting Obsidian vaults to Denote notes
//!
//! This crate provides:
//! - YAML front matter extraction
//! - Denote slug and filename derivation
//! - Wiki-link rewriting against a per-run file mapping
//! - Asset resolution, copying, and reference rewriting
//! - org-mode and markdown rendering
//! - A per-note converter and a batch directory walker

pub mod assets;
pub mod converter;
pub mod denote;
pub mod error;
pub mod frontmatter;
pub mod links;
pub mod slug;
pub mod walker;
pub mod writer;

pub use assets::AssetHandling;
pub use converter::{ConvertedNote, Converter, ConverterOptions};
pub use denote::DenoteName;
pub use error::ConvertError;
pub use frontmatter::NoteMetadata;
pub use slug::slugify;
pub use walker::{BatchReport, FileOutcome, WalkOptions, convert_directory};
pub use writer::OutputFormat;
