//! obs2denote: CLI tool to convert Obsidian vaults to Denote notes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use obs2denote_core::{
    AssetHandling, Converter, ConverterOptions, OutputFormat, WalkOptions, convert_directory,
};

mod config;
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "obs2denote")]
#[command(about = "Convert Obsidian markdown notes to the Denote convention")]
#[command(version)]
#[command(after_help = "Examples:
  obs2denote vault/ notes/                  # Convert a vault to org files
  obs2denote vault/ notes/ -f md            # Convert to Denote-named markdown
  obs2denote note.md notes/                 # Convert a single note
  obs2denote vault/ notes/ --add-folder-tags --assets link")]
struct Cli {
    /// Input markdown file or vault directory
    input: PathBuf,

    /// Output directory for Denote files
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Preserve wiki-style links in markdown output
    #[arg(long)]
    preserve_links: bool,

    /// Preserve directory structure (default: flatten, per Denote convention)
    #[arg(long)]
    preserve_structure: bool,

    /// Add folder names as tags to keep context when flattening
    #[arg(long)]
    add_folder_tags: bool,

    /// How to handle referenced assets
    #[arg(long, value_enum)]
    assets: Option<AssetsArg>,

    /// Directory name for copied assets
    #[arg(long)]
    assets_dir: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// org-mode output
    Org,
    /// markdown output
    Md,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Org => OutputFormat::Org,
            FormatArg::Md => OutputFormat::Markdown,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AssetsArg {
    /// Copy assets into the output assets directory
    Copy,
    /// Keep references pointing at the original paths
    Link,
    /// Don't process assets at all
    Ignore,
}

impl From<AssetsArg> for AssetHandling {
    fn from(value: AssetsArg) -> Self {
        match value {
            AssetsArg::Copy => AssetHandling::Copy,
            AssetsArg::Link => AssetHandling::Link,
            AssetsArg::Ignore => AssetHandling::Ignore,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = load_config(&cli.input)?.unwrap_or_default();
    let (options, walk_options) = resolve_options(&cli, &config)?;

    let assets_handling = options.assets;
    let assets_dir = options.assets_dir.clone();
    let mut converter = Converter::new(options);

    if cli.input.is_file() {
        fs::create_dir_all(&cli.output)
            .with_context(|| format!("Failed to create directory: {}", cli.output.display()))?;

        let note = converter
            .convert_file(&cli.input, &cli.output, None, false, None, &[])
            .with_context(|| format!("Failed to convert: {}", cli.input.display()))?;

        if !cli.quiet {
            println!("Converted: {} -> {}", cli.input.display(), note.denote_filename);
        }
    } else if cli.input.is_dir() {
        let report = convert_directory(&mut converter, &cli.input, &cli.output, walk_options);

        if !cli.quiet {
            println!(
                "\nConverted {} files, {} failed",
                report.converted_count(),
                report.failed_count()
            );
            if assets_handling == AssetHandling::Copy && converter.assets_copied() > 0 {
                println!("Copied {} assets to {}/", converter.assets_copied(), assets_dir);
            }
            if walk_options.preserve_structure {
                println!("Directory structure preserved in output");
            } else if walk_options.add_folder_tags {
                println!("Flattened structure with folder names added as tags");
            } else {
                println!("Flattened to single directory (Denote default)");
            }
        }
    } else {
        anyhow::bail!("Input path is neither a file nor a directory: {}", cli.input.display());
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// Look for `_obs2denote.toml` next to the input.
fn load_config(input: &Path) -> Result<Option<Config>> {
    let dir = if input.is_dir() {
        input.to_path_buf()
    } else {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    };
    Config::load_from_dir(&dir)
}

/// Merge CLI flags over config-file defaults. Explicit flags always win.
fn resolve_options(cli: &Cli, config: &Config) -> Result<(ConverterOptions, WalkOptions)> {
    let format = match cli.format {
        Some(format) => format.into(),
        None => match config.output.format.as_deref() {
            None | Some("org") => OutputFormat::Org,
            Some("md") => OutputFormat::Markdown,
            Some(other) => anyhow::bail!("Unknown output format in config: {other}"),
        },
    };

    let assets = match cli.assets {
        Some(assets) => assets.into(),
        None => match config.assets.handling.as_deref() {
            None | Some("copy") => AssetHandling::Copy,
            Some("link") => AssetHandling::Link,
            Some("ignore") => AssetHandling::Ignore,
            Some(other) => anyhow::bail!("Unknown asset handling in config: {other}"),
        },
    };

    let assets_dir = cli
        .assets_dir
        .clone()
        .or_else(|| config.assets.dir.clone())
        .unwrap_or_else(|| "assets".to_string());

    let options = ConverterOptions {
        format,
        preserve_links: cli.preserve_links || config.links.preserve.unwrap_or(false),
        assets,
        assets_dir,
    };
    let walk_options = WalkOptions {
        preserve_structure: cli.preserve_structure
            || config.walk.preserve_structure.unwrap_or(false),
        add_folder_tags: cli.add_folder_tags || config.walk.add_folder_tags.unwrap_or(false),
    };

    Ok((options, walk_options))
}
