//! Conversion error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while converting a single note.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy asset {} to {}: {source}", from.display(), to.display())]
    CopyAsset {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Conversion result type.
pub type Result<T> = std::result::Result<T, ConvertError>;
