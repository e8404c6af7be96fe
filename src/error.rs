use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the pipeline before any work is done.
///
/// Everything below this level (one file, one manifest, one generated
/// artifact) is absorbed and surfaces as an error/warning string instead.
#[derive(Error, Debug)]
pub enum LiberatorError {
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LiberatorError>;
