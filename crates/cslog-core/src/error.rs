//! Error types for the merge pipeline.

use std::io;
use std::path::PathBuf;

/// Errors produced while classifying, parsing, or merging consensus logs.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A log file or merged output file could not be opened, read, or written.
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log file held no usable consensus lines.
    #[error("no consensus records in {}", .path.display())]
    EmptyResult { path: PathBuf },

    /// A consensus line lacked the fields needed for extraction.
    #[error("malformed consensus line {line}{}: {reason}", location(.path))]
    MalformedLogLine {
        /// Source file, absent for in-memory input.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        reason: String,
    },

    /// The base directory of the root pattern does not exist.
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" in {}", p.display()),
        None => String::new(),
    }
}

impl MergeError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Attach a source path to an error raised on in-memory input.
    pub(crate) fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Self::MalformedLogLine {
                path: None,
                line,
                reason,
            } => Self::MalformedLogLine {
                path: Some(file.into()),
                line,
                reason,
            },
            Self::EmptyResult { path } if path.as_os_str().is_empty() => Self::EmptyResult {
                path: file.into(),
            },
            other => other,
        }
    }
}

/// Convenience alias used throughout the core crate.
pub type MergeResult<T> = std::result::Result<T, MergeError>;
