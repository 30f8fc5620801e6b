//! Errors that abort a traversal.

use std::io;
use std::path::PathBuf;

/// Fatal traversal failure. The first one raised terminates the whole run.
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
  /// A source path resolved outside the configured root directory.
  #[error("cannot copy external path {path}: it lies outside root {root}")]
  ExternalPath {
    /// Offending source path.
    path: PathBuf,
    /// Root directory the path had to stay within.
    root: PathBuf,
  },

  /// Reading a document failed.
  #[error("failed to read {path}")]
  Read {
    /// Path that could not be read.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },

  /// Writing a rewritten document failed.
  #[error("failed to write {path}")]
  Write {
    /// Path that could not be written.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },

  /// Creating a destination directory failed.
  #[error("failed to create directory {path}")]
  CreateDir {
    /// Directory that could not be created.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },

  /// Copying a file verbatim failed.
  #[error("failed to copy {src} to {dst}")]
  Copy {
    /// Source file.
    src: PathBuf,
    /// Destination file.
    dst: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
}

/// Result alias used by the traversal engine.
pub type TraversalResult<T> = Result<T, TraversalError>;
