//! Filesystem capability handed to the traverser.
//!
//! The traverser never touches `std::fs` directly; everything goes through [`FileSystem`] so
//! tests can substitute an in-memory tree.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use same_file::is_same_file;

/// File operations required to mirror a document tree.
pub trait FileSystem {
  /// Whether anything exists at `path`.
  fn exists(&self, path: &Path) -> bool;
  /// Whether `path` is an existing directory.
  fn is_dir(&self, path: &Path) -> bool;
  /// Read the raw bytes of a document. No text encoding is assumed.
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
  /// Write a document, replacing any previous content.
  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;
  /// Create `path` and all missing parents.
  fn create_dir_all(&self, path: &Path) -> io::Result<()>;
  /// Copy the bytes of `src` to `dst`.
  fn copy(&self, src: &Path, dst: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn is_dir(&self, path: &Path) -> bool {
    path.is_dir()
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    fs::write(path, content)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn copy(&self, src: &Path, dst: &Path) -> io::Result<()> {
    // fs::copy truncates the destination first, which would wipe a file copied onto itself.
    match is_same_file(src, dst) {
      Ok(true) => return Ok(()),
      Ok(false) => {}
      Err(err) if err.kind() == ErrorKind::NotFound => {}
      Err(err) => return Err(err),
    }
    fs::copy(src, dst).map(|_| ())
  }
}
