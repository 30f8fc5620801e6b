//! Verbatim byte copies into the destination tree.

use std::path::Path;

use crate::error::{TraversalError, TraversalResult};
use crate::fs::FileSystem;

/// Copy `src` to `dst`, creating the destination directories on demand.
pub fn copy_file<F: FileSystem + ?Sized>(fs: &F, src: &Path, dst: &Path) -> TraversalResult<()> {
  ensure_parent_dir(fs, dst)?;
  tracing::info!("Copying {} -> {}", src.display(), dst.display());
  fs.copy(src, dst).map_err(|source| TraversalError::Copy {
    src: src.to_path_buf(),
    dst: dst.to_path_buf(),
    source,
  })
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> TraversalResult<()> {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => {
      fs.create_dir_all(parent)
        .map_err(|source| TraversalError::CreateDir {
          path: parent.to_path_buf(),
          source,
        })
    }
    _ => Ok(()),
  }
}
