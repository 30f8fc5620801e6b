//! Immutable root context shared by every step of one traversal.

use std::path::{Path, PathBuf};

use crate::asset_paths::{absolutize, relative_path, to_url_path};

/// Prefix used when no no-recurse directory is configured. After the containment check no
/// source path can start with it, so nothing is treated as no-recurse by default.
pub const DEFAULT_NOREC_PREFIX: &str = "../";

/// Source and destination roots for one file group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootContext {
  base_dir: PathBuf,
  root_dir: PathBuf,
  dst_dir: PathBuf,
  norec_prefix: String,
}

impl RootContext {
  /// Build a context, resolving relative directories against `base`.
  ///
  /// `norec_dir` is a root-relative directory whose files are copied verbatim. It is normalised
  /// to forward slashes with a trailing separator so the no-recurse test is a plain prefix check.
  pub fn new(base: &Path, root_dir: &Path, dst_dir: &Path, norec_dir: Option<&str>) -> Self {
    let mut norec_prefix = norec_dir
      .map(|dir| dir.replace('\\', "/").trim_start_matches("./").to_string())
      .filter(|dir| !dir.is_empty())
      .unwrap_or_else(|| DEFAULT_NOREC_PREFIX.to_string());
    if !norec_prefix.ends_with('/') {
      norec_prefix.push('/');
    }

    let base_dir = path_clean::clean(base);
    Self {
      root_dir: absolutize(&base_dir, root_dir),
      dst_dir: absolutize(&base_dir, dst_dir),
      base_dir,
      norec_prefix,
    }
  }

  /// Resolve a caller-supplied path against the base directory.
  pub fn absolutize(&self, path: &Path) -> PathBuf {
    absolutize(&self.base_dir, path)
  }

  /// Absolute source root.
  pub fn root_dir(&self) -> &Path {
    &self.root_dir
  }

  /// Absolute destination root.
  pub fn dst_dir(&self) -> &Path {
    &self.dst_dir
  }

  /// Root-relative no-recurse prefix, always ending with `/`.
  pub fn norec_prefix(&self) -> &str {
    &self.norec_prefix
  }

  /// `path` expressed relative to the source root.
  pub fn relative_to_root(&self, path: &Path) -> PathBuf {
    relative_path(&self.root_dir, path)
  }

  /// Mirror a source path into the same relative position under the destination root.
  pub fn mirror_destination(&self, src: &Path) -> PathBuf {
    let mirrored = self.dst_dir.join(self.relative_to_root(src));
    path_clean::clean(mirrored)
  }

  /// Whether the source path falls inside the no-recurse zone.
  pub fn is_norec_path(&self, src: &Path) -> bool {
    to_url_path(&self.relative_to_root(src)).starts_with(&self.norec_prefix)
  }
}
