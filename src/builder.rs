//! Runs file groups through the link traverser.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::asset_paths::SchemelessUrlFix;
use crate::fs::{FileSystem, OsFileSystem};
use crate::models::TraversalReport;
use crate::project::RootContext;
use crate::selection::ReferenceFilter;
use crate::traverser::LinkTraverser;

/// Generic build result type used across the crate.
pub type BuildResult<T> = anyhow::Result<T>;

/// One destination directory together with the entry documents copied into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
  /// Directory the entries are listed relative to. Also the default source root.
  #[serde(default)]
  pub cwd: Option<PathBuf>,
  /// Destination root.
  pub dest: PathBuf,
  /// Entry documents.
  #[serde(default)]
  pub src: Vec<PathBuf>,
}

impl FileGroup {
  /// Entries resolved against the group's `cwd`.
  pub fn entries(&self) -> impl Iterator<Item = PathBuf> + '_ {
    self.src.iter().map(|src| match &self.cwd {
      Some(cwd) => cwd.join(src),
      None => src.clone(),
    })
  }

  /// Source root for this group: the explicit root, else the group `cwd`, else the base dir.
  pub fn root_dir<'a>(&'a self, explicit: Option<&'a Path>) -> &'a Path {
    explicit
      .or(self.cwd.as_deref())
      .unwrap_or(Path::new(""))
  }
}

/// Options shared by every file group of a run.
#[derive(Default)]
pub struct BundleOptions {
  /// Source root overriding each group's `cwd`.
  pub root_dir: Option<PathBuf>,
  /// Root-relative directory copied verbatim.
  pub norec_dir: Option<String>,
  /// Rewrite for protocol-relative references.
  pub schemeless_url_fix: Option<SchemelessUrlFix>,
  /// References to drop instead of follow.
  pub blacklist: Option<Box<dyn ReferenceFilter>>,
}

impl std::fmt::Debug for BundleOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BundleOptions")
      .field("root_dir", &self.root_dir)
      .field("norec_dir", &self.norec_dir)
      .field("schemeless_url_fix", &self.schemeless_url_fix)
      .field("blacklist", &self.blacklist.as_ref().map(|_| ".."))
      .finish()
  }
}

/// High-level helper vendoring file groups into their destination trees.
pub struct Bundler<'a, F: FileSystem + ?Sized = OsFileSystem> {
  base_dir: PathBuf,
  options: BundleOptions,
  fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> Bundler<'a, F> {
  /// Create a bundler resolving relative paths against `base_dir`.
  pub fn new(base_dir: impl Into<PathBuf>, options: BundleOptions, fs: &'a F) -> Self {
    Self {
      base_dir: base_dir.into(),
      options,
      fs,
    }
  }

  /// Process every group in order; the first fatal error aborts the run.
  pub fn run(&self, groups: &[FileGroup]) -> BuildResult<TraversalReport> {
    let mut report = TraversalReport::default();
    for group in groups {
      report.merge(self.run_group(group)?);
    }
    Ok(report)
  }

  fn run_group(&self, group: &FileGroup) -> BuildResult<TraversalReport> {
    let context = RootContext::new(
      &self.base_dir,
      group.root_dir(self.options.root_dir.as_deref()),
      &group.dest,
      self.options.norec_dir.as_deref(),
    );

    self
      .fs
      .create_dir_all(context.dst_dir())
      .with_context(|| format!("failed to create {}", context.dst_dir().display()))?;

    tracing::debug!(
      "Copying into {} from root {}",
      context.dst_dir().display(),
      context.root_dir().display()
    );

    let mut traverser = LinkTraverser::new(context, self.fs);
    if let Some(blacklist) = self.options.blacklist.as_deref() {
      traverser =
        traverser.with_blacklist(move |url: &str, src: &str| blacklist.is_blacklisted(url, src));
    }
    if let Some(fix) = &self.options.schemeless_url_fix {
      traverser = traverser.with_schemeless_url_fix(fix.clone());
    }

    for entry in group.entries() {
      traverser
        .process_entry(&entry)
        .with_context(|| format!("failed to process {}", entry.display()))?;
    }

    Ok(traverser.into_report())
  }
}
