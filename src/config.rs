//! Task file describing named copy targets.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Deserialize;

use crate::asset_paths::SchemelessUrlFix;
use crate::builder::{BuildResult, BundleOptions, FileGroup};
use crate::selection::{ReferenceFilter, UrlBlacklist};

/// File name searched for when no task file is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "htmlcpr.config.json";

/// Parsed task file: a set of named targets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
  /// Targets keyed by name, iterated in name order.
  pub targets: BTreeMap<String, TargetConfig>,
}

/// One named target: shared options and the file groups they apply to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
  /// Options applied to every group of the target.
  pub options: TargetOptions,
  /// File groups to copy.
  pub files: Vec<FileGroup>,
}

/// Options as written in the task file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetOptions {
  /// Source root overriding each group's `cwd`.
  pub root_dir: Option<PathBuf>,
  /// Root-relative directory copied verbatim.
  pub norec_dir: Option<String>,
  /// Scheme prefixed to protocol-relative references, e.g. `https`.
  pub schemeless_url_fix: Option<String>,
  /// Blacklist file, relative to the task file.
  pub blacklist: Option<PathBuf>,
}

impl TaskConfig {
  /// Look for the default task file in `dir`.
  pub fn discover(dir: &Path) -> BuildResult<Option<(PathBuf, Self)>> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.is_file() {
      return Ok(None);
    }
    let config = Self::from_path(&candidate)?;
    Ok(Some((candidate, config)))
  }

  /// Read a task file.
  pub fn from_path(path: &Path) -> BuildResult<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read task file {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse task file {}", path.display()))
  }

  /// Pick targets by name, or every target when `names` is empty.
  pub fn select<'a>(&'a self, names: &[String]) -> BuildResult<Vec<(&'a str, &'a TargetConfig)>> {
    if names.is_empty() {
      return Ok(
        self
          .targets
          .iter()
          .map(|(name, target)| (name.as_str(), target))
          .collect(),
      );
    }

    names
      .iter()
      .map(|name| {
        self
          .targets
          .get_key_value(name)
          .map(|(name, target)| (name.as_str(), target))
          .ok_or_else(|| anyhow!("unknown target \"{name}\""))
      })
      .collect()
  }
}

impl TargetOptions {
  /// Convert into runtime options, loading the blacklist relative to `config_dir`.
  pub fn to_bundle_options(&self, config_dir: &Path) -> BuildResult<BundleOptions> {
    let blacklist = match &self.blacklist {
      Some(path) => {
        let rules = UrlBlacklist::load_from_path(config_dir.join(path))?;
        Some(Box::new(rules) as Box<dyn ReferenceFilter>)
      }
      None => None,
    };

    Ok(BundleOptions {
      root_dir: self.root_dir.clone(),
      norec_dir: self.norec_dir.clone(),
      schemeless_url_fix: self
        .schemeless_url_fix
        .as_deref()
        .map(SchemelessUrlFix::from_scheme),
      blacklist,
    })
  }
}
