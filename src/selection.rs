//! Blacklist rules deciding which references are dropped instead of followed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::asset_paths::strip_query_and_fragment;

/// Decides whether a reference should be dropped from the copied document.
pub trait ReferenceFilter {
  /// Returns `true` when `url`, found in the document at `src_from_root`, must be dropped.
  fn is_blacklisted(&self, url: &str, src_from_root: &str) -> bool;
}

impl<F> ReferenceFilter for F
where
  F: Fn(&str, &str) -> bool,
{
  fn is_blacklisted(&self, url: &str, src_from_root: &str) -> bool {
    self(url, src_from_root)
  }
}

/// Blacklist file layout.
#[derive(Debug, Default, Deserialize)]
struct BlacklistFile {
  #[serde(default)]
  exclude: Vec<String>,
  #[serde(default)]
  patterns: Vec<String>,
  #[serde(default)]
  sources: Vec<String>,
}

/// Declarative blacklist loaded from JSON.
///
/// `exclude` entries match a reference path exactly or as a parent directory scope, `patterns`
/// are regular expressions tested against the raw reference, and `sources` limits the whole
/// blacklist to documents living under the listed root-relative scopes.
#[derive(Debug, Clone, Default)]
pub struct UrlBlacklist {
  exclude: BTreeSet<String>,
  patterns: Vec<Regex>,
  sources: BTreeSet<String>,
}

/// Errors that can occur while loading a blacklist file.
#[derive(Debug)]
pub enum ReferenceBlacklistError {
  /// Failed to read the blacklist file from disk.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON blacklist file.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// A pattern entry is not a valid regular expression.
  Pattern {
    /// Offending pattern.
    pattern: String,
    /// Source regex error.
    source: regex::Error,
  },
}

impl UrlBlacklist {
  /// Load rules from the blacklist file if present; a missing file blacklists nothing.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ReferenceBlacklistError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(ReferenceBlacklistError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let file: BlacklistFile =
      serde_json::from_str(&contents).map_err(|err| ReferenceBlacklistError::Parse {
        path: path.to_path_buf(),
        source: err,
      })?;
    Self::try_from(file)
  }

  /// Returns true when no rule is configured.
  pub fn is_empty(&self) -> bool {
    self.exclude.is_empty() && self.patterns.is_empty()
  }

  fn applies_to_source(&self, src_from_root: &str) -> bool {
    self.sources.is_empty()
      || self
        .sources
        .iter()
        .any(|scope| scope_matches(scope, src_from_root))
  }
}

impl ReferenceFilter for UrlBlacklist {
  fn is_blacklisted(&self, url: &str, src_from_root: &str) -> bool {
    if !self.applies_to_source(src_from_root) {
      return false;
    }

    let candidate = normalise_reference(url);
    if self
      .exclude
      .iter()
      .any(|rule| scope_matches(rule, candidate))
    {
      return true;
    }

    self.patterns.iter().any(|pattern| pattern.is_match(url))
  }
}

impl TryFrom<BlacklistFile> for UrlBlacklist {
  type Error = ReferenceBlacklistError;

  fn try_from(file: BlacklistFile) -> Result<Self, Self::Error> {
    let patterns = file
      .patterns
      .into_iter()
      .filter(|pattern| !pattern.trim().is_empty())
      .map(|pattern| {
        Regex::new(&pattern).map_err(|source| ReferenceBlacklistError::Pattern { pattern, source })
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      exclude: normalise_list(file.exclude),
      patterns,
      sources: normalise_list(file.sources),
    })
  }
}

impl std::fmt::Display for ReferenceBlacklistError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io { path, source } => {
        write!(f, "failed to read {}: {}", path.display(), source)
      }
      Self::Parse { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
      Self::Pattern { pattern, source } => {
        write!(f, "invalid blacklist pattern {pattern:?}: {source}")
      }
    }
  }
}

impl std::error::Error for ReferenceBlacklistError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
      Self::Pattern { source, .. } => Some(source),
    }
  }
}

/// Convert raw entries into a sorted, de-duplicated set of slash-trimmed scopes.
fn normalise_list(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().trim_matches('/').to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

fn normalise_reference(url: &str) -> &str {
  let mut candidate = strip_query_and_fragment(url.trim());
  while let Some(rest) = candidate.strip_prefix("./") {
    candidate = rest;
  }
  candidate.trim_start_matches('/')
}

fn scope_matches(rule: &str, candidate: &str) -> bool {
  if candidate == rule {
    return true;
  }

  candidate
    .strip_prefix(rule)
    .is_some_and(|suffix| suffix.starts_with('/'))
}
