//! Data structures produced while vendoring a document tree.

use std::path::PathBuf;

/// Kind of text document rewritten by the traverser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
  /// `.html` / `.htm` document.
  Html,
  /// `.css` stylesheet.
  Css,
}

impl DocumentKind {
  /// Classify a path by its extension, ignoring ASCII case.
  pub fn from_path(path: &std::path::Path) -> Option<Self> {
    let extension = path.extension()?.to_str()?;
    if extension.eq_ignore_ascii_case("html") || extension.eq_ignore_ascii_case("htm") {
      Some(Self::Html)
    } else if extension.eq_ignore_ascii_case("css") {
      Some(Self::Css)
    } else {
      None
    }
  }
}

/// What happened to one file reaching the destination tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileActionKind {
  /// Text document whose references were rewritten.
  Rewritten(DocumentKind),
  /// Non-document file copied byte for byte.
  Copied,
  /// File inside the no-recurse zone copied without looking at its content.
  CopiedVerbatim,
}

/// Record of a single file written to the destination tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAction {
  /// Source path.
  pub src: PathBuf,
  /// Destination path.
  pub dst: PathBuf,
  /// How the destination was produced.
  pub kind: FileActionKind,
}

/// Decision taken for one reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOutcome {
  /// Local reference resolved, processed and replaced by the new relative path.
  Rewritten(String),
  /// Local reference whose target was already handled earlier in this traversal.
  Revisited(String),
  /// Remote reference kept unchanged, possibly after the scheme-less fix.
  Remote(String),
  /// Data URI kept unchanged.
  DataUri,
  /// Reference dropped by the blacklist.
  Blacklisted,
  /// Reference with nothing left to resolve once query and fragment are removed.
  Empty,
}

impl ReferenceOutcome {
  /// Text that replaces the original reference inside the document.
  pub fn replacement<'a>(&'a self, original: &'a str) -> &'a str {
    match self {
      Self::Rewritten(url) | Self::Revisited(url) | Self::Remote(url) => url,
      Self::DataUri | Self::Empty => original,
      Self::Blacklisted => "",
    }
  }
}

/// Per-reference counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceCounts {
  /// Local references followed and rewritten.
  pub rewritten: usize,
  /// Local references, followed or revisited, whose new text equals the original.
  pub unchanged: usize,
  /// Local references pointing at an already processed file.
  pub revisited: usize,
  /// Remote references left in place.
  pub remote: usize,
  /// Data URIs left in place.
  pub data_uri: usize,
  /// References dropped by the blacklist.
  pub blacklisted: usize,
  /// References without a resolvable path.
  pub empty: usize,
}

/// Summary of everything a traversal wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
  /// Files written, in processing order.
  pub files: Vec<FileAction>,
  /// Counters over every reference visited.
  pub references: ReferenceCounts,
}

impl TraversalReport {
  /// Record a file written to the destination tree.
  pub fn record_file(&mut self, src: PathBuf, dst: PathBuf, kind: FileActionKind) {
    self.files.push(FileAction { src, dst, kind });
  }

  /// Count the outcome of the reference `original`.
  pub fn record_reference(&mut self, outcome: &ReferenceOutcome, original: &str) {
    let counts = &mut self.references;
    if let ReferenceOutcome::Rewritten(url) | ReferenceOutcome::Revisited(url) = outcome {
      if url == original {
        counts.unchanged += 1;
      }
    }
    match outcome {
      ReferenceOutcome::Rewritten(_) => counts.rewritten += 1,
      ReferenceOutcome::Revisited(_) => counts.revisited += 1,
      ReferenceOutcome::Remote(_) => counts.remote += 1,
      ReferenceOutcome::DataUri => counts.data_uri += 1,
      ReferenceOutcome::Blacklisted => counts.blacklisted += 1,
      ReferenceOutcome::Empty => counts.empty += 1,
    }
  }

  /// Fold another report into this one.
  pub fn merge(&mut self, other: TraversalReport) {
    self.files.extend(other.files);
    let counts = &mut self.references;
    counts.rewritten += other.references.rewritten;
    counts.unchanged += other.references.unchanged;
    counts.revisited += other.references.revisited;
    counts.remote += other.references.remote;
    counts.data_uri += other.references.data_uri;
    counts.blacklisted += other.references.blacklisted;
    counts.empty += other.references.empty;
  }

  /// Number of files written to the destination tree.
  pub fn file_count(&self) -> usize {
    self.files.len()
  }
}
