//! Command-line interface.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};

use crate::asset_paths::SchemelessUrlFix;
use crate::builder::{BuildResult, BundleOptions, Bundler, FileGroup};
use crate::config::{DEFAULT_CONFIG_FILE, TaskConfig};
use crate::fs::OsFileSystem;
use crate::logging;
use crate::models::TraversalReport;
use crate::selection::{ReferenceFilter, UrlBlacklist};

/// Copy HTML/CSS documents and every resource they reference into a destination tree.
#[derive(Debug, Parser)]
#[command(name = "htmlcpr", version, about)]
pub struct Cli {
  /// Entry documents to copy.
  pub entries: Vec<PathBuf>,

  /// Destination directory (required with entries).
  #[arg(short, long)]
  pub dest: Option<PathBuf>,

  /// Source root; no file outside it may be copied. Defaults to --cwd, then the current directory.
  #[arg(long)]
  pub root_dir: Option<PathBuf>,

  /// Directory the entries are listed relative to.
  #[arg(long)]
  pub cwd: Option<PathBuf>,

  /// Root-relative directory whose files are copied without rewriting.
  #[arg(long)]
  pub norec_dir: Option<String>,

  /// Scheme given to protocol-relative references, e.g. `https`.
  #[arg(long, value_name = "SCHEME")]
  pub schemeless_url_fix: Option<String>,

  /// JSON blacklist of references to drop.
  #[arg(long, value_name = "FILE")]
  pub blacklist: Option<PathBuf>,

  /// Task file with named targets (defaults to ./htmlcpr.config.json when no entries are given).
  #[arg(short, long, conflicts_with = "entries")]
  pub config: Option<PathBuf>,

  /// Targets of the task file to run; all when omitted.
  #[arg(short, long = "target", value_name = "NAME")]
  pub targets: Vec<String>,

  /// Increase log verbosity (-v debug, -vv trace).
  #[arg(short, long, action = ArgAction::Count)]
  pub verbose: u8,

  /// Only log warnings and errors.
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,
}

/// Parse arguments, set up logging and run.
pub fn run_from_args() -> BuildResult<()> {
  let cli = Cli::parse();
  logging::init_logging(logging::directive_for(cli.verbose, cli.quiet))?;
  let base_dir = std::env::current_dir().context("failed to determine current directory")?;
  let report = cli.run(&base_dir)?;
  tracing::info!(
    "Done: {} files written, {} references rewritten ({} unchanged), {} revisited, {} remote, {} data URIs, {} blacklisted, {} empty",
    report.file_count(),
    report.references.rewritten,
    report.references.unchanged,
    report.references.revisited,
    report.references.remote,
    report.references.data_uri,
    report.references.blacklisted,
    report.references.empty
  );
  Ok(())
}

impl Cli {
  /// Execute with relative paths resolved against `base_dir`.
  pub fn run(&self, base_dir: &Path) -> BuildResult<TraversalReport> {
    if !self.entries.is_empty() {
      return self.run_entries(base_dir);
    }

    let (config_path, config) = match &self.config {
      Some(path) => {
        let path = base_dir.join(path);
        let config = TaskConfig::from_path(&path)?;
        (path, config)
      }
      None => match TaskConfig::discover(base_dir)? {
        Some(found) => found,
        None => bail!("no entries given and no {DEFAULT_CONFIG_FILE} found"),
      },
    };
    let config_dir = config_path.parent().unwrap_or(base_dir);

    let mut report = TraversalReport::default();
    for (name, target) in config.select(&self.targets)? {
      tracing::info!("Running target {name}");
      let options = target.options.to_bundle_options(config_dir)?;
      let bundler = Bundler::new(config_dir, options, &OsFileSystem);
      let target_report = bundler
        .run(&target.files)
        .with_context(|| format!("target \"{name}\" failed"))?;
      report.merge(target_report);
    }
    Ok(report)
  }

  fn run_entries(&self, base_dir: &Path) -> BuildResult<TraversalReport> {
    let Some(dest) = &self.dest else {
      bail!("--dest is required when entries are given");
    };

    let group = FileGroup {
      cwd: self.cwd.clone(),
      dest: dest.clone(),
      src: self.entries.clone(),
    };
    let bundler = Bundler::new(base_dir, self.bundle_options(base_dir)?, &OsFileSystem);
    bundler.run(std::slice::from_ref(&group))
  }

  fn bundle_options(&self, base_dir: &Path) -> BuildResult<BundleOptions> {
    let blacklist = match &self.blacklist {
      Some(path) => {
        let rules = UrlBlacklist::load_from_path(base_dir.join(path))?;
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
