#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod logging;
pub mod models;
pub mod project;
pub mod selection;
pub mod traverser;

pub use builder::{BuildResult, BundleOptions, Bundler, FileGroup};
pub use error::{TraversalError, TraversalResult};
pub use project::RootContext;
pub use selection::{ReferenceFilter, UrlBlacklist};
pub use traverser::LinkTraverser;
