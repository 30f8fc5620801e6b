//! Document rewriting and file copying for the destination tree.

pub mod copy;
pub mod css;
pub mod html;
pub mod rewrite;

pub use copy::copy_file;
pub use rewrite::{DocumentRewriter, RegexRewriter, UrlCallback};
