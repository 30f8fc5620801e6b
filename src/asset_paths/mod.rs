//! Pure helpers for classifying references and computing paths between roots.
//!
//! Nothing in this module touches the filesystem. Classification is recomputed for every
//! reference so the traverser never has to cache anything about a URL.

mod filters;
mod resolve;
mod scheme;
mod url_parts;

pub use filters::{is_data_uri, is_empty_url, is_remote_url, is_scheme_less};
pub use resolve::{absolutize, escapes_base, relative_path, resolve_against_roots, to_url_path};
pub use scheme::SchemelessUrlFix;
pub use url_parts::{split_query_and_fragment, strip_query_and_fragment};
