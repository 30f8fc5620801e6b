//! CSS `url(...)` pattern.

use std::sync::OnceLock;

use regex::bytes::Regex;

use super::rewrite::{UrlCallback, replace_urls};
use crate::error::TraversalResult;

fn css_url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i-u)(?:^|[^-a-zA-Z0-9_])url\(\s*['"]?(?P<url>[^)'"]*?)['"]?\s*\)"#)
      .expect("invalid css url regex")
  })
}

/// Rewrite every `url(...)` occurrence, quoted or not.
pub fn replace_css_urls(content: &[u8], replace: &mut UrlCallback<'_>) -> TraversalResult<Vec<u8>> {
  replace_urls(css_url_pattern(), "in-CSS", content, replace)
}
