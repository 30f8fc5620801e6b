//! HTML reference patterns: `<script src>`, `<link href>` and `<img src>`.
//!
//! A regular `\b` treats `-` as a boundary, which would make `data-src` look like `src`. The
//! patterns below spell the boundary out as `[^-a-zA-Z0-9_]` instead. Unicode mode is off so
//! attribute values in legacy encodings still match byte for byte.

use std::sync::OnceLock;

use regex::bytes::Regex;

use super::rewrite::{UrlCallback, replace_urls};
use crate::error::TraversalResult;

struct HtmlPatterns {
  script: Regex,
  link: Regex,
  image: Regex,
}

fn html_patterns() -> &'static HtmlPatterns {
  static PATTERNS: OnceLock<HtmlPatterns> = OnceLock::new();
  PATTERNS.get_or_init(|| HtmlPatterns {
    script: Regex::new(
      r#"(?i-u)<script[^>]*?[^-a-zA-Z0-9_]src\s*=\s*["'](?P<url>[^"']+?)["'][^>]*?>(?s:.)*?</script>"#,
    )
    .expect("invalid script regex"),
    link: Regex::new(r#"(?i-u)<link[^>]*?[^-a-zA-Z0-9_]href\s*=\s*["'](?P<url>[^"']+?)["'][^>]*?/?>"#)
      .expect("invalid link regex"),
    image: Regex::new(r#"(?i-u)<img[^>]*?[^-a-zA-Z0-9_]src\s*=\s*["'](?P<url>[^"']+?)["'][^>]*?/?>"#)
      .expect("invalid image regex"),
  })
}

/// Apply the script, link and image passes in sequence.
pub fn replace_html_urls(content: &[u8], replace: &mut UrlCallback<'_>) -> TraversalResult<Vec<u8>> {
  let patterns = html_patterns();
  let text = replace_urls(&patterns.script, "script", content, replace)?;
  let text = replace_urls(&patterns.link, "link", &text, replace)?;
  replace_urls(&patterns.image, "image", &text, replace)
}
