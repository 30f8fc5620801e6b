use std::sync::OnceLock;

use regex::Regex;

use super::url_parts::strip_query_and_fragment;

fn remote_url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)^([a-z][a-z0-9+.\-]*:)?//").expect("invalid remote url regex"))
}

fn data_uri_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  // data:[<media type>][;charset=<character set>][;base64],<data>
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)^data:[\w/+\-.]+;(charset=[\w\-]+|base64).*,").expect("invalid data URI regex")
  })
}

/// Returns `true` for URLs carrying an explicit scheme followed by `//`, or starting with `//`.
///
/// Remote references are never copied or rewritten.
pub fn is_remote_url(url: &str) -> bool {
  remote_url_pattern().is_match(url)
}

/// Returns `true` for protocol-relative URLs such as `//cdn.example.com/lib.js`.
pub fn is_scheme_less(url: &str) -> bool {
  url.starts_with("//")
}

/// Returns `true` when the value follows the `data:<mediatype>;<encoding>,<data>` grammar.
pub fn is_data_uri(url: &str) -> bool {
  data_uri_pattern().is_match(url)
}

/// Returns `true` when nothing resolvable is left once query and fragment are removed, as in
/// `#blur` or `?v=2`.
pub fn is_empty_url(url: &str) -> bool {
  strip_query_and_fragment(url).is_empty()
}
