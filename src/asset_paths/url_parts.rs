/// Remove everything from the first `?` or `#` onward.
pub fn strip_query_and_fragment(url: &str) -> &str {
  split_query_and_fragment(url).0
}

/// Split a reference into the filesystem-resolvable path and its query/fragment suffix.
///
/// The suffix keeps its leading `?` or `#` so it can be appended verbatim to a rewritten path.
pub fn split_query_and_fragment(url: &str) -> (&str, &str) {
  match url.find(['?', '#']) {
    Some(index) => url.split_at(index),
    None => (url, ""),
  }
}
