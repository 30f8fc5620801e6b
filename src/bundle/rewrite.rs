//! Pattern-driven substitution of URL-bearing spans.

use regex::bytes::Regex;

use crate::error::TraversalResult;
use crate::models::DocumentKind;

/// Callback mapping an old reference to its replacement.
pub type UrlCallback<'a> = dyn FnMut(&str) -> TraversalResult<String> + 'a;

/// Rewrites the references of a document without touching the surrounding markup.
///
/// Documents are handled as raw bytes: only the reference spans have to be UTF-8, so legacy
/// encodings in the rest of the file survive untouched. The traverser only talks to this trait,
/// so a stricter tokenizer can replace the regex implementation without changes to the
/// traversal logic.
pub trait DocumentRewriter {
  /// Rewrite `<script src>`, `<link href>` and `<img src>` references.
  fn rewrite_html(&self, content: &[u8], replace: &mut UrlCallback<'_>) -> TraversalResult<Vec<u8>>;

  /// Rewrite `url(...)` references.
  fn rewrite_css(&self, content: &[u8], replace: &mut UrlCallback<'_>) -> TraversalResult<Vec<u8>>;

  /// Dispatch on the document kind.
  fn rewrite(
    &self,
    kind: DocumentKind,
    content: &[u8],
    replace: &mut UrlCallback<'_>,
  ) -> TraversalResult<Vec<u8>> {
    match kind {
      DocumentKind::Html => self.rewrite_html(content, replace),
      DocumentKind::Css => self.rewrite_css(content, replace),
    }
  }
}

/// Default [`DocumentRewriter`] built on targeted regular expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexRewriter;

impl DocumentRewriter for RegexRewriter {
  fn rewrite_html(&self, content: &[u8], replace: &mut UrlCallback<'_>) -> TraversalResult<Vec<u8>> {
    super::html::replace_html_urls(content, replace)
  }

  fn rewrite_css(&self, content: &[u8], replace: &mut UrlCallback<'_>) -> TraversalResult<Vec<u8>> {
    super::css::replace_css_urls(content, replace)
  }
}

/// Name of the capture group holding the reference in every rewrite pattern.
pub(crate) const URL_GROUP: &str = "url";

/// Run one pattern pass over `content`, substituting the `url` group of every match.
///
/// Empty references and references that are not valid UTF-8 are left alone without consulting
/// the callback. A callback returning the reference unchanged keeps the original bytes.
pub(crate) fn replace_urls(
  pattern: &Regex,
  label: &str,
  content: &[u8],
  replace: &mut UrlCallback<'_>,
) -> TraversalResult<Vec<u8>> {
  let mut output = Vec::with_capacity(content.len());
  let mut copied_up_to = 0;

  for captures in pattern.captures_iter(content) {
    let Some(url_match) = captures.name(URL_GROUP) else {
      continue;
    };

    let Ok(url) = std::str::from_utf8(url_match.as_bytes()) else {
      tracing::warn!(
        "Skipping {label} url that is not valid UTF-8: {}",
        String::from_utf8_lossy(url_match.as_bytes())
      );
      continue;
    };
    if url.is_empty() {
      tracing::debug!("empty {label} url stays empty");
      continue;
    }

    let new_url = replace(url)?;
    if new_url == url {
      tracing::debug!("{label} url did not change: {url}");
      continue;
    }

    tracing::debug!("{label} url was replaced: {url} -> {new_url}");
    output.extend_from_slice(&content[copied_up_to..url_match.start()]);
    output.extend_from_slice(new_url.as_bytes());
    copied_up_to = url_match.end();
  }

  output.extend_from_slice(&content[copied_up_to..]);
  Ok(output)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::TraversalError;
  use std::path::PathBuf;

  #[test]
  fn dispatches_on_document_kind() {
    let rewriter = RegexRewriter;
    let mut upper = |url: &str| -> TraversalResult<String> { Ok(url.to_uppercase()) };

    let html = rewriter
      .rewrite(DocumentKind::Html, br#"<img src="a.png">"#, &mut upper)
      .unwrap();
    assert_eq!(html, br#"<img src="A.PNG">"#);

    let css = rewriter
      .rewrite(DocumentKind::Css, b"a { background: url(a.png) }", &mut upper)
      .unwrap();
    assert_eq!(css, b"a { background: url(A.PNG) }");
  }

  #[test]
  fn propagates_callback_errors() {
    let mut failing = |url: &str| -> TraversalResult<String> {
      Err(TraversalError::ExternalPath {
        path: PathBuf::from(url),
        root: PathBuf::from("/root"),
      })
    };

    let result = RegexRewriter.rewrite_html(br#"<img src="../x.png">"#, &mut failing);
    assert!(matches!(result, Err(TraversalError::ExternalPath { .. })));
  }

  #[test]
  fn leaves_non_utf8_references_alone() {
    let mut seen = Vec::new();
    let mut record = |url: &str| -> TraversalResult<String> {
      seen.push(url.to_string());
      Ok(format!("new/{url}"))
    };
    let page = b"<img src=\"caf\xe9.png\"><img src=\"ok.png\">";

    let output = RegexRewriter.rewrite_html(page, &mut record).unwrap();

    assert_eq!(seen, vec!["ok.png"]);
    assert_eq!(output, b"<img src=\"caf\xe9.png\"><img src=\"new/ok.png\">");
  }
}
