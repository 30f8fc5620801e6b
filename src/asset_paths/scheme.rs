use std::fmt;
use std::sync::Arc;

/// Rewrites protocol-relative URLs (`//host/path`) before they are classified.
#[derive(Clone)]
pub enum SchemelessUrlFix {
  /// Prefix the URL with a fixed scheme such as `https:`.
  Scheme(String),
  /// Arbitrary caller-supplied rewrite.
  Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl SchemelessUrlFix {
  /// Build a fix from a scheme name, appending the trailing `:` when it is missing.
  pub fn from_scheme(scheme: impl Into<String>) -> Self {
    let mut scheme = scheme.into();
    if !scheme.ends_with(':') {
      scheme.push(':');
    }
    Self::Scheme(scheme)
  }

  /// Build a fix from an arbitrary function.
  pub fn custom<F>(fix: F) -> Self
  where
    F: Fn(&str) -> String + Send + Sync + 'static,
  {
    Self::Custom(Arc::new(fix))
  }

  /// Apply the fix to a scheme-less URL.
  pub fn apply(&self, url: &str) -> String {
    match self {
      Self::Scheme(scheme) => format!("{scheme}{url}"),
      Self::Custom(fix) => fix(url),
    }
  }
}

impl fmt::Debug for SchemelessUrlFix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Scheme(scheme) => f.debug_tuple("Scheme").field(scheme).finish(),
      Self::Custom(_) => f.write_str("Custom(..)"),
    }
  }
}
