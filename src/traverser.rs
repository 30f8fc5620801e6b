//! Recursive link traversal: copies a document, everything it references, and rewrites the
//! references for the destination tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::asset_paths::{
  SchemelessUrlFix, escapes_base, is_data_uri, is_empty_url, is_remote_url, is_scheme_less, relative_path,
  resolve_against_roots, split_query_and_fragment, to_url_path,
};
use crate::bundle::copy::ensure_parent_dir;
use crate::bundle::{DocumentRewriter, RegexRewriter, copy_file};
use crate::error::{TraversalError, TraversalResult};
use crate::fs::FileSystem;
use crate::models::{DocumentKind, FileActionKind, ReferenceOutcome, TraversalReport};
use crate::project::RootContext;
use crate::selection::ReferenceFilter;

/// Walks documents from an entry file and mirrors them into the destination root.
///
/// Within one entry traversal every `(source, destination)` pair is processed at most once, so
/// reference cycles terminate and shared resources are written a single time.
pub struct LinkTraverser<'a, F: FileSystem + ?Sized> {
  context: RootContext,
  fs: &'a F,
  rewriter: Rc<dyn DocumentRewriter + 'a>,
  blacklist: Option<Box<dyn ReferenceFilter + 'a>>,
  schemeless_url_fix: Option<SchemelessUrlFix>,
  visited: HashSet<(PathBuf, PathBuf)>,
  report: TraversalReport,
}

impl<'a, F: FileSystem + ?Sized> LinkTraverser<'a, F> {
  /// Create a traverser for `context` using the default regex rewriter.
  pub fn new(context: RootContext, fs: &'a F) -> Self {
    Self {
      context,
      fs,
      rewriter: Rc::new(RegexRewriter),
      blacklist: None,
      schemeless_url_fix: None,
      visited: HashSet::new(),
      report: TraversalReport::default(),
    }
  }

  /// Drop references for which `filter` returns `true`.
  pub fn with_blacklist(mut self, filter: impl ReferenceFilter + 'a) -> Self {
    self.blacklist = Some(Box::new(filter));
    self
  }

  /// Rewrite scheme-less references before classifying them.
  pub fn with_schemeless_url_fix(mut self, fix: SchemelessUrlFix) -> Self {
    self.schemeless_url_fix = Some(fix);
    self
  }

  /// Substitute the document rewriter.
  pub fn with_rewriter(mut self, rewriter: impl DocumentRewriter + 'a) -> Self {
    self.rewriter = Rc::new(rewriter);
    self
  }

  /// Everything written so far.
  pub fn report(&self) -> &TraversalReport {
    &self.report
  }

  /// Consume the traverser and return its report.
  pub fn into_report(self) -> TraversalReport {
    self.report
  }

  /// Process an explicitly listed entry file.
  ///
  /// A missing entry only produces a warning; processing is still attempted and fails on read.
  pub fn process_entry(&mut self, entry: &Path) -> TraversalResult<()> {
    let src = self.context.absolutize(entry);
    if !self.fs.exists(&src) {
      tracing::warn!("Source file \"{}\" not found.", entry.display());
    }

    self.visited.clear();
    self.process_path(&src, None)
  }

  /// Copy `src` to `dst` (or its mirrored position under the destination root), rewriting and
  /// following references when it is an HTML or CSS document.
  pub fn process_path(&mut self, src: &Path, dst: Option<&Path>) -> TraversalResult<()> {
    tracing::debug!(" .. Processing {}", src.display());

    if self.fs.is_dir(src) {
      tracing::debug!("Skipping dir {}", src.display());
      return Ok(());
    }

    let dst = match dst {
      Some(dst) => dst.to_path_buf(),
      None => self.context.mirror_destination(src),
    };

    if escapes_base(&self.context.relative_to_root(src)) {
      return Err(TraversalError::ExternalPath {
        path: src.to_path_buf(),
        root: self.context.root_dir().to_path_buf(),
      });
    }

    if !self.visited.insert((src.to_path_buf(), dst.clone())) {
      tracing::debug!("Already processed {}", src.display());
      return Ok(());
    }

    if self.context.is_norec_path(src) {
      tracing::debug!("Copying excluded file as is {}", src.display());
      copy_file(self.fs, src, &dst)?;
      self
        .report
        .record_file(src.to_path_buf(), dst, FileActionKind::CopiedVerbatim);
      return Ok(());
    }

    match DocumentKind::from_path(src) {
      Some(kind) => self.process_document(kind, src, dst),
      None => {
        tracing::debug!("Copying unknown file as is {}", src.display());
        copy_file(self.fs, src, &dst)?;
        self
          .report
          .record_file(src.to_path_buf(), dst, FileActionKind::Copied);
        Ok(())
      }
    }
  }

  fn process_document(&mut self, kind: DocumentKind, src: &Path, dst: PathBuf) -> TraversalResult<()> {
    tracing::debug!("Processing {kind:?} file {}", src.display());

    let content = self
      .fs
      .read(src)
      .map_err(|source| TraversalError::Read {
        path: src.to_path_buf(),
        source,
      })?;

    let rewriter = Rc::clone(&self.rewriter);
    let rewritten = rewriter.rewrite(kind, &content, &mut |url: &str| {
      self.process_url(src, &dst, url)
    })?;

    ensure_parent_dir(self.fs, &dst)?;
    self
      .fs
      .write(&dst, &rewritten)
      .map_err(|source| TraversalError::Write {
        path: dst.clone(),
        source,
      })?;
    tracing::info!("Wrote {}", dst.display());

    self
      .report
      .record_file(src.to_path_buf(), dst, FileActionKind::Rewritten(kind));
    Ok(())
  }

  /// Handle one reference found in the document `src` being written to `dst`, returning the text
  /// that replaces it.
  pub fn process_url(&mut self, src: &Path, dst: &Path, url: &str) -> TraversalResult<String> {
    let outcome = self.resolve_reference(src, dst, url)?;
    self.report.record_reference(&outcome, url);
    Ok(outcome.replacement(url).to_string())
  }

  fn resolve_reference(&mut self, src: &Path, dst: &Path, url: &str) -> TraversalResult<ReferenceOutcome> {
    if let Some(blacklist) = &self.blacklist {
      let src_from_root = to_url_path(&self.context.relative_to_root(src));
      if blacklist.is_blacklisted(url, &src_from_root) {
        tracing::info!("Ignoring user-blacklisted url: {url}...");
        return Ok(ReferenceOutcome::Blacklisted);
      }
    }

    let url = match &self.schemeless_url_fix {
      Some(fix) if is_scheme_less(url) => fix.apply(url),
      _ => url.to_string(),
    };

    if is_remote_url(&url) {
      tracing::info!("Skipping remote url: {url}...");
      return Ok(ReferenceOutcome::Remote(url));
    }

    if is_data_uri(&url) {
      let prefix: String = url.chars().take(12).collect();
      tracing::info!("Skipping data uri: {prefix}......");
      return Ok(ReferenceOutcome::DataUri);
    }

    if is_empty_url(&url) {
      tracing::info!("Skipping empty url: {url}...");
      return Ok(ReferenceOutcome::Empty);
    }

    let (path, suffix) = split_query_and_fragment(&url);
    let src_dir = parent_dir(src);
    let dst_dir = parent_dir(dst);
    let src_file = resolve_against_roots(path, src_dir, self.context.root_dir());
    let dst_file = resolve_against_roots(path, dst_dir, self.context.dst_dir());

    let new_url = format!(
      "{}{}",
      to_url_path(&relative_path(dst_dir, &dst_file)),
      suffix
    );

    if self.visited.contains(&(src_file.clone(), dst_file.clone())) {
      return Ok(ReferenceOutcome::Revisited(new_url));
    }

    self.process_path(&src_file, Some(&dst_file))?;
    Ok(ReferenceOutcome::Rewritten(new_url))
  }
}

fn parent_dir(path: &Path) -> &Path {
  path.parent().unwrap_or(Path::new(""))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fs::memory::MemoryFileSystem;
  use crate::models::FileAction;
  use tracing_test::traced_test;

  const PNG: &str = "\u{89}PNG fake image";

  fn context(norec: Option<&str>) -> RootContext {
    RootContext::new(Path::new("/"), Path::new("/project"), Path::new("/out"), norec)
  }

  fn run(fs: &MemoryFileSystem, entry: &str) -> TraversalResult<TraversalReport> {
    let mut traverser = LinkTraverser::new(context(None), fs);
    traverser.process_entry(Path::new(entry))?;
    Ok(traverser.into_report())
  }

  #[test]
  fn copies_page_stylesheet_and_nested_image() {
    let fs = MemoryFileSystem::with_files([
      ("/project/page.html", r#"<link rel="stylesheet" href="css/style.css">"#),
      ("/project/css/style.css", "h1 { background: url(../img/logo.png); }"),
      ("/project/img/logo.png", PNG),
    ]);

    let report = run(&fs, "/project/page.html").unwrap();

    assert_eq!(
      fs.text("/out/page.html").unwrap(),
      r#"<link rel="stylesheet" href="css/style.css">"#
    );
    assert_eq!(
      fs.text("/out/css/style.css").unwrap(),
      "h1 { background: url(../img/logo.png); }"
    );
    assert_eq!(fs.text("/out/img/logo.png").unwrap(), PNG);
    assert_eq!(report.file_count(), 3);
    assert_eq!(report.references.rewritten, 2);
    assert_eq!(report.references.unchanged, 2);
    assert_eq!(
      report.files.last(),
      Some(&FileAction {
        src: PathBuf::from("/project/page.html"),
        dst: PathBuf::from("/out/page.html"),
        kind: FileActionKind::Rewritten(DocumentKind::Html),
      })
    );
  }

  #[test]
  fn rewrites_root_absolute_references_from_subdirectories() {
    let fs = MemoryFileSystem::with_files([
      ("/project/sub/index.html", r#"<img src="/img/a.png"><script src="./app.js"></script>"#),
      ("/project/img/a.png", PNG),
      ("/project/sub/app.js", "console.log(1);"),
    ]);

    run(&fs, "/project/sub/index.html").unwrap();

    assert_eq!(
      fs.text("/out/sub/index.html").unwrap(),
      r#"<img src="../img/a.png"><script src="app.js"></script>"#
    );
    assert!(fs.text("/out/img/a.png").is_some());
    assert!(fs.text("/out/sub/app.js").is_some());
  }

  #[test]
  fn leaves_remote_and_data_references_untouched() {
    let page = r#"<img src="https://cdn.example.com/x.png"><img src="data:image/png;base64,AAAA"><script src="//cdn.example.com/lib.js"></script>"#;
    let fs = MemoryFileSystem::with_files([("/project/page.html", page)]);

    let report = run(&fs, "/project/page.html").unwrap();

    assert_eq!(fs.text("/out/page.html").unwrap(), page);
    assert_eq!(fs.file_paths().len(), 2);
    assert_eq!(report.references.remote, 2);
    assert_eq!(report.references.data_uri, 1);
  }

  #[test]
  fn applies_scheme_fix_before_classification() {
    let fs = MemoryFileSystem::with_files([(
      "/project/page.html",
      r#"<script src="//cdn.example.com/lib.js"></script>"#,
    )]);

    let mut traverser = LinkTraverser::new(context(None), &fs)
      .with_schemeless_url_fix(SchemelessUrlFix::from_scheme("https"));
    traverser.process_entry(Path::new("/project/page.html")).unwrap();

    assert_eq!(
      fs.text("/out/page.html").unwrap(),
      r#"<script src="https://cdn.example.com/lib.js"></script>"#
    );
  }

  #[test]
  fn drops_blacklisted_references_without_copying() {
    let fs = MemoryFileSystem::with_files([
      ("/project/page.html", r#"<link href="fonts/secret.ttf"><link href="fonts/ok.ttf">"#),
      ("/project/fonts/secret.ttf", "secret"),
      ("/project/fonts/ok.ttf", "ok"),
    ]);

    let mut traverser = LinkTraverser::new(context(None), &fs).with_blacklist(
      |url: &str, src: &str| {
        assert_eq!(src, "page.html");
        url == "fonts/secret.ttf"
      },
    );
    traverser.process_entry(Path::new("/project/page.html")).unwrap();
    let copied: Vec<&Path> = traverser.report().files.iter().map(|file| file.src.as_path()).collect();

    assert_eq!(
      fs.text("/out/page.html").unwrap(),
      r#"<link href=""><link href="fonts/ok.ttf">"#
    );
    assert!(fs.text("/out/fonts/secret.ttf").is_none());
    assert!(copied.contains(&Path::new("/project/fonts/ok.ttf")));
    assert_eq!(traverser.report().references.blacklisted, 1);
  }

  #[test]
  fn copies_no_recurse_documents_verbatim() {
    let css = "a { background: url(../img/never.png); }";
    let fs = MemoryFileSystem::with_files([
      ("/project/page.html", r#"<link href="css/lib.css">"#),
      ("/project/css/lib.css", css),
    ]);

    let mut traverser = LinkTraverser::new(context(Some("css")), &fs);
    traverser.process_entry(Path::new("/project/page.html")).unwrap();

    assert_eq!(fs.text("/out/css/lib.css").unwrap(), css);
    assert!(fs.text("/out/img/never.png").is_none());
    assert_eq!(
      traverser.report().files[0].kind,
      FileActionKind::CopiedVerbatim
    );
  }

  #[test]
  fn copies_no_recurse_pages_verbatim() {
    let page = r#"<link rel="stylesheet" href="../css/never.css"><img src="./never.png">"#;
    let fs = MemoryFileSystem::with_files([
      ("/project/index.html", r#"<link href="vendor/docs.html">"#),
      ("/project/vendor/docs.html", page),
    ]);

    let mut traverser = LinkTraverser::new(context(Some("./vendor")), &fs);
    traverser.process_entry(Path::new("/project/index.html")).unwrap();

    assert_eq!(fs.text("/out/vendor/docs.html").unwrap(), page);
    assert_eq!(
      fs.file_paths(),
      vec!["/out/index.html", "/out/vendor/docs.html", "/project/index.html", "/project/vendor/docs.html"]
    );
    assert_eq!(traverser.report().files[0].kind, FileActionKind::CopiedVerbatim);
    assert_eq!(traverser.report().references.rewritten, 1);
  }

  #[test]
  fn follows_references_from_non_utf8_stylesheets() {
    let fs = MemoryFileSystem::with_files([
      ("/project/index.html", r#"<link rel="stylesheet" href="style.css">"#),
      ("/project/img/a.png", PNG),
    ]);
    fs.insert("/project/style.css", b"/* caf\xe9 */ a { background: url(./img/a.png) }");

    run(&fs, "/project/index.html").unwrap();

    assert_eq!(
      fs.bytes("/out/style.css").unwrap(),
      b"/* caf\xe9 */ a { background: url(img/a.png) }"
    );
    assert_eq!(fs.text("/out/img/a.png").unwrap(), PNG);
  }

  #[test]
  fn fails_on_references_outside_root() {
    let fs = MemoryFileSystem::with_files([
      ("/project/page.html", r#"<img src="../secret.png">"#),
      ("/secret.png", PNG),
    ]);

    let err = run(&fs, "/project/page.html").unwrap_err();

    assert!(matches!(err, TraversalError::ExternalPath { ref path, .. } if path == Path::new("/secret.png")));
    assert!(fs.text("/secret.png").is_some());
    assert!(fs.text("/out/page.html").is_none());
  }

  #[test]
  fn fails_on_entries_outside_root() {
    let fs = MemoryFileSystem::with_files([("/elsewhere/page.html", "<p></p>")]);

    let err = run(&fs, "/elsewhere/page.html").unwrap_err();

    assert!(matches!(err, TraversalError::ExternalPath { .. }));
  }

  #[test]
  fn terminates_reference_cycles() {
    let fs = MemoryFileSystem::with_files([
      ("/project/a.html", r#"<link rel="next" href="b.html">"#),
      ("/project/b.html", r#"<link rel="prev" href="a.html">"#),
    ]);

    let report = run(&fs, "/project/a.html").unwrap();

    assert_eq!(fs.text("/out/a.html").unwrap(), r#"<link rel="next" href="b.html">"#);
    assert_eq!(fs.text("/out/b.html").unwrap(), r#"<link rel="prev" href="a.html">"#);
    assert_eq!(report.references.rewritten, 1);
    assert_eq!(report.references.revisited, 1);
  }

  #[test]
  fn processes_shared_resources_once() {
    let fs = MemoryFileSystem::with_files([
      ("/project/page.html", r#"<link href="s.css"><link href="./s.css">"#),
      ("/project/s.css", "a { color: red }"),
    ]);

    let report = run(&fs, "/project/page.html").unwrap();

    assert_eq!(fs.text("/out/page.html").unwrap(), r#"<link href="s.css"><link href="s.css">"#);
    assert_eq!(report.file_count(), 2);
    assert_eq!(report.references.revisited, 1);
    assert_eq!(report.references.unchanged, 1);
  }

  #[test]
  fn reattaches_query_and_fragment() {
    let fs = MemoryFileSystem::with_files([
      ("/project/css/font.css", "src: url('../fonts/a.eot?#iefix'), url(./b.woff?v=4.7);"),
      ("/project/fonts/a.eot", "eot"),
      ("/project/css/b.woff", "woff"),
    ]);

    run(&fs, "/project/css/font.css").unwrap();

    assert_eq!(
      fs.text("/out/css/font.css").unwrap(),
      "src: url('../fonts/a.eot?#iefix'), url(b.woff?v=4.7);"
    );
    assert!(fs.text("/out/fonts/a.eot").is_some());
  }

  #[test]
  fn leaves_fragment_only_references_alone() {
    let fs = MemoryFileSystem::with_files([(
      "/project/icons.css",
      "a { filter: url(#blur); }",
    )]);

    let report = run(&fs, "/project/icons.css").unwrap();

    assert_eq!(fs.text("/out/icons.css").unwrap(), "a { filter: url(#blur); }");
    assert_eq!(report.references.empty, 1);
  }

  #[test]
  fn skips_directories() {
    let fs = MemoryFileSystem::with_files([("/project/img/a.png", PNG)]);

    let report = run(&fs, "/project/img").unwrap();

    assert_eq!(report.file_count(), 0);
    assert!(fs.text("/out/img/a.png").is_none());
  }

  #[test]
  #[traced_test]
  fn warns_about_missing_entries() {
    let fs = MemoryFileSystem::default();

    let _ = run(&fs, "/project/missing.html");

    assert!(logs_contain("Source file \"/project/missing.html\" not found."));
  }

  #[test]
  fn missing_entries_fail_when_read() {
    let fs = MemoryFileSystem::default();

    let err = run(&fs, "/project/missing.html").unwrap_err();

    assert!(matches!(err, TraversalError::Read { .. }));
  }

  #[test]
  fn missing_references_abort_the_run() {
    let fs = MemoryFileSystem::with_files([("/project/page.html", r#"<img src="gone.png">"#)]);

    let err = run(&fs, "/project/page.html").unwrap_err();

    assert!(matches!(err, TraversalError::Copy { .. }));
  }

  #[test]
  fn custom_rewriters_replace_the_regex_passes() {
    struct Uppercase;
    impl DocumentRewriter for Uppercase {
      fn rewrite_html(
        &self,
        content: &[u8],
        _replace: &mut crate::bundle::UrlCallback<'_>,
      ) -> TraversalResult<Vec<u8>> {
        Ok(content.to_ascii_uppercase())
      }

      fn rewrite_css(
        &self,
        content: &[u8],
        _replace: &mut crate::bundle::UrlCallback<'_>,
      ) -> TraversalResult<Vec<u8>> {
        Ok(content.to_vec())
      }
    }

    let fs = MemoryFileSystem::with_files([("/project/page.html", "<p>hi</p>")]);
    let mut traverser = LinkTraverser::new(context(None), &fs).with_rewriter(Uppercase);
    traverser.process_entry(Path::new("/project/page.html")).unwrap();

    assert_eq!(fs.text("/out/page.html").unwrap(), "<P>HI</P>");
  }
}
