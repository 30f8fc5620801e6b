use std::path::{Component, Path, PathBuf};

/// Lexically normalise `path`, resolving it against `base` first when it is relative.
///
/// No filesystem access happens here: symlinks are not followed and `..` segments are folded
/// purely on the textual components.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path_clean::clean(path)
  } else {
    path_clean::clean(base.join(path))
  }
}

/// Compute the path leading from the directory `from` to `to`.
///
/// Both inputs are expected to be absolute and normalised (see [`absolutize`]). Identical inputs
/// yield an empty path.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
  let from_components: Vec<Component<'_>> = from.components().collect();
  let to_components: Vec<Component<'_>> = to.components().collect();

  let shared = from_components
    .iter()
    .zip(&to_components)
    .take_while(|(left, right)| left == right)
    .count();

  let mut relative = PathBuf::new();
  for _ in shared..from_components.len() {
    relative.push("..");
  }
  for component in &to_components[shared..] {
    relative.push(component.as_os_str());
  }
  relative
}

/// Whether a relative path climbs out of its base directory.
pub fn escapes_base(relative: &Path) -> bool {
  matches!(relative.components().next(), Some(Component::ParentDir))
}

/// Resolve a query-free reference against the referencing file's directory, or against `root`
/// when the reference is root-absolute (`/x`).
pub fn resolve_against_roots(stripped_url: &str, current_dir: &Path, root: &Path) -> PathBuf {
  match stripped_url.strip_prefix('/') {
    Some(from_root) => path_clean::clean(root.join(from_root)),
    None => path_clean::clean(current_dir.join(stripped_url)),
  }
}

/// Render a path with forward slashes, as it should appear inside a document.
pub fn to_url_path(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}
