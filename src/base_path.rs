//! Normalised URL prefix under which the application is deployed.

use std::fmt;

/// Deployment base path with trailing separators removed.
///
/// The empty string denotes a root deployment, so `BasePath::new("/")` and
/// `BasePath::new("")` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
  /// Normalise a caller supplied base path by stripping trailing `/` characters.
  pub fn new(raw: &str) -> Self {
    Self(raw.trim_end_matches('/').to_string())
  }

  /// Normalised prefix without a trailing separator.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Returns `true` when the application is served from the host root.
  pub fn is_root(&self) -> bool {
    self.0.is_empty()
  }

  /// The prefix followed by a single separator, e.g. `/app/` or `/`.
  pub fn with_trailing_slash(&self) -> String {
    format!("{}/", self.0)
  }

  /// Prefix a local asset path, collapsing any leading separators on `path`.
  pub fn prefix(&self, path: &str) -> String {
    format!("{}/{}", self.0, path.trim_start_matches('/'))
  }

  /// Strip this prefix from `path` when it is present as a whole path segment.
  pub fn strip_from<'a>(&self, path: &'a str) -> &'a str {
    if self.is_root() {
      return path;
    }
    match path.strip_prefix(self.0.as_str()) {
      Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
      _ => path,
    }
  }
}

impl fmt::Display for BasePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_root() {
      f.write_str("/ (root)")
    } else {
      f.write_str(&self.0)
    }
  }
}

/// Determine whether a manifest reference points at an absolute URL.
///
/// Only a leading `http` counts, so scheme-relative references such as
/// `//cdn.example.com/icon.png` are treated as local paths.
pub fn is_absolute_url(value: &str) -> bool {
  value.starts_with("http")
}
