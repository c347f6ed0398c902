//! Resolved on-disk locations of the files the tools operate on.

use std::path::{Path, PathBuf};

/// Absolute or root-relative paths of the PWA assets for a single project.
#[derive(Debug, Clone)]
pub struct PwaProjectLayout {
  /// Directory holding the deployable site.
  pub public_dir: PathBuf,
  /// Web app manifest.
  pub manifest_path: PathBuf,
  /// Service worker script.
  pub service_worker_path: PathBuf,
  /// Entry point HTML document.
  pub index_html_path: PathBuf,
  /// Asset literals rebased inside the service worker asset list.
  pub static_assets: Vec<String>,
  /// Identifier of the service worker asset array.
  pub asset_list_name: String,
}

impl PwaProjectLayout {
  /// Short display name for a file inside the public directory.
  pub fn display_name<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
    path
      .strip_prefix(&self.public_dir)
      .unwrap_or(path)
      .to_string_lossy()
  }
}
