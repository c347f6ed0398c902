//! Project configuration loader describing where the PWA assets live.

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::project::PwaProjectLayout;

/// File name searched for in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "pwa.config.json";

/// Asset literals in the service worker that are rebased by default.
pub const DEFAULT_STATIC_ASSETS: [&str; 9] = [
  "/",
  "/index.html",
  "/compatibility.js",
  "/renderer.js",
  "/api-client.js",
  "/storage.js",
  "/bundle-processor.js",
  "/localization.js",
  "/manifest.json",
];

/// Port the development server listens on unless overridden.
pub const DEFAULT_SERVE_PORT: u16 = 8080;

/// Discoverable project configuration describing file names and server defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  /// Directory, relative to the project root, holding the deployable site.
  pub public_dir: String,
  /// Web app manifest file name inside the public directory.
  pub manifest_file: String,
  /// Service worker script file name inside the public directory.
  pub service_worker_file: String,
  /// Entry point HTML file name inside the public directory.
  pub index_html_file: String,
  /// Quoted asset literals in the service worker that must follow the base path.
  pub static_assets: Vec<String>,
  /// Identifier of the array literal listing the cached assets.
  pub asset_list_name: String,
  /// Address the development server binds to.
  pub serve_bind: IpAddr,
  /// Port the development server binds to.
  pub serve_port: u16,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      public_dir: "public".into(),
      manifest_file: "manifest.json".into(),
      service_worker_file: "service-worker.js".into(),
      index_html_file: "index.html".into(),
      static_assets: DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
      asset_list_name: "STATIC_ASSETS".into(),
      serve_bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
      serve_port: DEFAULT_SERVE_PORT,
    }
  }
}

impl ProjectConfig {
  /// Attempt to load configuration from the provided project root.
  ///
  /// A missing or malformed discovered file falls back to the defaults so both tools
  /// keep working in projects that never opted into a config file.
  pub fn discover(project_root: &Path) -> Self {
    let candidate = project_root.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(err) => {
        if candidate.exists() {
          tracing::warn!("ignoring {}: {err:#}", candidate.display());
        }
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> anyhow::Result<Self> {
    use anyhow::Context;

    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
  }

  /// Load an explicitly requested file, or discover one in the project root.
  pub fn load(project_root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
    match explicit {
      Some(path) => Self::from_path(path),
      None => Ok(Self::discover(project_root)),
    }
  }

  /// Resolve the configured file names against a project root.
  pub fn to_layout(&self, project_root: &Path) -> PwaProjectLayout {
    let public_dir = self.public_dir_path(project_root);
    PwaProjectLayout {
      manifest_path: public_dir.join(&self.manifest_file),
      service_worker_path: public_dir.join(&self.service_worker_file),
      index_html_path: public_dir.join(&self.index_html_file),
      static_assets: self.static_assets.clone(),
      asset_list_name: self.asset_list_name.clone(),
      public_dir,
    }
  }

  /// Path of the deployable site directory.
  pub fn public_dir_path(&self, project_root: &Path) -> PathBuf {
    project_root.join(&self.public_dir)
  }
}
