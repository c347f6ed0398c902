//! In-memory rewrites applied to the PWA assets for sub-path deployment.
//!
//! Each submodule transforms document text and reports what changed; nothing here touches
//! the filesystem. [`crate::configurator`] stages the results and commits them together.

pub mod asset_list;
pub mod html;
pub mod manifest;
pub mod service_worker;

use std::path::PathBuf;

pub use html::{HtmlOutcome, HtmlRewrite, rewrite_index_html};
pub use manifest::{ManifestError, ManifestRewrite, rewrite_manifest};
pub use service_worker::{
  DeclarationEdit, ServiceWorkerRewrite, declared_base_path, rewrite_service_worker,
};

/// Errors raised while preparing or committing the asset rewrites.
#[derive(Debug)]
pub enum ConfigureError {
  /// Failed to read or write one of the asset files.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The manifest is not valid JSON.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// The manifest parsed but does not have the expected structure.
  Shape {
    /// Path that caused the error.
    path: PathBuf,
    /// Description of the structural problem.
    reason: &'static str,
  },
}

impl ConfigureError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn manifest(path: impl Into<PathBuf>, error: ManifestError) -> Self {
    let path = path.into();
    match error {
      ManifestError::Parse(source) => Self::Parse { path, source },
      ManifestError::Shape(reason) => Self::Shape { path, reason },
    }
  }
}

impl std::fmt::Display for ConfigureError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io { path, source } => {
        write!(f, "failed to access {}: {}", path.display(), source)
      }
      Self::Parse { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
      Self::Shape { path, reason } => {
        write!(f, "unexpected structure in {}: {}", path.display(), reason)
      }
    }
  }
}

impl std::error::Error for ConfigureError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
      Self::Shape { .. } => None,
    }
  }
}
