//! Command-line surfaces of the `configure-pages` and `serve-pwa` binaries.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};

use crate::base_path::BasePath;
use crate::config::ProjectConfig;
use crate::server::ServeOptions;

/// Example invocations printed with usage errors and `--help`.
pub const CONFIGURE_EXAMPLES: &str = "Examples:
  configure-pages \"\"                                            # For root deployment
  configure-pages \"/tone_comparison_app/desktop_matching_app/public\"  # For subdirectory";

/// Options shared by both binaries for locating the project.
#[derive(Debug, Args, Clone)]
pub struct ProjectArgs {
  /// Project root containing the public directory.
  #[arg(long, env = "PWA_PROJECT_ROOT", default_value = ".")]
  pub root: PathBuf,

  /// Configuration file. Defaults to pwa.config.json in the project root when present.
  #[arg(long, env = "PWA_CONFIG")]
  pub config: Option<PathBuf>,
}

impl ProjectArgs {
  /// Load the project configuration selected by these arguments.
  pub fn load_config(&self) -> Result<ProjectConfig> {
    ProjectConfig::load(&self.root, self.config.as_deref())
  }

  /// Absolute project root, or the raw path when it cannot be resolved.
  pub fn resolved_root(&self) -> PathBuf {
    self.root.canonicalize().unwrap_or_else(|_| self.root.clone())
  }
}

/// Rewrite manifest, service worker and HTML paths for sub-path deployment.
#[derive(Debug, Parser)]
#[command(
  name = "configure-pages",
  version,
  about = "Configure the PWA for deployment under a URL sub-path (e.g. GitHub Pages).",
  after_help = CONFIGURE_EXAMPLES
)]
pub struct ConfigureCli {
  /// Base path the app is served under. Use "" for root deployment.
  pub base_path: String,

  #[command(flatten)]
  pub project: ProjectArgs,

  /// Report what would change without writing any file.
  #[arg(long)]
  pub dry_run: bool,
}

impl ConfigureCli {
  /// Normalised base path.
  pub fn base_path(&self) -> BasePath {
    BasePath::new(&self.base_path)
  }
}

/// Serve the PWA's public directory for local testing.
#[derive(Debug, Parser)]
#[command(
  name = "serve-pwa",
  version,
  about = "Serve the PWA's public directory with permissive CORS and no-cache headers."
)]
pub struct ServeCli {
  #[command(flatten)]
  pub project: ProjectArgs,

  /// Address to bind the HTTP server to [default: 0.0.0.0].
  #[arg(long, env = "PWA_SERVE_BIND")]
  pub bind: Option<IpAddr>,

  /// Port to bind the HTTP server to [default: 8080].
  #[arg(long, env = "PWA_SERVE_PORT")]
  pub port: Option<u16>,

  /// Directory to serve, relative to the project root [default: public].
  #[arg(long, env = "PWA_PUBLIC_DIR")]
  pub public_dir: Option<String>,
}

impl ServeCli {
  /// Merge flags, environment and the project config into server options.
  pub fn into_options(self) -> Result<ServeOptions> {
    let config = self.project.load_config()?;
    Ok(self.options_with(config))
  }

  fn options_with(self, mut config: ProjectConfig) -> ServeOptions {
    if let Some(public_dir) = self.public_dir {
      config.public_dir = public_dir;
    }
    ServeOptions {
      bind: self.bind.unwrap_or(config.serve_bind),
      port: self.port.unwrap_or(config.serve_port),
      public_dir: config.public_dir_path(&self.project.root),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::error::ErrorKind;
  use std::net::Ipv4Addr;

  #[test]
  fn base_path_is_required() {
    let err = ConfigureCli::try_parse_from(["configure-pages"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
  }

  #[test]
  fn empty_base_path_means_root() {
    let cli = ConfigureCli::try_parse_from(["configure-pages", ""]).unwrap();
    assert!(cli.base_path().is_root());
    assert!(!cli.dry_run);
  }

  #[test]
  fn trailing_separator_is_stripped() {
    let cli =
      ConfigureCli::try_parse_from(["configure-pages", "--dry-run", "/app/public/"]).unwrap();
    assert_eq!(cli.base_path().as_str(), "/app/public");
    assert!(cli.dry_run);
  }

  #[test]
  fn resolved_root_is_absolute_when_it_exists() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    let cli = ConfigureCli::try_parse_from(["configure-pages", "--root", root, "/app"]).unwrap();
    let resolved = cli.project.resolved_root();
    assert!(resolved.is_absolute());
    assert_eq!(resolved, dir.path().canonicalize().unwrap());

    let missing = ProjectArgs {
      root: PathBuf::from("no/such/project"),
      config: None,
    };
    assert_eq!(missing.resolved_root(), PathBuf::from("no/such/project"));
  }

  #[test]
  fn serve_flags_override_config() {
    let cli = ServeCli::try_parse_from([
      "serve-pwa",
      "--root",
      "/srv/app",
      "--port",
      "9090",
      "--public-dir",
      "dist",
    ])
    .unwrap();
    let options = cli.options_with(ProjectConfig::default());
    assert_eq!(options.port, 9090);
    assert_eq!(options.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(options.public_dir, PathBuf::from("/srv/app/dist"));
  }

  #[test]
  fn serve_defaults_come_from_config() {
    let cli = ServeCli::try_parse_from(["serve-pwa", "--root", "/srv/app"]).unwrap();
    let config = ProjectConfig {
      serve_port: 3000,
      ..ProjectConfig::default()
    };
    let options = cli.options_with(config);
    assert_eq!(options.port, 3000);
    assert_eq!(options.public_dir, PathBuf::from("/srv/app/public"));
  }
}
