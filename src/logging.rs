//! Diagnostic logging setup shared by the binaries.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber honouring `RUST_LOG`, falling back to `default`.
pub fn init(default: Level) {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy(),
    )
    .init();
}
