use anyhow::Result;
use clap::Parser;
use tracing::Level;

use pwa_pages_kit::cli::ServeCli;
use pwa_pages_kit::{logging, run_server};

#[tokio::main]
async fn main() -> Result<()> {
  logging::init(Level::INFO);
  let options = ServeCli::parse().into_options()?;
  tracing::debug!("serve options: {:?}", &options);
  run_server(options).await
}
