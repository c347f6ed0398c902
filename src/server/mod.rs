//! Local static file server for testing the PWA in a browser.
//!
//! Every response, including redirects and errors, carries the headers from
//! [`headers::dev_headers`]. The server stops on Ctrl+C after in-flight requests finish.

pub mod files;
pub mod headers;
pub mod listing;

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use warp::http::StatusCode;
use warp::reply::Response as WarpResponse;
use warp::{Filter, Rejection, Reply};

use crate::server::files::{serve_path, text_response};

/// Runtime options for the development server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
  /// Address to bind to.
  pub bind: IpAddr,
  /// Port to bind to.
  pub port: u16,
  /// Directory whose contents are served.
  pub public_dir: PathBuf,
}

impl ServeOptions {
  /// Socket address the server listens on.
  pub fn addr(&self) -> SocketAddr {
    SocketAddr::new(self.bind, self.port)
  }
}

/// Bind the listener and serve until interrupted.
pub async fn run_server(options: ServeOptions) -> Result<()> {
  let public_dir = options
    .public_dir
    .canonicalize()
    .with_context(|| format!("cannot serve {}", options.public_dir.display()))?;

  let listener = TcpListener::bind(options.addr())
    .await
    .with_context(|| format!("failed to bind {}", options.addr()))?;
  let listening_addr = listener.local_addr()?;

  println!(
    "PWA dev server running at http://localhost:{}",
    listening_addr.port()
  );
  println!("Serving files from: {}", public_dir.display());
  println!("\nPress Ctrl+C to stop\n");
  tracing::info!(addr = %listening_addr, "listening");

  warp::serve(routes(Arc::new(public_dir)))
    .incoming(listener)
    .graceful(shutdown_signal())
    .run()
    .await;

  tracing::info!("stopped");
  println!("\nServer stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {err}");
    std::future::pending::<()>().await;
  }
}

/// Request filter serving `public_dir` for every method and path.
pub fn routes(
  public_dir: Arc<PathBuf>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
  warp::path::full()
    .and(with_dir(public_dir))
    .and_then(serve_path)
    .recover(handle_rejection)
    .with(warp::reply::with::headers(headers::dev_headers()))
    .with(warp::trace::request())
}

fn with_dir(
  dir: Arc<PathBuf>,
) -> impl Filter<Extract = (Arc<PathBuf>,), Error = Infallible> + Clone {
  warp::any().map(move || dir.clone())
}

async fn handle_rejection(err: Rejection) -> Result<WarpResponse, Infallible> {
  if err.is_not_found() {
    return Ok(text_response(StatusCode::NOT_FOUND, "404 Not Found"));
  }
  tracing::warn!("unhandled rejection: {err:?}");
  Ok(text_response(
    StatusCode::INTERNAL_SERVER_ERROR,
    "500 Internal Server Error",
  ))
}
