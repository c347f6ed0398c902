//! Map request paths onto files below the served directory.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use warp::http::{HeaderValue, StatusCode, header};
use warp::path::FullPath;
use warp::reject::{self, Rejection};
use warp::reply::Response as WarpResponse;

use crate::server::listing::render_listing;

const INDEX_FILE: &str = "index.html";

/// Decode the request path and reject anything that could escape the served root.
fn sanitize_path(path: &str) -> Result<String, Rejection> {
  let decoded = percent_decode_str(path)
    .decode_utf8()
    .map_err(|_| reject::not_found())?;
  for segment in decoded.split('/') {
    if segment.starts_with("..") || segment.contains('\\') {
      return Err(reject::not_found());
    }
  }
  Ok(decoded.into_owned())
}

fn resolve(root: &Path, decoded: &str) -> PathBuf {
  let mut target = root.to_path_buf();
  for segment in decoded.split('/') {
    if !segment.is_empty() && segment != "." {
      target.push(segment);
    }
  }
  target
}

/// Serve a file, redirect to the canonical directory URL, or list a directory.
pub async fn serve_path(full: FullPath, root: Arc<PathBuf>) -> Result<WarpResponse, Rejection> {
  let request_path = full.as_str();
  let decoded = sanitize_path(request_path)?;
  let target = resolve(&root, &decoded);

  let metadata = tokio::fs::metadata(&target)
    .await
    .map_err(|_| reject::not_found())?;

  if metadata.is_file() {
    return Ok(file_response(&target, &metadata).await);
  }

  if !metadata.is_dir() {
    return Err(reject::not_found());
  }

  if !request_path.ends_with('/') {
    return Ok(redirect_response(&format!("{request_path}/")));
  }

  let index = target.join(INDEX_FILE);
  if let Ok(index_metadata) = tokio::fs::metadata(&index).await
    && index_metadata.is_file()
  {
    return Ok(file_response(&index, &index_metadata).await);
  }

  match render_listing(&decoded, &target).await {
    Ok(html) => Ok(html_response(html)),
    Err(err) => {
      tracing::error!("failed to list {}: {err}", target.display());
      Ok(text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
      ))
    }
  }
}

async fn file_response(path: &Path, metadata: &Metadata) -> WarpResponse {
  let bytes = match tokio::fs::read(path).await {
    Ok(bytes) => bytes,
    Err(err) => {
      tracing::error!("failed to read {}: {err}", path.display());
      return text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
      );
    }
  };

  let len = bytes.len();
  let mime = mime_guess::from_path(path).first_or_octet_stream();
  let mut response = WarpResponse::new(bytes.into());
  let headers = response.headers_mut();
  if let Ok(content_type) = HeaderValue::from_str(mime.as_ref()) {
    headers.insert(header::CONTENT_TYPE, content_type);
  }
  headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
  if let Some(last_modified) = last_modified(metadata) {
    headers.insert(header::LAST_MODIFIED, last_modified);
  }
  response
}

fn last_modified(metadata: &Metadata) -> Option<HeaderValue> {
  let modified: DateTime<Utc> = metadata.modified().ok()?.into();
  HeaderValue::from_str(&modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string()).ok()
}

fn redirect_response(location: &str) -> WarpResponse {
  let mut response = WarpResponse::new(String::new().into());
  *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
  if let Ok(value) = HeaderValue::from_str(location) {
    response.headers_mut().insert(header::LOCATION, value);
  }
  response
}

fn html_response(html: String) -> WarpResponse {
  let mut response = WarpResponse::new(html.into());
  response.headers_mut().insert(
    header::CONTENT_TYPE,
    HeaderValue::from_static("text/html; charset=utf-8"),
  );
  response
}

/// Plain text response used for error statuses.
pub fn text_response(status: StatusCode, body: &'static str) -> WarpResponse {
  let mut response = WarpResponse::new(body.to_string().into());
  *response.status_mut() = status;
  response.headers_mut().insert(
    header::CONTENT_TYPE,
    HeaderValue::from_static("text/plain; charset=utf-8"),
  );
  response
}
