//! Headers attached to every development server response.

use warp::http::header::{self, HeaderMap, HeaderValue};

/// Permissive cross-origin headers plus a cache policy that always revalidates.
pub fn dev_headers() -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue::from_static("*"),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_METHODS,
    HeaderValue::from_static("GET, POST, OPTIONS"),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    HeaderValue::from_static("Content-Type"),
  );
  headers.insert(
    header::CACHE_CONTROL,
    HeaderValue::from_static("no-cache, no-store, must-revalidate"),
  );
  headers
}
