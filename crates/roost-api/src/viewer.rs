//! The [`Viewer`] extractor: whose likes a request reads and writes.
//!
//! Identity is taken at face value from the `X-Viewer` header; requests
//! without it act as the configured default viewer.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use roost_core::store::ArchiveStore;

use crate::{AppState, error::ApiError};

pub const VIEWER_HEADER: &str = "x-viewer";

/// The viewer a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer(pub String);

impl Viewer {
  pub fn as_str(&self) -> &str { &self.0 }
}

/// Resolve the viewer from request headers.
pub fn viewer_from_headers(headers: &HeaderMap, default_viewer: &str) -> Result<Viewer, ApiError> {
  let Some(value) = headers.get(VIEWER_HEADER) else {
    return Ok(Viewer(default_viewer.to_owned()));
  };
  let name = value
    .to_str()
    .map_err(|_| ApiError::BadRequest(format!("{VIEWER_HEADER} header is not valid text")))?
    .trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest(format!("{VIEWER_HEADER} header is empty")));
  }
  Ok(Viewer(name.to_owned()))
}

impl<S> FromRequestParts<AppState<S>> for Viewer
where
  S: ArchiveStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    viewer_from_headers(&parts.headers, &state.settings.default_viewer)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn missing_header_uses_default() {
    let viewer = viewer_from_headers(&HeaderMap::new(), "default").unwrap();
    assert_eq!(viewer.as_str(), "default");
  }

  #[test]
  fn header_names_the_viewer() {
    let mut headers = HeaderMap::new();
    headers.insert(VIEWER_HEADER, HeaderValue::from_static("  alice "));
    assert_eq!(viewer_from_headers(&headers, "default").unwrap(), Viewer("alice".into()));
  }

  #[test]
  fn blank_header_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(VIEWER_HEADER, HeaderValue::from_static("   "));
    assert!(matches!(
      viewer_from_headers(&headers, "default"),
      Err(ApiError::BadRequest(_))
    ));
  }

  #[test]
  fn non_text_header_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(VIEWER_HEADER, HeaderValue::from_bytes(b"caf\xe9").unwrap());
    assert!(matches!(
      viewer_from_headers(&headers, "default"),
      Err(ApiError::BadRequest(_))
    ));
  }
}
