//! ETag computation for tweet detail responses.
//!
//! ETags are SHA-256 hashes over the serialised response body. JSON object
//! keys serialise in sorted order, so equal payloads always hash equally.

use axum::http::{HeaderMap, header};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a strong ETag for `value`.
pub fn compute_etag<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
  let body = serde_json::to_vec(value)?;
  let hash = Sha256::digest(&body);
  Ok(format!("\"{}\"", hex::encode(hash)))
}

/// Whether the request's `If-None-Match` already covers `etag`. Weak
/// validators compare equal to their strong form.
pub fn not_modified(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(str::trim)
    .any(|candidate| {
      candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}
