//! Bearer-token check for mutating requests.
//!
//! The token is an opaque shared secret supplied by configuration; the
//! single string comparison below is the whole scheme.

use axum::http::{HeaderMap, header};

use crate::error::Error;

/// Verify the `Authorization: Bearer …` header against the configured token.
pub fn verify_bearer(headers: &HeaderMap, expected: &str) -> Result<(), Error> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized("no bearer token provided"))?;

  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or(Error::Unauthorized("no bearer token provided"))?;

  if token != expected {
    return Err(Error::Unauthorized("token invalid"));
  }

  Ok(())
}
