//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Unauthorized(&'static str),
  #[error("bad request: {0}")]
  BadRequest(String),
  /// The reference series has no rows, so the `most-recent` sentinel and
  /// live ranges cannot be resolved. A data problem, not a client error.
  #[error("no records available for the reference series")]
  NoReferenceData,
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<pricedex_core::Error> for Error {
  fn from(e: pricedex_core::Error) -> Self {
    match e {
      pricedex_core::Error::InvalidInput(msg)
      | pricedex_core::Error::OutOfRange(msg) => Error::BadRequest(msg),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized(msg) => {
        (StatusCode::UNAUTHORIZED, msg).into_response()
      }
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::NoReferenceData => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "no records available for the reference series",
      )
        .into_response(),
      Error::Store(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}
