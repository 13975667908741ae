//! Error types for `pricedex-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed caller input — a client error, never retried.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A requested range starts after the latest known data.
  #[error("out of range: {0}")]
  OutOfRange(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
