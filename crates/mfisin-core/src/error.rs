//! Error types for `mfisin-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// A required text field was missing or had the wrong shape.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("invalid RTA : {0}")]
  InvalidRegistrar(String),

  /// No candidate scheme survived filtering, or the best fuzzy score was
  /// below the requested threshold.
  #[error("no schemes found")]
  NoMatch,

  #[error("invalid version string: {0:?}")]
  InvalidVersion(String),

  #[error("malformed database metadata: {0}")]
  MalformedMetadata(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
