//! Error type for `mfisin-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] mfisin_core::Error),

  /// The store file is missing, unreadable or not a valid database.
  #[error("isin database unavailable: {0}")]
  DbUnavailable(#[from] rusqlite::Error),

  #[error("invalid NAV value for {isin}: {value:?}")]
  InvalidNav { isin: String, value: String },

  /// The `meta` table lacks a required key.
  #[error("isin database metadata is missing {0:?}")]
  MissingMeta(&'static str),
}

impl Error {
  /// The lookup error from the core taxonomy, if this is one.
  pub fn as_core(&self) -> Option<&mfisin_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
