//! Error type for the sync client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  /// Transport failure, timeout, non-success status or unreadable remote
  /// metadata. The local store is left untouched.
  #[error("{0}")]
  FetchFailed(String),

  #[error("local store error: {0}")]
  Store(#[from] mfisin_store_sqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
