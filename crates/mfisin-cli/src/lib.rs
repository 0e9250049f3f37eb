//! Keeps the local ISIN reference store in sync with the published copy.
//!
//! The published store is described by a small `key=value` metadata file.
//! [`sync::DbSync`] compares it with the local `meta` table and downloads the
//! full database only when the remote copy is newer and shares the local
//! schema format.

// Native `async fn` in traits; `RemoteSource` is only used generically.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod sync;

pub use error::SyncError;

use mfisin_core::DbMeta;

/// Version of this tool, as printed by `--version`.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The three `--version` lines: tool version, store version, store format.
pub fn version_report(meta: &DbMeta) -> String {
  format!(
    "cli-version : {CLI_VERSION}\ndb-version  : {}\ndb-format   : {}\n",
    meta.version, meta.dbformat
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_report_has_three_aligned_lines() {
    let meta = DbMeta {
      version:  "2025.02.27".parse().unwrap(),
      dbformat: "1".parse().unwrap(),
    };
    assert_eq!(
      version_report(&meta),
      format!("cli-version : {CLI_VERSION}\ndb-version  : 2025.2.27\ndb-format   : 1\n")
    );
  }
}
