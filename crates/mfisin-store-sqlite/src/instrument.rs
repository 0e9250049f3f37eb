//! [`IsinDb`] — ISIN metadata for generic (non-fund) instruments.

use std::path::Path;

use mfisin_core::InstrumentRecord;
use rusqlite::named_params;

use crate::{Db, Result, db::required_text};

#[derive(Default)]
pub struct IsinDb {
  db: Db,
}

impl IsinDb {
  pub fn open(path: impl AsRef<Path>) -> Self { Self { db: Db::open(path) } }

  pub fn initialize(&mut self) -> Result<()> { self.db.initialize() }

  pub fn close(&mut self) -> Result<()> { self.db.close() }

  /// Look up an instrument by ISIN. `None` if the store has no such row.
  pub fn isin_lookup(&self, isin: &str) -> Result<Option<InstrumentRecord>> {
    self.db.query_one(
      "SELECT isin, name, issuer, type, status FROM isin WHERE isin = :isin",
      named_params! { ":isin": isin },
      |row| {
        Ok(InstrumentRecord {
          isin:            required_text(row, "isin")?,
          name:            required_text(row, "name")?,
          issuer:          required_text(row, "issuer")?,
          instrument_type: required_text(row, "type")?,
          status:          required_text(row, "status")?,
        })
      },
    )
  }
}
