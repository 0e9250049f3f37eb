//! [`MfIsinDb`] — scheme resolution and NAV lookups for Indian mutual funds.

use std::{path::Path, str::FromStr};

use chrono::NaiveDate;
use mfisin_core::{
  DbMeta, FilterPlan, NavSnapshot, RawSchemeQuery, SchemeCandidate, SchemeData, SchemeQuery,
  fuzzy,
};
use rusqlite::{named_params, types::Value};
use rust_decimal::Decimal;

use crate::{
  Db, Error, Result,
  candidates::{isin_candidates, scheme_candidates},
  db::{required_text, text_column},
};

/// ISIN database for (Indian) mutual funds.
///
/// Without [`initialize`](Self::initialize) every call opens and releases its
/// own connection; after it, calls share one connection until
/// [`close`](Self::close).
#[derive(Default)]
pub struct MfIsinDb {
  db: Db,
}

impl MfIsinDb {
  pub fn open(path: impl AsRef<Path>) -> Self { Self { db: Db::open(path) } }

  pub fn initialize(&mut self) -> Result<()> { self.db.initialize() }

  pub fn close(&mut self) -> Result<()> { self.db.close() }

  pub fn is_connected(&self) -> bool { self.db.is_connected() }

  pub fn db(&self) -> &Db { &self.db }

  // ── Scheme resolution ─────────────────────────────────────────────────────

  /// Resolve the closest matching scheme for `query`.
  ///
  /// An ISIN hint that hits the store skips candidate filtering. Whatever
  /// candidate set results goes through [`fuzzy::resolve`]: a single row is
  /// a structural match, several rows are ranked by name similarity.
  pub fn isin_lookup(&self, query: &SchemeQuery) -> Result<SchemeData> {
    let candidates = self.candidates(query)?;
    Ok(fuzzy::resolve(query.scheme_name(), candidates, query.min_score())?)
  }

  /// [`isin_lookup`](Self::isin_lookup) for an unvalidated request.
  pub fn isin_lookup_raw(&self, raw: RawSchemeQuery) -> Result<SchemeData> {
    self.isin_lookup(&SchemeQuery::try_from(raw)?)
  }

  /// The candidate set [`isin_lookup`](Self::isin_lookup) ranks.
  pub fn candidates(&self, query: &SchemeQuery) -> Result<Vec<SchemeCandidate>> {
    if let Some(isin) = query.isin() {
      let direct = isin_candidates(&self.db, isin)?;
      if !direct.is_empty() {
        tracing::debug!(isin, "resolved via isin hint");
        return Ok(direct);
      }
    }
    self.scheme_lookup(&FilterPlan::for_query(query))
  }

  /// Run the candidate filter for an explicit plan.
  pub fn scheme_lookup(&self, plan: &FilterPlan) -> Result<Vec<SchemeCandidate>> {
    scheme_candidates(&self.db, plan)
  }

  // ── NAV ───────────────────────────────────────────────────────────────────

  /// The historical NAV recorded for `isin`, used for grandfathered
  /// long-term capital gains. `None` if the ISIN has no snapshot.
  pub fn nav_lookup(&self, isin: &str) -> Result<Option<Decimal>> {
    let raw = self.db.query_one(
      "SELECT nav FROM nav_snapshot WHERE isin = :isin",
      named_params! { ":isin": isin },
      |row| row.get::<_, Value>("nav"),
    )?;
    raw.map(|nav| decode_nav(isin, nav)).transpose()
  }

  /// The NAV together with its snapshot date. A date that is not
  /// `YYYY-MM-DD` is reported as `None`.
  pub fn nav_snapshot(&self, isin: &str) -> Result<Option<NavSnapshot>> {
    let raw = self.db.query_one(
      "SELECT nav, date FROM nav_snapshot WHERE isin = :isin",
      named_params! { ":isin": isin },
      |row| Ok((row.get::<_, Value>("nav")?, text_column(row, "date")?)),
    )?;

    let Some((nav, date)) = raw else {
      return Ok(None);
    };
    Ok(Some(NavSnapshot {
      isin: isin.to_owned(),
      nav:  decode_nav(isin, nav)?,
      date: date.as_deref().and_then(|d| decode_date(isin, d)),
    }))
  }

  // ── Metadata ──────────────────────────────────────────────────────────────

  /// Version and format of the local store.
  pub fn metadata(&self) -> Result<DbMeta> {
    let pairs = self.db.query("SELECT key, value FROM meta", [], |row| {
      Ok((required_text(row, "key")?, required_text(row, "value")?))
    })?;
    for key in ["version", "dbformat"] {
      if !pairs.iter().any(|(k, _)| k == key) {
        return Err(Error::MissingMeta(key));
      }
    }
    Ok(DbMeta::from_pairs(pairs)?)
  }
}

fn decode_nav(isin: &str, value: Value) -> Result<Decimal> {
  let invalid = |value: String| Error::InvalidNav { isin: isin.to_owned(), value };
  match value {
    Value::Text(text) => Decimal::from_str(text.trim()).map_err(|_| invalid(text)),
    Value::Integer(i) => Ok(Decimal::from(i)),
    // Shortest round-trip formatting keeps e.g. 15.7036 exact.
    Value::Real(f) => {
      let text = f.to_string();
      Decimal::from_str(&text).map_err(|_| invalid(text))
    }
    other => Err(invalid(format!("{other:?}"))),
  }
}

fn decode_date(isin: &str, s: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
    .inspect_err(|e| tracing::warn!(isin, date = s, "unreadable nav snapshot date: {e}"))
    .ok()
}
