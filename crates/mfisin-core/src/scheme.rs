//! Records read from the reference store and the lookup result.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a candidate set: the columns the resolver needs from `scheme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeCandidate {
  pub name:        String,
  pub isin:        String,
  pub amfi_code:   Option<String>,
  #[serde(rename = "type")]
  pub scheme_type: String,
}

/// The resolved scheme.
///
/// `score == 100` marks a structural match (registrar and code narrowed the
/// candidates down to one row); any other value is the fuzzy-match
/// confidence of the winning name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeData {
  pub name:        String,
  pub isin:        String,
  pub amfi_code:   Option<String>,
  #[serde(rename = "type")]
  pub scheme_type: String,
  pub score:       u8,
}

impl SchemeData {
  pub fn from_candidate(candidate: SchemeCandidate, score: u8) -> Self {
    Self {
      name: candidate.name,
      isin: candidate.isin,
      amfi_code: candidate.amfi_code,
      scheme_type: candidate.scheme_type,
      score,
    }
  }
}

/// Historical NAV recorded for a fund in the `nav_snapshot` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSnapshot {
  pub isin: String,
  pub nav:  Decimal,
  pub date: Option<NaiveDate>,
}

/// Metadata for a generic (non-fund) instrument keyed by ISIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRecord {
  pub isin:            String,
  pub name:            String,
  pub issuer:          String,
  #[serde(rename = "type")]
  pub instrument_type: String,
  pub status:          String,
}
