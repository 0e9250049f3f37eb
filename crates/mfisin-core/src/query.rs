//! Validated lookup queries.
//!
//! A lookup needs three pieces of text (scheme name, registrar, registrar
//! code) and may carry an ISIN hint. Callers that assemble queries from
//! loosely typed sources (CSV rows, JSON payloads) go through
//! [`RawSchemeQuery`], whose conversion performs every precondition check in
//! one place before any SQL is built.

use serde::Deserialize;

use crate::{Error, Result, rta::Rta};

/// Minimum fuzzy score a multi-candidate match must reach by default.
pub const DEFAULT_MIN_SCORE: u8 = 60;

// ─── Raw input ───────────────────────────────────────────────────────────────

/// An unvalidated lookup request, e.g. straight out of a JSON body.
///
/// `scheme_name`, `rta` and `rta_code` are required text. `None` here means
/// the caller sent the wrong type (`null`, or nothing at all), which is an
/// [`Error::InvalidInput`], not a missing-value signal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSchemeQuery {
  pub scheme_name: Option<String>,
  pub rta:         Option<String>,
  pub rta_code:    Option<String>,
  #[serde(default)]
  pub isin:        Option<String>,
  #[serde(default)]
  pub min_score:   Option<u8>,
}

// ─── Validated query ─────────────────────────────────────────────────────────

/// A lookup request whose preconditions have all been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeQuery {
  scheme_name: String,
  rta:         Rta,
  rta_code:    String,
  isin:        Option<String>,
  min_score:   u8,
}

impl SchemeQuery {
  /// Build a query from already-typed text. Only the registrar alias can
  /// fail here.
  pub fn new(scheme_name: &str, rta: &str, rta_code: &str) -> Result<Self> {
    Ok(Self {
      scheme_name: scheme_name.to_owned(),
      rta:         rta.parse()?,
      rta_code:    rta_code.to_owned(),
      isin:        None,
      min_score:   DEFAULT_MIN_SCORE,
    })
  }

  /// Attach an ISIN hint. Blank strings are treated as no hint.
  pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
    let isin = isin.into();
    self.isin = (!isin.trim().is_empty()).then(|| isin.trim().to_owned());
    self
  }

  pub fn with_min_score(mut self, min_score: u8) -> Result<Self> {
    if min_score > 100 {
      return Err(Error::InvalidInput(format!(
        "min_score must be within 0..=100, got {min_score}"
      )));
    }
    self.min_score = min_score;
    Ok(self)
  }

  pub fn scheme_name(&self) -> &str { &self.scheme_name }

  pub fn rta(&self) -> Rta { self.rta }

  pub fn rta_code(&self) -> &str { &self.rta_code }

  pub fn isin(&self) -> Option<&str> { self.isin.as_deref() }

  pub fn min_score(&self) -> u8 { self.min_score }
}

impl TryFrom<RawSchemeQuery> for SchemeQuery {
  type Error = Error;

  fn try_from(raw: RawSchemeQuery) -> Result<Self> {
    let (Some(scheme_name), Some(rta), Some(rta_code)) =
      (raw.scheme_name, raw.rta, raw.rta_code)
    else {
      return Err(Error::InvalidInput(
        "scheme_name, rta and rta_code must all be text".into(),
      ));
    };

    let mut query = Self::new(&scheme_name, &rta, &rta_code)?;
    if let Some(isin) = raw.isin {
      query = query.with_isin(isin);
    }
    if let Some(min_score) = raw.min_score {
      query = query.with_min_score(min_score)?;
    }
    Ok(query)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(json: &str) -> RawSchemeQuery { serde_json::from_str(json).unwrap() }

  #[test]
  fn null_text_field_is_invalid_input() {
    let err = SchemeQuery::try_from(raw(
      r#"{"scheme_name": null, "rta": "CAMS", "rta_code": "P8024"}"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }

  #[test]
  fn missing_text_field_is_invalid_input() {
    let err =
      SchemeQuery::try_from(raw(r#"{"scheme_name": "x", "rta": "CAMS"}"#)).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }

  #[test]
  fn type_check_runs_before_registrar_check() {
    let err = SchemeQuery::try_from(raw(
      r#"{"scheme_name": null, "rta": "KARVY-OLD", "rta_code": ""}"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }

  #[test]
  fn unknown_registrar_is_rejected() {
    let err = SchemeQuery::try_from(raw(
      r#"{"scheme_name": "", "rta": "KARVY-OLD", "rta_code": ""}"#,
    ))
    .unwrap_err();
    assert_eq!(err, Error::InvalidRegistrar("KARVY-OLD".into()));

    assert!(matches!(
      SchemeQuery::new("", "", ""),
      Err(Error::InvalidRegistrar(_))
    ));
  }

  #[test]
  fn defaults_and_optional_fields() {
    let q = SchemeQuery::try_from(raw(
      r#"{"scheme_name": "Axis Bluechip", "rta": "kfintech", "rta_code": "128TSDGG",
          "isin": "  "}"#,
    ))
    .unwrap();
    assert_eq!(q.rta(), Rta::Karvy);
    assert_eq!(q.isin(), None);
    assert_eq!(q.min_score(), DEFAULT_MIN_SCORE);

    let q = q.with_isin("INF846K01CH7").with_min_score(90).unwrap();
    assert_eq!(q.isin(), Some("INF846K01CH7"));
    assert_eq!(q.min_score(), 90);
  }

  #[test]
  fn min_score_above_hundred_is_invalid_input() {
    let q = SchemeQuery::new("x", "CAMS", "P1").unwrap();
    assert!(matches!(q.with_min_score(101), Err(Error::InvalidInput(_))));
  }
}
