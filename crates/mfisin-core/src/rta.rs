//! Registrar and Transfer Agents and the spellings they arrive under.
//!
//! Back-office exports disagree on what to call the same registrar: Franklin
//! Templeton schemes show up as `FTAMIL` or `FRANKLIN`, KFintech is still
//! `KARVY` in the reference store. Every spelling maps onto one of three
//! canonical registrars; anything else is rejected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Canonical registrar identifier as stored in the `scheme.rta` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rta {
  Cams,
  Franklin,
  Karvy,
}

/// Accepted input spellings, compared case-insensitively.
const RTA_ALIASES: &[(&str, Rta)] = &[
  ("CAMS", Rta::Cams),
  ("FTAMIL", Rta::Franklin),
  ("FRANKLIN", Rta::Franklin),
  ("KFINTECH", Rta::Karvy),
  ("KARVY", Rta::Karvy),
];

impl Rta {
  /// Resolve an input spelling to its canonical registrar.
  pub fn from_alias(alias: &str) -> Option<Self> {
    RTA_ALIASES
      .iter()
      .find(|(name, _)| name.eq_ignore_ascii_case(alias))
      .map(|(_, rta)| *rta)
  }

  /// The value stored in the reference store's `rta` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Rta::Cams => "CAMS",
      Rta::Franklin => "FRANKLIN",
      Rta::Karvy => "KARVY",
    }
  }
}

impl fmt::Display for Rta {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Rta {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_alias(s).ok_or_else(|| Error::InvalidRegistrar(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aliases_resolve_case_insensitively() {
    assert_eq!(Rta::from_alias("cams"), Some(Rta::Cams));
    assert_eq!(Rta::from_alias("FTAMIL"), Some(Rta::Franklin));
    assert_eq!(Rta::from_alias("Franklin"), Some(Rta::Franklin));
    assert_eq!(Rta::from_alias("kfintech"), Some(Rta::Karvy));
    assert_eq!(Rta::from_alias("KARVY"), Some(Rta::Karvy));
  }

  #[test]
  fn unknown_alias_is_invalid_registrar() {
    assert_eq!(
      "KARVY-OLD".parse::<Rta>(),
      Err(Error::InvalidRegistrar("KARVY-OLD".into()))
    );
    assert!("".parse::<Rta>().is_err());
  }

  #[test]
  fn display_is_canonical_column_value() {
    assert_eq!("ftamil".parse::<Rta>().unwrap().to_string(), "FRANKLIN");
  }
}
