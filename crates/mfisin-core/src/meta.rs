//! Reference store versioning.
//!
//! Both the local store (`meta` table) and the remote metadata file describe
//! the database with two versions: `version`, which increases with every
//! data refresh, and `dbformat`, which changes only when the schema does.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use semver::{Prerelease, Version};

use crate::{Error, Result};

/// Release segments, then an optional pre-release tag (`1.0rc1`, `2.0-b2`).
static RELEASE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(concat!(
    r"(?i)^([0-9]+(?:\.[0-9]+)*)",
    r"(?:[-_.]?(a|alpha|b|beta|c|rc|pre|preview)[-_.]?([0-9]+)?)?$",
  ))
  .expect("valid release regex")
});

// ─── DbVersion ───────────────────────────────────────────────────────────────

/// A dotted release version such as `2025.2.27`, `3099.01.01` or `1`.
///
/// Published versions are not strict semver (one or two segments, leading
/// zeros, `rc1`-style tags), so they are mapped onto [`semver::Version`] for
/// ordering: missing segments are zero, `1` == `1.0.0`, and a pre-release
/// sorts before its release. Segments past the third must be zero.
#[derive(Debug, Clone)]
pub struct DbVersion {
  version: Version,
  display: String,
}

impl DbVersion {
  pub fn as_semver(&self) -> &Version { &self.version }
}

impl FromStr for DbVersion {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidVersion(s.to_owned());
    let caps = RELEASE.captures(s.trim()).ok_or_else(invalid)?;

    let segments = caps[1]
      .split('.')
      .map(str::parse::<u64>)
      .collect::<Result<Vec<_>, _>>()
      .map_err(|_| invalid())?;
    if segments.iter().skip(3).any(|seg| *seg != 0) {
      return Err(invalid());
    }
    let segment = |i: usize| segments.get(i).copied().unwrap_or(0);
    let mut version = Version::new(segment(0), segment(1), segment(2));

    let mut display = segments.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
    if let Some(tag) = caps.get(2) {
      let tag = match tag.as_str().to_ascii_lowercase().as_str() {
        "a" | "alpha" => "a",
        "b" | "beta" => "b",
        _ => "rc",
      };
      let number = caps
        .get(3)
        .map_or(Ok(0), |n| n.as_str().parse::<u64>())
        .map_err(|_| invalid())?;
      version.pre = Prerelease::new(&format!("{tag}.{number}")).map_err(|_| invalid())?;
      display.push_str(&format!("{tag}{number}"));
    }

    Ok(Self { version, display })
  }
}

impl fmt::Display for DbVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.display) }
}

impl PartialEq for DbVersion {
  fn eq(&self, other: &Self) -> bool { self.version == other.version }
}

impl Eq for DbVersion {}

impl PartialOrd for DbVersion {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for DbVersion {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.version.cmp(&other.version) }
}

impl std::hash::Hash for DbVersion {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.version.hash(state); }
}

// ─── DbMeta ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbMeta {
  pub version:  DbVersion,
  pub dbformat: DbVersion,
}

impl DbMeta {
  /// Build from `(key, value)` pairs; unknown keys are ignored.
  pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
  where
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut version = None;
    let mut dbformat = None;
    for (key, value) in pairs {
      match key.as_ref() {
        "version" => version = Some(value.as_ref().parse()?),
        "dbformat" => dbformat = Some(value.as_ref().parse()?),
        _ => {}
      }
    }
    Ok(Self {
      version:  version.ok_or_else(|| Error::MalformedMetadata("missing version".into()))?,
      dbformat: dbformat.ok_or_else(|| Error::MalformedMetadata("missing dbformat".into()))?,
    })
  }

  /// Parse the remote metadata file: newline-separated `key=value` lines.
  /// Lines that are not exactly one `key=value` pair are skipped.
  pub fn parse_remote(text: &str) -> Result<Self> {
    Self::from_pairs(text.lines().filter_map(|line| {
      let mut parts = line.split('=');
      match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Some((key.trim(), value.trim())),
        _ => None,
      }
    }))
  }

  /// Whether `remote` should replace a store described by `self`: it must be
  /// strictly newer and share the exact same format.
  pub fn accepts_update_from(&self, remote: &DbMeta) -> bool {
    remote.version > self.version && remote.dbformat == self.dbformat
  }
}
