//! Sync client configuration.
//!
//! Read from an optional TOML file, then overridden by `MFISIN_*`
//! environment variables (e.g. `MFISIN_META_URL`, `MFISIN_TIMEOUT_SECS`).

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use mfisin_store_sqlite::resolve_db_path;
use serde::Deserialize;

pub const DEFAULT_META_URL: &str = "https://casparser.atomcoder.com/isin.db.meta";
pub const DEFAULT_DB_URL: &str = "https://casparser.atomcoder.com/isin.db";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  #[serde(default = "default_meta_url")]
  pub meta_url:     String,
  #[serde(default = "default_db_url")]
  pub db_url:       String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Explicit store location; otherwise resolved via `MFISIN_DB` or the
  /// packaged default.
  #[serde(default)]
  pub db_path:      Option<PathBuf>,
}

fn default_meta_url() -> String { DEFAULT_META_URL.to_owned() }

fn default_db_url() -> String { DEFAULT_DB_URL.to_owned() }

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      meta_url:     default_meta_url(),
      db_url:       default_db_url(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      db_path:      None,
    }
  }
}

impl SyncConfig {
  /// Load `file` (if it exists) layered under the environment.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("MFISIN"))
      .build()?
      .try_deserialize()
  }

  pub fn db_path(&self) -> PathBuf { self.db_path.clone().unwrap_or_else(resolve_db_path) }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = SyncConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.meta_url, DEFAULT_META_URL);
    assert_eq!(cfg.db_url, DEFAULT_DB_URL);
    assert_eq!(cfg.timeout(), Duration::from_secs(30));
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("mfisin.toml");
    std::fs::write(
      &file,
      "meta_url = \"http://localhost:8080/isin.db.meta\"\ntimeout_secs = 5\ndb_path = \"/srv/isin.db\"\n",
    )
    .unwrap();

    let cfg = SyncConfig::load(&file).unwrap();
    assert_eq!(cfg.meta_url, "http://localhost:8080/isin.db.meta");
    assert_eq!(cfg.db_url, DEFAULT_DB_URL);
    assert_eq!(cfg.timeout_secs, 5);
    assert_eq!(cfg.db_path(), PathBuf::from("/srv/isin.db"));
  }
}
