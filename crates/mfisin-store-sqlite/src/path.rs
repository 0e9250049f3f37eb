//! Locating the store file.

use std::{
  ffi::OsString,
  path::{Path, PathBuf},
};

/// Environment variable that overrides the packaged store location.
pub const DB_PATH_ENV: &str = "MFISIN_DB";

/// The store shipped alongside this crate.
pub fn default_db_path() -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("isin.db")
}

/// `$MFISIN_DB` if it names an existing regular file, otherwise
/// [`default_db_path`].
pub fn resolve_db_path() -> PathBuf { resolve_db_path_from(std::env::var_os(DB_PATH_ENV)) }

pub(crate) fn resolve_db_path_from(env_value: Option<OsString>) -> PathBuf {
  match env_value.map(PathBuf::from) {
    Some(path) if path.is_file() => path,
    Some(path) => {
      tracing::debug!(?path, "{DB_PATH_ENV} does not name a file, using packaged store");
      default_db_path()
    }
    None => default_db_path(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn existing_file_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("isin_test.db");
    std::fs::write(&path, "test").unwrap();

    let resolved = resolve_db_path_from(Some(path.clone().into_os_string()));
    assert_eq!(resolved, path);
  }

  #[test]
  fn missing_file_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("isin_test.db");

    let resolved = resolve_db_path_from(Some(path.into_os_string()));
    assert_eq!(resolved, default_db_path());
    assert_eq!(resolved.file_name().unwrap(), "isin.db");
  }

  #[test]
  fn directory_is_not_a_store() {
    let dir = tempfile::tempdir().unwrap();
    let resolved = resolve_db_path_from(Some(dir.path().as_os_str().to_owned()));
    assert_eq!(resolved, default_db_path());
  }

  #[test]
  fn unset_uses_default() {
    assert_eq!(resolve_db_path_from(None), default_db_path());
  }
}
