//! Database sync client.
//!
//! [`DbSync`] pulls the remote metadata through a [`RemoteSource`], decides
//! whether the local store should be replaced, and if so downloads the full
//! database into a temporary file next to the store and renames it into
//! place. Readers never observe a half-written store, and any fetch failure
//! leaves the existing file byte-for-byte untouched.

use std::{
  fs,
  io::Write as _,
  path::{Path, PathBuf},
};

use mfisin_core::{DbMeta, DbVersion};
use mfisin_store_sqlite::MfIsinDb;
use reqwest::{
  Client,
  header::{HeaderMap, HeaderName, HeaderValue},
};
use tempfile::NamedTempFile;

use crate::{CLI_VERSION, SyncError, config::SyncConfig};

// ─── Remote source ───────────────────────────────────────────────────────────

/// Where the published metadata and database come from.
pub trait RemoteSource {
  /// The raw `key=value` metadata file.
  async fn fetch_metadata(&self) -> Result<String, SyncError>;

  /// The complete database file.
  async fn fetch_database(&self) -> Result<Vec<u8>, SyncError>;
}

/// [`RemoteSource`] over HTTP(S).
///
/// Requests identify themselves with a `mfisin <version>` user agent and an
/// `x-origin-mfisin` marker header, and are bounded by the configured
/// timeout.
#[derive(Clone)]
pub struct HttpSource {
  client:   Client,
  meta_url: String,
  db_url:   String,
}

impl HttpSource {
  pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
    let mut headers = HeaderMap::new();
    headers.insert(
      HeaderName::from_static("x-origin-mfisin"),
      HeaderValue::from_static("true"),
    );

    let client = Client::builder()
      .user_agent(format!("mfisin {CLI_VERSION}"))
      .default_headers(headers)
      .timeout(config.timeout())
      .build()
      .map_err(|e| SyncError::FetchFailed(format!("failed to build HTTP client: {e}")))?;

    Ok(Self {
      client,
      meta_url: config.meta_url.clone(),
      db_url: config.db_url.clone(),
    })
  }

  async fn get(&self, url: &str) -> Result<reqwest::Response, SyncError> {
    self
      .client
      .get(url)
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(|e| SyncError::FetchFailed(e.to_string()))
  }
}

impl RemoteSource for HttpSource {
  async fn fetch_metadata(&self) -> Result<String, SyncError> {
    self
      .get(&self.meta_url)
      .await?
      .text()
      .await
      .map_err(|e| SyncError::FetchFailed(e.to_string()))
  }

  async fn fetch_database(&self) -> Result<Vec<u8>, SyncError> {
    let body = self
      .get(&self.db_url)
      .await?
      .bytes()
      .await
      .map_err(|e| SyncError::FetchFailed(e.to_string()))?;
    Ok(body.to_vec())
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
  Updated { version: DbVersion },
  AlreadyCurrent,
  /// Metadata or database download failed; nothing was written.
  FetchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
  UpdateAvailable { local: DbMeta, remote: DbMeta },
  UpToDate,
  FetchFailed(String),
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct DbSync<S> {
  source:  S,
  db_path: PathBuf,
}

impl<S: RemoteSource> DbSync<S> {
  pub fn new(source: S, db_path: impl Into<PathBuf>) -> Self {
    Self { source, db_path: db_path.into() }
  }

  pub fn db_path(&self) -> &Path { &self.db_path }

  /// Metadata of the local store. The connection is released on return.
  pub fn current_metadata(&self) -> Result<DbMeta, SyncError> {
    Ok(MfIsinDb::open(&self.db_path).metadata()?)
  }

  /// [`current_metadata`](Self::current_metadata) off the async runtime.
  async fn local_metadata(&self) -> Result<DbMeta, SyncError> {
    let path = self.db_path.clone();
    tokio::task::spawn_blocking(move || MfIsinDb::open(&path).metadata())
      .await
      .map_err(std::io::Error::other)?
      .map_err(SyncError::from)
  }

  /// Fetch and parse the remote metadata file.
  pub async fn remote_metadata(&self) -> Result<DbMeta, SyncError> {
    tracing::info!("Fetching remote isin db metadata");
    let text = self.source.fetch_metadata().await?;
    DbMeta::parse_remote(&text).map_err(|e| SyncError::FetchFailed(e.to_string()))
  }

  /// Compare local and remote metadata without downloading anything else.
  pub async fn check(&self) -> Result<UpdateCheck, SyncError> {
    let Some((local, remote)) = self.compare().await? else {
      return Ok(UpdateCheck::FetchFailed("remote metadata unavailable".into()));
    };

    if local.accepts_update_from(&remote) {
      Ok(UpdateCheck::UpdateAvailable { local, remote })
    } else {
      Ok(UpdateCheck::UpToDate)
    }
  }

  /// Replace the local store if the remote copy is newer and format
  /// compatible.
  pub async fn sync(&self) -> Result<SyncStatus, SyncError> {
    let Some((local, remote)) = self.compare().await? else {
      return Ok(SyncStatus::FetchFailed("remote metadata unavailable".into()));
    };

    if !local.accepts_update_from(&remote) {
      tracing::info!("isin database is already up to date");
      return Ok(SyncStatus::AlreadyCurrent);
    }

    tracing::info!("Fetching database version :: {}", remote.version);
    let blob = match self.source.fetch_database().await {
      Ok(blob) => blob,
      Err(SyncError::FetchFailed(reason)) => {
        tracing::error!("Error fetching isin database :: {reason}");
        return Ok(SyncStatus::FetchFailed(reason));
      }
      Err(e) => return Err(e),
    };

    self.replace_store(&blob)?;
    tracing::info!("Updated isin database.");
    Ok(SyncStatus::Updated { version: remote.version })
  }

  /// Local and remote metadata, or `None` if the remote side failed.
  async fn compare(&self) -> Result<Option<(DbMeta, DbMeta)>, SyncError> {
    let local = self.local_metadata().await?;
    let remote = match self.remote_metadata().await {
      Ok(remote) => remote,
      Err(SyncError::FetchFailed(reason)) => {
        tracing::error!("Received error from remote server :: {reason}");
        return Ok(None);
      }
      Err(e) => return Err(e),
    };

    tracing::info!("Local db version : {}", local.version);
    tracing::info!("Remote db version : {}", remote.version);
    Ok(Some((local, remote)))
  }

  /// Write `blob` beside the store and atomically rename it over the store.
  /// The replacement keeps the permissions of the file it replaces.
  fn replace_store(&self, blob: &[u8]) -> Result<(), SyncError> {
    let dir = match self.db_path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    if let Ok(existing) = fs::metadata(&self.db_path) {
      staged.as_file().set_permissions(existing.permissions())?;
    }
    staged.write_all(blob)?;
    staged.as_file().sync_all()?;
    staged.persist(&self.db_path).map_err(|e| e.error)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  const LOCAL_VERSION: &str = "2025.2.27";

  /// In-process stand-in for the publishing server.
  #[derive(Default)]
  struct FakeRemote {
    metadata:     Option<String>,
    database:     Option<Vec<u8>>,
    db_downloads: AtomicUsize,
  }

  impl FakeRemote {
    fn new(version: &str, dbformat: &str) -> Self {
      Self {
        metadata: Some(format!("version={version}\ndbformat={dbformat}")),
        database: Some(b"mock_data".to_vec()),
        ..Default::default()
      }
    }
  }

  impl RemoteSource for FakeRemote {
    async fn fetch_metadata(&self) -> Result<String, SyncError> {
      self
        .metadata
        .clone()
        .ok_or_else(|| SyncError::FetchFailed("Mock HTTP Error".into()))
    }

    async fn fetch_database(&self) -> Result<Vec<u8>, SyncError> {
      self.db_downloads.fetch_add(1, Ordering::SeqCst);
      self
        .database
        .clone()
        .ok_or_else(|| SyncError::FetchFailed("Mock HTTP Error".into()))
    }
  }

  fn local_store(dir: &Path) -> PathBuf {
    let path = dir.join("isin.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(mfisin_store_sqlite::schema::SCHEMA)
      .unwrap();
    conn
      .execute(
        "INSERT INTO meta (key, value) VALUES ('version', ?1), ('dbformat', '1')",
        [LOCAL_VERSION],
      )
      .unwrap();
    conn.close().unwrap();
    path
  }

  #[tokio::test]
  async fn newer_remote_replaces_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    let sync = DbSync::new(FakeRemote::new("3099.01.01", "1"), &path);

    let status = sync.sync().await.unwrap();
    assert_eq!(status, SyncStatus::Updated { version: "3099.1.1".parse().unwrap() });
    assert_eq!(std::fs::read(&path).unwrap(), b"mock_data");
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn replacement_keeps_store_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    let sync = DbSync::new(FakeRemote::new("3099.01.01", "1"), &path);

    assert!(matches!(sync.sync().await.unwrap(), SyncStatus::Updated { .. }));
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
  }

  #[tokio::test]
  async fn unchanged_remote_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    let before = std::fs::read(&path).unwrap();
    let sync = DbSync::new(FakeRemote::new(LOCAL_VERSION, "1"), &path);

    assert_eq!(sync.sync().await.unwrap(), SyncStatus::AlreadyCurrent);
    assert_eq!(sync.sync().await.unwrap(), SyncStatus::AlreadyCurrent);
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(sync.source.db_downloads.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn older_remote_or_other_format_never_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());

    let older = DbSync::new(FakeRemote::new("1990.01.01", "1"), &path);
    assert_eq!(older.sync().await.unwrap(), SyncStatus::AlreadyCurrent);

    let other_format = DbSync::new(FakeRemote::new("3099.01.01", "2"), &path);
    assert_eq!(other_format.sync().await.unwrap(), SyncStatus::AlreadyCurrent);
    assert_eq!(other_format.check().await.unwrap(), UpdateCheck::UpToDate);
  }

  #[tokio::test]
  async fn metadata_failure_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    let before = std::fs::read(&path).unwrap();
    let remote = FakeRemote { metadata: None, ..FakeRemote::new("3099.01.01", "1") };
    let sync = DbSync::new(remote, &path);

    assert!(matches!(sync.sync().await.unwrap(), SyncStatus::FetchFailed(_)));
    assert!(matches!(sync.check().await.unwrap(), UpdateCheck::FetchFailed(_)));
    assert_eq!(std::fs::read(&path).unwrap(), before);
  }

  #[tokio::test]
  async fn malformed_metadata_is_a_fetch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    let remote = FakeRemote {
      metadata: Some("<html>gateway timeout</html>".into()),
      ..FakeRemote::new("3099.01.01", "1")
    };

    let status = DbSync::new(remote, &path).sync().await.unwrap();
    assert!(matches!(status, SyncStatus::FetchFailed(_)));
  }

  #[tokio::test]
  async fn blob_failure_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    let before = std::fs::read(&path).unwrap();
    let remote = FakeRemote { database: None, ..FakeRemote::new("3099.01.01", "1") };
    let sync = DbSync::new(remote, &path);

    assert_eq!(
      sync.sync().await.unwrap(),
      SyncStatus::FetchFailed("Mock HTTP Error".into())
    );
    assert_eq!(std::fs::read(&path).unwrap(), before);
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
  }

  #[tokio::test]
  async fn check_reports_available_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = local_store(dir.path());
    let sync = DbSync::new(FakeRemote::new("3099.01.01", "1"), &path);

    match sync.check().await.unwrap() {
      UpdateCheck::UpdateAvailable { local, remote } => {
        assert_eq!(local.version.to_string(), LOCAL_VERSION);
        assert_eq!(remote.version.to_string(), "3099.1.1");
      }
      other => panic!("expected an available update, got {other:?}"),
    }
    assert_eq!(sync.source.db_downloads.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn missing_local_store_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let sync = DbSync::new(FakeRemote::new("3099.01.01", "1"), dir.path().join("none.db"));
    assert!(matches!(sync.sync().await, Err(SyncError::Store(_))));
  }
}
