//! [`Db`] — a read-only handle on the store file.
//!
//! A handle either holds one connection between [`Db::initialize`] and
//! [`Db::close`], or, when nothing is held, opens a connection for the
//! duration of a single call. A per-call connection is owned by that call's
//! stack frame and released on every exit path, errors included; a held
//! connection is only ever borrowed by calls and is released on `close` or
//! drop.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Params, Row, types::ValueRef};

use crate::{Result, path::resolve_db_path};

pub struct Db {
  path: PathBuf,
  conn: Option<Connection>,
}

impl Db {
  /// A handle on the store at `path`. No connection is opened yet.
  pub fn open(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf(), conn: None }
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Open and hold a connection for subsequent calls. No-op if one is held.
  pub fn initialize(&mut self) -> Result<()> {
    if self.conn.is_none() {
      self.conn = Some(connect(&self.path)?);
      tracing::debug!(path = ?self.path, "opened isin database");
    }
    Ok(())
  }

  /// Release the held connection, if any.
  pub fn close(&mut self) -> Result<()> {
    if let Some(conn) = self.conn.take() {
      conn.close().map_err(|(_, e)| e)?;
      tracing::debug!(path = ?self.path, "closed isin database");
    }
    Ok(())
  }

  pub fn is_connected(&self) -> bool { self.conn.is_some() }

  /// Run `f` against the held connection, or against a connection opened
  /// just for this call.
  pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    match &self.conn {
      Some(conn) => f(conn),
      None => {
        let conn = connect(&self.path)?;
        f(&conn)
      }
    }
  }

  /// Execute `sql` and map every row through `map`. Columns are read by name.
  pub fn query<T>(
    &self,
    sql: &str,
    params: impl Params,
    mut map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Vec<T>> {
    self.with_connection(|conn| {
      let mut stmt = conn.prepare(sql)?;
      let rows = stmt
        .query_map(params, |row| map(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
  }

  /// Execute `sql` and map the first row, if any.
  pub fn query_one<T>(
    &self,
    sql: &str,
    params: impl Params,
    map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Option<T>> {
    self.with_connection(|conn| {
      let mut stmt = conn.prepare(sql)?;
      let mut rows = stmt.query(params)?;
      Ok(rows.next()?.map(map).transpose()?)
    })
  }
}

impl Default for Db {
  /// A handle on the store at [`resolve_db_path`].
  fn default() -> Self { Self::open(resolve_db_path()) }
}

fn connect(path: &Path) -> Result<Connection> {
  let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
  Ok(Connection::open_with_flags(path, flags)?)
}

/// Read a column as text whatever its storage class. Registrar exports are
/// loose about whether codes are numbers or strings.
pub(crate) fn text_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<String>> {
  Ok(match row.get_ref(column)? {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(i.to_string()),
    ValueRef::Real(f) => Some(f.to_string()),
    ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
  })
}

/// Like [`text_column`] for columns that are never NULL in a valid store.
pub(crate) fn required_text(row: &Row<'_>, column: &str) -> rusqlite::Result<String> {
  Ok(text_column(row, column)?.unwrap_or_default())
}
