//! SQLite reference store for mutual-fund ISIN lookup.
//!
//! The store is a read-only SQLite file. [`MfIsinDb`] resolves schemes and
//! historical NAVs, [`IsinDb`] looks up generic instruments. Both hold a
//! [`Db`] handle that either keeps one connection open between calls or opens
//! a fresh read-only connection per call.

mod candidates;
mod db;
mod instrument;
mod mf;

pub mod error;
pub mod path;
pub mod schema;

pub use db::Db;
pub use error::{Error, Result};
pub use instrument::IsinDb;
pub use mf::MfIsinDb;
pub use path::{DB_PATH_ENV, default_db_path, resolve_db_path};
