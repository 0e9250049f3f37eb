//! Core types and resolution rules for mutual-fund ISIN lookup.
//!
//! This crate is deliberately free of database and HTTP dependencies. It owns
//! the registrar alias table, query validation, the candidate filter rules,
//! and the fuzzy resolver that picks a single scheme among candidates.

pub mod error;
pub mod filter;
pub mod fuzzy;
pub mod meta;
pub mod query;
pub mod rta;
pub mod scheme;

pub use error::{Error, Result};
pub use filter::{CodeMatch, FilterPlan, NameClause};
pub use meta::{DbMeta, DbVersion};
pub use query::{DEFAULT_MIN_SCORE, RawSchemeQuery, SchemeQuery};
pub use rta::Rta;
pub use scheme::{InstrumentRecord, NavSnapshot, SchemeCandidate, SchemeData};
