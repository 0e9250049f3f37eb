//! SQL schema of the reference store.
//!
//! The published database is built elsewhere and shipped as a single file;
//! lookups never write to it. This DDL documents the tables and indexes the
//! queries rely on and is used to build stores for tests and tooling.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
-- One row per scheme plan as reported by a registrar. Several rows may share
-- an ISIN (plan renames, reinvest/payout variants); a higher id is newer.
CREATE TABLE IF NOT EXISTS scheme (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    isin       TEXT NOT NULL,
    amfi_code  TEXT,
    rta        TEXT NOT NULL,   -- 'CAMS' | 'FRANKLIN' | 'KARVY'
    rta_code   TEXT NOT NULL,
    amc_code   TEXT,
    type       TEXT NOT NULL
);

-- Historical NAV per ISIN, kept as text to preserve the exact decimal.
CREATE TABLE IF NOT EXISTS nav_snapshot (
    isin  TEXT PRIMARY KEY,
    nav   TEXT NOT NULL,
    date  TEXT              -- YYYY-MM-DD
);

-- Generic instruments (equities, bonds, ...) keyed by ISIN.
CREATE TABLE IF NOT EXISTS isin (
    isin    TEXT PRIMARY KEY,
    name    TEXT NOT NULL,
    issuer  TEXT NOT NULL,
    type    TEXT NOT NULL,
    status  TEXT NOT NULL
);

-- 'version' and 'dbformat'.
CREATE TABLE IF NOT EXISTS meta (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS scheme_rta_code_idx ON scheme(rta, rta_code);
CREATE INDEX IF NOT EXISTS scheme_amc_code_idx ON scheme(rta, amc_code);
CREATE INDEX IF NOT EXISTS scheme_isin_idx     ON scheme(isin);
";
