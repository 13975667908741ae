//! SQL schema for the pricedex SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per observation of a price-index series.
-- Upserts overwrite `value` only; `created` is set once.
CREATE TABLE IF NOT EXISTS consumer_price_index (
    id      TEXT    NOT NULL,
    name    TEXT    NOT NULL,
    year    INTEGER NOT NULL,
    month   INTEGER NOT NULL,
    value   REAL    NOT NULL,
    created TEXT    NOT NULL,   -- ISO 8601 UTC; server-assigned
    PRIMARY KEY (id, year, month)
);

CREATE INDEX IF NOT EXISTS cpi_period_idx
    ON consumer_price_index(year DESC, month DESC);

-- Accumulated add/remove event counts per product. Counters only grow.
CREATE TABLE IF NOT EXISTS product_counters (
    id      TEXT PRIMARY KEY,
    added   INTEGER NOT NULL DEFAULT 0,
    removed INTEGER NOT NULL DEFAULT 0
);

-- Survey plan-transition counters, one column per before/after pair.
CREATE TABLE IF NOT EXISTS survey (
    id              TEXT PRIMARY KEY,
    base_base       INTEGER NOT NULL DEFAULT 0,
    base_premium    INTEGER NOT NULL DEFAULT 0,
    base_none       INTEGER NOT NULL DEFAULT 0,
    premium_base    INTEGER NOT NULL DEFAULT 0,
    premium_premium INTEGER NOT NULL DEFAULT 0,
    premium_none    INTEGER NOT NULL DEFAULT 0
);

-- Identical twin of `survey` for integration smoke tests against the live
-- deployment.
CREATE TABLE IF NOT EXISTS survey_test (
    id              TEXT PRIMARY KEY,
    base_base       INTEGER NOT NULL DEFAULT 0,
    base_premium    INTEGER NOT NULL DEFAULT 0,
    base_none       INTEGER NOT NULL DEFAULT 0,
    premium_base    INTEGER NOT NULL DEFAULT 0,
    premium_premium INTEGER NOT NULL DEFAULT 0,
    premium_none    INTEGER NOT NULL DEFAULT 0
);

PRAGMA user_version = 1;
";
