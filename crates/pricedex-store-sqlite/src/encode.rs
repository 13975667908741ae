//! Encoding and decoding helpers between Rust domain types and the plain
//! scalar representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; everything else maps directly
//! to TEXT/INTEGER/REAL columns.

use chrono::{DateTime, Utc};
use pricedex_core::{
  filter::BindValue,
  record::{CpiRecord, RecentDate},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Bind values ─────────────────────────────────────────────────────────────

/// Convert the builder's backend-neutral bind values into rusqlite params.
/// Order is preserved — it must match the placeholders in the clause.
pub fn bind_args(args: Vec<BindValue>) -> Vec<rusqlite::types::Value> {
  args
    .into_iter()
    .map(|arg| match arg {
      BindValue::Text(s) => rusqlite::types::Value::Text(s),
      BindValue::Int(i) => rusqlite::types::Value::Integer(i),
    })
    .collect()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw scalars read directly from a `consumer_price_index` row.
pub struct RawCpiRecord {
  pub id:      String,
  pub name:    String,
  pub year:    i32,
  pub month:   u32,
  pub value:   f64,
  pub created: String,
}

impl RawCpiRecord {
  pub fn into_record(self) -> Result<CpiRecord> {
    Ok(CpiRecord {
      id:      self.id,
      name:    self.name,
      year:    self.year,
      month:   self.month,
      value:   self.value,
      created: decode_dt(&self.created)?,
    })
  }
}

/// Raw scalars of a most-recent-period lookup.
pub struct RawRecentDate {
  pub year:    i32,
  pub month:   u32,
  pub created: String,
}

impl RawRecentDate {
  pub fn into_recent(self) -> Result<RecentDate> {
    Ok(RecentDate {
      year:    self.year,
      month:   self.month,
      created: decode_dt(&self.created)?,
    })
  }
}
