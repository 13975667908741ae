//! Record types for the three persisted entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Price index ─────────────────────────────────────────────────────────────

/// One observation of a price-index series: unique per `(id, year, month)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpiRecord {
  pub id:      String,
  pub name:    String,
  pub year:    i32,
  pub month:   u32,
  pub value:   f64,
  /// Server-assigned on first insert; preserved by later upserts.
  pub created: DateTime<Utc>,
}

/// Input to [`crate::store::PriceStore::upsert_cpi`].
/// `created` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCpiRecord {
  pub id:    String,
  pub name:  String,
  pub year:  i32,
  pub month: u32,
  pub value: f64,
}

/// The latest known period of a series, as returned by
/// [`crate::store::PriceStore::most_recent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDate {
  pub year:    i32,
  pub month:   u32,
  pub created: DateTime<Utc>,
}

// ─── Product counters ────────────────────────────────────────────────────────

/// Accumulated add/remove event counts for one product. Both columns only
/// ever grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCounters {
  pub id:      String,
  pub added:   i64,
  pub removed: i64,
}

// ─── Survey counters ─────────────────────────────────────────────────────────

/// Accumulated survey transition counts for one product, one column per
/// `before`/`after` combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyCounters {
  pub id:              String,
  pub base_base:       i64,
  pub base_premium:    i64,
  pub base_none:       i64,
  pub premium_base:    i64,
  pub premium_premium: i64,
  pub premium_none:    i64,
}

impl SurveyCounters {
  /// An all-zero row for an identifier with no stored counters yet.
  pub fn zeroed(id: impl Into<String>) -> Self {
    Self {
      id:              id.into(),
      base_base:       0,
      base_premium:    0,
      base_none:       0,
      premium_base:    0,
      premium_premium: 0,
      premium_none:    0,
    }
  }
}
