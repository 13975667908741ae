//! The `PriceStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `pricedex-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::{collections::BTreeMap, future::Future};

use crate::{
  filter::CpiFilter,
  record::{CpiRecord, NewCpiRecord, ProductCounters, RecentDate, SurveyCounters},
  survey::{PlanAfter, PlanBefore, SurveyTable},
  tally::CounterDelta,
};

/// Abstraction over a pricedex storage backend.
///
/// Writes are strictly additive: price-index upserts overwrite the observed
/// `value` in place, counter upserts accumulate. Nothing is ever deleted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PriceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Price index ───────────────────────────────────────────────────────

  /// The latest `(year, month)` on record — for one series when `id` is
  /// given, across all series otherwise. `None` on an empty table.
  ///
  /// This is what resolves the `most-recent` date-token sentinel and
  /// bounds live-range expansion.
  fn most_recent(
    &self,
    id: Option<&str>,
  ) -> impl Future<Output = Result<Option<RecentDate>, Self::Error>> + Send + '_;

  /// Select price-index rows matching `filter`. With an empty filter the
  /// builder's safety cap bounds the result.
  fn select_cpi<'a>(
    &'a self,
    filter: &'a CpiFilter,
  ) -> impl Future<Output = Result<Vec<CpiRecord>, Self::Error>> + Send + 'a;

  /// Insert observations, overwriting `value` for any existing
  /// `(id, year, month)`. The `created` timestamp is set by the store on
  /// first insert and never touched again. All rows land atomically.
  fn upsert_cpi(
    &self,
    rows: Vec<NewCpiRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Survey counters ───────────────────────────────────────────────────

  /// Stored survey counter rows — all of them when `ids` is empty,
  /// otherwise only the listed identifiers (missing ones are simply
  /// absent; zero-filling is the caller's concern).
  fn survey_counters<'a>(
    &'a self,
    table: SurveyTable,
    ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<SurveyCounters>, Self::Error>> + Send + 'a;

  /// Accumulate the one counter column addressed by `before`/`after` by 1.
  fn record_survey_event<'a>(
    &'a self,
    table: SurveyTable,
    id: &'a str,
    before: PlanBefore,
    after: PlanAfter,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Product counters ──────────────────────────────────────────────────

  /// Stored product counter rows — all of them when `ids` is empty.
  fn product_counters<'a>(
    &'a self,
    ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<ProductCounters>, Self::Error>> + Send + 'a;

  /// Merge a batch of tallied deltas into the persisted counters,
  /// accumulating on conflict. All deltas land atomically.
  fn apply_product_deltas(
    &self,
    deltas: BTreeMap<String, CounterDelta>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The `limit` most-often-removed products, by removal count descending.
  fn most_removed(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<ProductCounters>, Self::Error>> + Send + '_;
}
