//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use pricedex_core::{
  filter::{CpiFilter, PeriodFilter},
  record::NewCpiRecord,
  store::PriceStore,
  survey::{PlanAfter, PlanBefore, SurveyTable},
  tally::CounterDelta,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn obs(id: &str, year: i32, month: u32, value: f64) -> NewCpiRecord {
  NewCpiRecord {
    id: id.into(),
    name: format!("series {id}"),
    year,
    month,
    value,
  }
}

fn ids(list: &[&str]) -> Vec<String> {
  list.iter().map(|s| (*s).to_owned()).collect()
}

// ─── Most recent ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn most_recent_on_empty_table_is_none() {
  let s = store().await;
  assert!(s.most_recent(None).await.unwrap().is_none());
}

#[tokio::test]
async fn most_recent_overall() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("a", 2019, 12, 1.0),
    obs("a", 2020, 2, 1.1),
    obs("b", 2020, 1, 2.0),
  ])
  .await
  .unwrap();

  let recent = s.most_recent(None).await.unwrap().unwrap();
  assert_eq!((recent.year, recent.month), (2020, 2));
}

#[tokio::test]
async fn most_recent_for_one_series() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("a", 2020, 2, 1.1),
    obs("b", 2021, 6, 2.0),
  ])
  .await
  .unwrap();

  let recent = s.most_recent(Some("a")).await.unwrap().unwrap();
  assert_eq!((recent.year, recent.month), (2020, 2));

  assert!(s.most_recent(Some("zzz")).await.unwrap().is_none());
}

// ─── Select ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_by_ids_only() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("a", 2020, 1, 1.0),
    obs("a", 2020, 2, 1.1),
    obs("b", 2020, 1, 2.0),
  ])
  .await
  .unwrap();

  let filter = CpiFilter { ids: ids(&["a"]), period: None };
  let rows = s.select_cpi(&filter).await.unwrap();

  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.id == "a"));
}

#[tokio::test]
async fn select_by_dates_drops_malformed_tokens() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("a", 2020, 1, 1.0),
    obs("a", 2020, 2, 1.1),
    obs("b", 2020, 1, 2.0),
  ])
  .await
  .unwrap();

  let filter = CpiFilter {
    ids:    Vec::new(),
    period: Some(PeriodFilter::Dates(ids(&["2020-01", "junk"]))),
  };
  let rows = s.select_cpi(&filter).await.unwrap();

  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| (r.year, r.month) == (2020, 1)));
}

#[tokio::test]
async fn select_by_year_month_pair_and_ids() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("a", 2020, 1, 1.0),
    obs("a", 2020, 2, 1.1),
    obs("b", 2020, 2, 2.0),
  ])
  .await
  .unwrap();

  let filter = CpiFilter {
    ids:    ids(&["a"]),
    period: Some(PeriodFilter::YearMonth { year: 2020, month: 2 }),
  };
  let rows = s.select_cpi(&filter).await.unwrap();

  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].id, "a");
  assert_eq!(rows[0].value, 1.1);
}

#[tokio::test]
async fn unfiltered_select_is_capped_at_ten() {
  let s = store().await;
  let rows = (1..=12).map(|m| obs("a", 2020, m, f64::from(m))).collect();
  s.upsert_cpi(rows).await.unwrap();

  let fetched = s.select_cpi(&CpiFilter::default()).await.unwrap();
  assert_eq!(fetched.len(), 10);
}

#[tokio::test]
async fn select_orders_by_period_then_id() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("b", 2020, 2, 2.0),
    obs("a", 2020, 2, 1.1),
    obs("a", 2020, 1, 1.0),
  ])
  .await
  .unwrap();

  let filter = CpiFilter { ids: ids(&["a", "b"]), period: None };
  let rows = s.select_cpi(&filter).await.unwrap();

  let keys: Vec<_> = rows.iter().map(|r| (r.year, r.month, r.id.as_str())).collect();
  assert_eq!(keys, [(2020, 1, "a"), (2020, 2, "a"), (2020, 2, "b")]);
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_overwrites_value_and_keeps_created() {
  let s = store().await;
  s.upsert_cpi(vec![obs("a", 2020, 1, 1.0)]).await.unwrap();

  let filter = CpiFilter { ids: ids(&["a"]), period: None };
  let first = s.select_cpi(&filter).await.unwrap();
  let original_created = first[0].created;

  s.upsert_cpi(vec![obs("a", 2020, 1, 9.9)]).await.unwrap();

  let rows = s.select_cpi(&filter).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].value, 9.9);
  assert_eq!(rows[0].created, original_created);
}

#[tokio::test]
async fn upsert_batch_is_atomic_per_key() {
  let s = store().await;
  s.upsert_cpi(vec![
    obs("a", 2020, 1, 1.0),
    obs("a", 2020, 1, 2.0),
  ])
  .await
  .unwrap();

  let filter = CpiFilter { ids: ids(&["a"]), period: None };
  let rows = s.select_cpi(&filter).await.unwrap();

  // The second row of the batch wins on the shared key.
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].value, 2.0);
}

// ─── Survey counters ─────────────────────────────────────────────────────────

#[tokio::test]
async fn survey_event_accumulates_one_column() {
  let s = store().await;
  s.record_survey_event(SurveyTable::Survey, "p1", PlanBefore::Premium, PlanAfter::None)
    .await
    .unwrap();
  s.record_survey_event(SurveyTable::Survey, "p1", PlanBefore::Premium, PlanAfter::None)
    .await
    .unwrap();
  s.record_survey_event(SurveyTable::Survey, "p1", PlanBefore::Base, PlanAfter::Premium)
    .await
    .unwrap();

  let rows = s
    .survey_counters(SurveyTable::Survey, &ids(&["p1"]))
    .await
    .unwrap();

  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].premium_none, 2);
  assert_eq!(rows[0].base_premium, 1);
  assert_eq!(rows[0].base_base, 0);
}

#[tokio::test]
async fn survey_tables_are_independent() {
  let s = store().await;
  s.record_survey_event(SurveyTable::Survey, "p1", PlanBefore::Base, PlanAfter::Base)
    .await
    .unwrap();

  let test_rows = s
    .survey_counters(SurveyTable::SurveyTest, &[])
    .await
    .unwrap();
  assert!(test_rows.is_empty());
}

#[tokio::test]
async fn survey_counters_filters_by_ids() {
  let s = store().await;
  s.record_survey_event(SurveyTable::Survey, "p1", PlanBefore::Base, PlanAfter::None)
    .await
    .unwrap();
  s.record_survey_event(SurveyTable::Survey, "p2", PlanBefore::Base, PlanAfter::None)
    .await
    .unwrap();

  let rows = s
    .survey_counters(SurveyTable::Survey, &ids(&["p2", "missing"]))
    .await
    .unwrap();

  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].id, "p2");
}

// ─── Product counters ────────────────────────────────────────────────────────

fn deltas(entries: &[(&str, u64, u64)]) -> BTreeMap<String, CounterDelta> {
  entries
    .iter()
    .map(|(id, added, removed)| {
      ((*id).to_owned(), CounterDelta { added: *added, removed: *removed })
    })
    .collect()
}

#[tokio::test]
async fn product_deltas_accumulate_across_batches() {
  let s = store().await;
  s.apply_product_deltas(deltas(&[("a", 2, 0), ("b", 1, 1)]))
    .await
    .unwrap();
  s.apply_product_deltas(deltas(&[("a", 1, 3)])).await.unwrap();

  let rows = s.product_counters(&[]).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!((rows[0].added, rows[0].removed), (3, 3));
  assert_eq!((rows[1].added, rows[1].removed), (1, 1));
}

#[tokio::test]
async fn product_counters_filters_by_ids() {
  let s = store().await;
  s.apply_product_deltas(deltas(&[("a", 1, 0), ("b", 1, 0)]))
    .await
    .unwrap();

  let rows = s.product_counters(&ids(&["b"])).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].id, "b");
}

#[tokio::test]
async fn most_removed_orders_and_limits() {
  let s = store().await;
  s.apply_product_deltas(deltas(&[("a", 0, 5), ("b", 0, 1), ("c", 0, 3)]))
    .await
    .unwrap();

  let top = s.most_removed(2).await.unwrap();
  let order: Vec<_> = top.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(order, ["a", "c"]);
}
