//! The GET dispatcher — routes on the `table` and `mode` query parameters.
//!
//! | table | mode | Notes |
//! |-------|------|-------|
//! | `consumer-price-index` | `most-recent-date` | optional `id` |
//! | `consumer-price-index` | `select` | optional `ids`, `dates` (or `year` + `month`) |
//! | `consumer-price-index` | `live` | required `start-date`, optional `ids` |
//! | `survey` / `survey_test` | `select` | optional `ids`; missing ids zero-filled |
//! | `products` | `select` | optional `ids` |
//! | `products` | `most-removed` | optional `limit`, default 3 |

use axum::{
  Json,
  extract::{Query, State},
  response::{IntoResponse, Response},
};
use pricedex_core::{
  filter::{CpiFilter, PeriodFilter},
  month::{MOST_RECENT_TOKEN, Month, month_range},
  record::SurveyCounters,
  store::PriceStore,
  survey::SurveyTable,
};
use serde::Deserialize;

use crate::{AppState, error::Error, handlers::split_csv};

/// Default row count for `most-removed` when no `limit` is given.
const DEFAULT_REMOVED_LIMIT: u32 = 3;

#[derive(Debug, Deserialize, Default)]
pub struct GetParams {
  pub table: Option<String>,
  pub mode:  Option<String>,
  /// Single series id, for `most-recent-date`.
  pub id:    Option<String>,
  /// Comma-separated series/product ids.
  pub ids:   Option<String>,
  /// Comma-separated `YYYY-MM` tokens; entries may be the `most-recent`
  /// sentinel.
  pub dates: Option<String>,
  pub year:  Option<i32>,
  pub month: Option<u32>,
  #[serde(rename = "start-date")]
  pub start_date: Option<String>,
  pub limit: Option<u32>,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<GetParams>,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match params.table.as_deref() {
    Some("consumer-price-index") => price_index(&state, &params).await,
    Some("survey") => survey(&state, SurveyTable::Survey, &params).await,
    Some("survey_test") => survey(&state, SurveyTable::SurveyTest, &params).await,
    Some("products") => products(&state, &params).await,
    _ => Err(Error::BadRequest(
      "parameter 'table' is missing or invalid; valid tables: \
       consumer-price-index, survey, survey_test, products"
        .to_owned(),
    )),
  }
}

// ─── consumer-price-index ────────────────────────────────────────────────────

async fn price_index<S>(
  state: &AppState<S>,
  params: &GetParams,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match params.mode.as_deref() {
    Some("most-recent-date") => most_recent_date(state, params).await,
    Some("select") => select(state, params).await,
    Some("live") => live(state, params).await,
    _ => Err(Error::BadRequest(
      "parameter 'mode' is invalid; valid modes for table \
       'consumer-price-index': most-recent-date, select, live"
        .to_owned(),
    )),
  }
}

/// `GET /?table=consumer-price-index&mode=most-recent-date[&id=…]`
async fn most_recent_date<S>(
  state: &AppState<S>,
  params: &GetParams,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = params.id.as_deref().filter(|s| !s.is_empty());
  let recent = state
    .store
    .most_recent(id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(recent).into_response())
}

/// `GET /?table=consumer-price-index&mode=select[&ids=…][&dates=…]`
async fn select<S>(
  state: &AppState<S>,
  params: &GetParams,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let ids = split_csv(params.ids.as_deref());

  let period = if params.dates.is_some() {
    let mut dates = split_csv(params.dates.as_deref());
    resolve_most_recent(state, &mut dates).await?;
    Some(PeriodFilter::Dates(dates))
  } else if let (Some(year), Some(month)) = (params.year, params.month) {
    Some(PeriodFilter::YearMonth { year, month })
  } else {
    None
  };

  let filter = CpiFilter { ids, period };
  let rows = state
    .store
    .select_cpi(&filter)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(rows).into_response())
}

/// `GET /?table=consumer-price-index&mode=live&start-date=…[&ids=…]`
///
/// Expands `start-date` through the most recent month of the reference
/// series into a date filter, then selects.
async fn live<S>(
  state: &AppState<S>,
  params: &GetParams,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let start_raw = params.start_date.as_deref().ok_or_else(|| {
    Error::BadRequest("query parameter 'start-date' is required".to_owned())
  })?;
  let start = Month::parse_start(start_raw)?;

  let end = reference_month(state).await?;
  let months = month_range(start, end)?;
  let dates = months.iter().map(Month::to_string).collect();

  let filter = CpiFilter {
    ids:    split_csv(params.ids.as_deref()),
    period: Some(PeriodFilter::Dates(dates)),
  };
  let rows = state
    .store
    .select_cpi(&filter)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(rows).into_response())
}

/// Replace every `most-recent` sentinel in `dates` with the latest month of
/// the reference series. A no-op when no sentinel is present.
async fn resolve_most_recent<S>(
  state: &AppState<S>,
  dates: &mut [String],
) -> Result<(), Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !dates.iter().any(|d| d == MOST_RECENT_TOKEN) {
    return Ok(());
  }

  let token = reference_month(state).await?.to_string();
  for date in dates.iter_mut() {
    if date == MOST_RECENT_TOKEN {
      *date = token.clone();
    }
  }
  Ok(())
}

/// The latest month on record for the configured reference series.
async fn reference_month<S>(state: &AppState<S>) -> Result<Month, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let recent = state
    .store
    .most_recent(Some(&state.config.reference_id))
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NoReferenceData)?;
  Ok(Month { year: recent.year, month: recent.month })
}

// ─── survey / survey_test ────────────────────────────────────────────────────

/// `GET /?table=survey&mode=select[&ids=…]`
async fn survey<S>(
  state: &AppState<S>,
  table: SurveyTable,
  params: &GetParams,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if params.mode.as_deref() != Some("select") {
    return Err(Error::BadRequest(
      "parameter 'mode' is invalid; valid modes for survey tables: select"
        .to_owned(),
    ));
  }

  let ids = split_csv(params.ids.as_deref());
  let mut rows = state
    .store
    .survey_counters(table, &ids)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  // Requested products with no stored row yet are reported with all
  // counters at zero.
  for id in &ids {
    if !rows.iter().any(|row| &row.id == id) {
      rows.push(SurveyCounters::zeroed(id.clone()));
    }
  }

  Ok(Json(rows).into_response())
}

// ─── products ────────────────────────────────────────────────────────────────

async fn products<S>(
  state: &AppState<S>,
  params: &GetParams,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match params.mode.as_deref() {
    Some("select") => {
      let ids = split_csv(params.ids.as_deref());
      let rows = state
        .store
        .product_counters(&ids)
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;
      Ok(Json(rows).into_response())
    }
    Some("most-removed") => {
      let limit = params.limit.unwrap_or(DEFAULT_REMOVED_LIMIT);
      let rows = state
        .store
        .most_removed(limit)
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;
      Ok(Json(rows).into_response())
    }
    _ => Err(Error::BadRequest(
      "parameter 'mode' is invalid; valid modes for table 'products': \
       select, most-removed"
        .to_owned(),
    )),
  }
}
