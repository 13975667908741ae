//! The POST dispatcher — bearer-authorized writes, routed on `table`.
//!
//! | table | Body | Effect |
//! |-------|------|--------|
//! | `consumer-price-index` | one record or an array of records | upsert, overwrite `value` |
//! | `survey` / `survey_test` | `{"id", "before", "after"}` | accumulate one counter by 1 |
//! | `products` | `{"added": […], "removed": […]}` | tally events, accumulate counters |

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use pricedex_core::{
  record::NewCpiRecord,
  store::PriceStore,
  survey::{PlanAfter, PlanBefore, SurveyTable},
  tally::tally_events,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{AppState, auth::verify_bearer, error::Error};

#[derive(Debug, Deserialize)]
pub struct PostParams {
  pub table: Option<String>,
}

/// One record or a batch — both wire shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CpiPayload {
  One(NewCpiRecord),
  Many(Vec<NewCpiRecord>),
}

#[derive(Debug, Deserialize)]
pub struct SurveyEvent {
  pub id:     String,
  pub before: PlanBefore,
  pub after:  PlanAfter,
}

/// Discrete add/remove events. Both fields are required; a missing or
/// non-sequence field is rejected before any tallying happens.
#[derive(Debug, Deserialize)]
pub struct ProductEvents {
  pub added:   Vec<String>,
  pub removed: Vec<String>,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PostParams>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  verify_bearer(&headers, &state.config.api_token)?;

  match params.table.as_deref() {
    Some("consumer-price-index") => upsert_price_index(&state, body).await,
    Some("survey") => survey_event(&state, SurveyTable::Survey, body).await,
    Some("survey_test") => {
      survey_event(&state, SurveyTable::SurveyTest, body).await
    }
    Some("products") => product_events(&state, body).await,
    _ => Err(Error::BadRequest(
      "parameter 'table' is missing or invalid; valid tables: \
       consumer-price-index, survey, survey_test, products"
        .to_owned(),
    )),
  }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, Error> {
  serde_json::from_value(body)
    .map_err(|e| Error::BadRequest(format!("invalid data format: {e}")))
}

/// `POST /?table=consumer-price-index`
async fn upsert_price_index<S>(
  state: &AppState<S>,
  body: Value,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = match decode::<CpiPayload>(body)? {
    CpiPayload::One(row) => vec![row],
    CpiPayload::Many(rows) => rows,
  };
  if rows.is_empty() {
    return Err(Error::BadRequest("no data provided".to_owned()));
  }

  state
    .store
    .upsert_cpi(rows)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(StatusCode::OK.into_response())
}

/// `POST /?table=survey` (or `survey_test`)
async fn survey_event<S>(
  state: &AppState<S>,
  table: SurveyTable,
  body: Value,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let event: SurveyEvent = decode(body)?;
  if event.id.is_empty() {
    return Err(Error::BadRequest(
      "invalid data format: 'id' must be non-empty".to_owned(),
    ));
  }

  state
    .store
    .record_survey_event(table, &event.id, event.before, event.after)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(StatusCode::OK.into_response())
}

/// `POST /?table=products`
async fn product_events<S>(
  state: &AppState<S>,
  body: Value,
) -> Result<Response, Error>
where
  S: PriceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let events: ProductEvents = decode(body)?;
  let deltas = tally_events(&events.added, &events.removed);

  state
    .store
    .apply_product_deltas(deltas)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(StatusCode::OK.into_response())
}
