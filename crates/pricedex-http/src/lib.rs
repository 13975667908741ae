//! HTTP layer for pricedex.
//!
//! Exposes an axum [`Router`] with a single endpoint that dispatches on the
//! `table` and `mode` query parameters, backed by any
//! [`pricedex_core::store::PriceStore`]. TLS and transport concerns are the
//! caller's responsibility.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
  routing::get,
};
use pricedex_core::store::PriceStore;
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  set_header::SetResponseHeaderLayer,
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_reference_id() -> String { "CC13-0111101100".to_owned() }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:      String,
  pub port:      u16,
  pub db_path:   PathBuf,
  /// The bearer token required on every POST.
  pub api_token: String,
  /// The series whose latest record resolves the `most-recent` sentinel and
  /// bounds live ranges.
  #[serde(default = "default_reference_id")]
  pub reference_id: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. Built once at startup;
/// never mutated afterwards.
#[derive(Clone)]
pub struct AppState<S: PriceStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Every response is publicly cacheable for an hour — the data changes
/// monthly.
const CACHE_CONTROL_VALUE: &str = "public, max-age=3600";

/// Build the axum [`Router`] for the API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PriceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    .max_age(Duration::from_secs(3600));

  Router::new()
    .route(
      "/",
      get(handlers::get::handler::<S>).post(handlers::post::handler::<S>),
    )
    .layer(SetResponseHeaderLayer::if_not_present(
      header::CACHE_CONTROL,
      HeaderValue::from_static(CACHE_CONTROL_VALUE),
    ))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
