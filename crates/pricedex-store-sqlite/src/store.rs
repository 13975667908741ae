//! [`SqliteStore`] — the SQLite implementation of [`PriceStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use pricedex_core::{
  filter::{CpiFilter, FilterClause},
  record::{CpiRecord, NewCpiRecord, ProductCounters, RecentDate, SurveyCounters},
  store::PriceStore,
  survey::{survey_column, PlanAfter, PlanBefore, SurveyTable},
  tally::CounterDelta,
};

use crate::{
  encode::{bind_args, encode_dt, RawCpiRecord, RawRecentDate},
  schema::SCHEMA,
  Error, Result,
};

const SURVEY_COLUMNS: &str =
  "id, base_base, base_premium, base_none, premium_base, premium_premium, premium_none";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A pricedex store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PriceStore impl ─────────────────────────────────────────────────────────

impl PriceStore for SqliteStore {
  type Error = Error;

  // ── Price index ───────────────────────────────────────────────────────────

  fn most_recent(
    &self,
    id: Option<&str>,
  ) -> impl std::future::Future<Output = Result<Option<RecentDate>>> + Send + '_ {
    let id_owned = id.map(str::to_owned);

    async move {
      let raw: Option<RawRecentDate> = self
        .conn
        .call(move |conn| {
          let map = |row: &rusqlite::Row<'_>| {
            Ok(RawRecentDate {
              year:    row.get(0)?,
              month:   row.get(1)?,
              created: row.get(2)?,
            })
          };

          let row = if let Some(id) = id_owned {
            conn
              .query_row(
                "SELECT year, month, created FROM consumer_price_index
                 WHERE id = ?1
                 ORDER BY year DESC, month DESC LIMIT 1",
                rusqlite::params![id],
                map,
              )
              .optional()?
          } else {
            conn
              .query_row(
                "SELECT year, month, created FROM consumer_price_index
                 ORDER BY year DESC, month DESC LIMIT 1",
                [],
                map,
              )
              .optional()?
          };
          Ok(row)
        })
        .await?;

      raw.map(RawRecentDate::into_recent).transpose()
    }
  }

  async fn select_cpi(&self, filter: &CpiFilter) -> Result<Vec<CpiRecord>> {
    let FilterClause { clause, args, limit } = filter.build();

    let mut sql = format!(
      "SELECT id, name, year, month, value, created
       FROM consumer_price_index
       {clause}
       ORDER BY year, month, id"
    );
    if let Some(cap) = limit {
      sql.push_str(&format!(" LIMIT {cap}"));
    }
    let params = bind_args(args);

    let raws: Vec<RawCpiRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawCpiRecord {
              id:      row.get(0)?,
              name:    row.get(1)?,
              year:    row.get(2)?,
              month:   row.get(3)?,
              value:   row.get(4)?,
              created: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCpiRecord::into_record).collect()
  }

  async fn upsert_cpi(&self, rows: Vec<NewCpiRecord>) -> Result<()> {
    let created = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO consumer_price_index (id, name, year, month, value, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (id, year, month) DO UPDATE SET value = excluded.value",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.id, row.name, row.year, row.month, row.value, created,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Survey counters ───────────────────────────────────────────────────────

  async fn survey_counters(
    &self,
    table: SurveyTable,
    ids: &[String],
  ) -> Result<Vec<SurveyCounters>> {
    let ids = ids.to_vec();
    let table_name = table.table_name();

    let counters: Vec<SurveyCounters> = self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| {
          Ok(SurveyCounters {
            id:              row.get(0)?,
            base_base:       row.get(1)?,
            base_premium:    row.get(2)?,
            base_none:       row.get(3)?,
            premium_base:    row.get(4)?,
            premium_premium: row.get(5)?,
            premium_none:    row.get(6)?,
          })
        };

        let rows = if ids.is_empty() {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SURVEY_COLUMNS} FROM {table_name} ORDER BY id"
          ))?;
          stmt
            .query_map([], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let placeholders = vec!["?"; ids.len()].join(", ");
          let mut stmt = conn.prepare(&format!(
            "SELECT {SURVEY_COLUMNS} FROM {table_name}
             WHERE id IN ({placeholders}) ORDER BY id"
          ))?;
          stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    Ok(counters)
  }

  async fn record_survey_event(
    &self,
    table: SurveyTable,
    id: &str,
    before: PlanBefore,
    after: PlanAfter,
  ) -> Result<()> {
    // Table and column names come from fixed allow-lists; only the id is
    // user-supplied, and it is bound.
    let table_name = table.table_name();
    let column = survey_column(before, after);
    let id = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO {table_name} (id, {column}) VALUES (?1, 1)
             ON CONFLICT (id) DO UPDATE SET {column} = {column} + 1"
          ),
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Product counters ──────────────────────────────────────────────────────

  async fn product_counters(&self, ids: &[String]) -> Result<Vec<ProductCounters>> {
    let ids = ids.to_vec();

    let counters: Vec<ProductCounters> = self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| {
          Ok(ProductCounters {
            id:      row.get(0)?,
            added:   row.get(1)?,
            removed: row.get(2)?,
          })
        };

        let rows = if ids.is_empty() {
          let mut stmt = conn
            .prepare("SELECT id, added, removed FROM product_counters ORDER BY id")?;
          stmt
            .query_map([], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let placeholders = vec!["?"; ids.len()].join(", ");
          let mut stmt = conn.prepare(&format!(
            "SELECT id, added, removed FROM product_counters
             WHERE id IN ({placeholders}) ORDER BY id"
          ))?;
          stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    Ok(counters)
  }

  async fn apply_product_deltas(
    &self,
    deltas: BTreeMap<String, CounterDelta>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO product_counters (id, added, removed) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET
               added   = added   + excluded.added,
               removed = removed + excluded.removed",
          )?;
          for (id, delta) in &deltas {
            stmt.execute(rusqlite::params![
              id,
              delta.added as i64,
              delta.removed as i64,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn most_removed(&self, limit: u32) -> Result<Vec<ProductCounters>> {
    let limit = i64::from(limit);

    let counters: Vec<ProductCounters> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, added, removed FROM product_counters
           ORDER BY removed DESC, id LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(ProductCounters {
              id:      row.get(0)?,
              added:   row.get(1)?,
              removed: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(counters)
  }
}
