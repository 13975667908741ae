//! Dynamic filter-clause assembly for price-index selects.
//!
//! The builder turns optional filter parameters into a SQL `WHERE` fragment
//! plus the bind values for its placeholders, in placeholder order. Only the
//! fragment text is assembled here; every user-supplied value is bound, never
//! interpolated.

use crate::month::Month;

/// Rows returned when a select carries no filter at all.
pub const UNFILTERED_ROW_CAP: u32 = 10;

/// A value bound to a `?` placeholder, in placeholder order.
///
/// Kept as a plain enum so this crate stays free of any database dependency;
/// storage backends convert to their own parameter type.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
  Text(String),
  Int(i64),
}

/// The period half of a filter: either one explicit year/month pair, or a
/// list of raw date tokens.
#[derive(Debug, Clone)]
pub enum PeriodFilter {
  YearMonth { year: i32, month: u32 },
  /// Raw `YYYY-MM` tokens. Malformed entries are skipped silently — they
  /// contribute no predicate and no bind value.
  Dates(Vec<String>),
}

/// Optional filter parameters for a price-index select.
#[derive(Debug, Clone, Default)]
pub struct CpiFilter {
  pub ids:    Vec<String>,
  pub period: Option<PeriodFilter>,
}

/// Output of [`CpiFilter::build`]: the assembled fragment, its bind values,
/// and the row cap applied when the fragment is empty.
#[derive(Debug, Clone)]
pub struct FilterClause {
  /// `"WHERE …"`, or empty when no predicate applies.
  pub clause: String,
  pub args:   Vec<BindValue>,
  /// `Some` only when `clause` is empty: the safety cap against unbounded
  /// scans.
  pub limit:  Option<u32>,
}

impl CpiFilter {
  /// Assemble the `WHERE` fragment and its bind values.
  ///
  /// The identifier predicate always precedes the period predicate group;
  /// the two are AND-combined. Date disjuncts are OR-joined inside one
  /// parenthesized group, one placeholder pair per well-formed token. An
  /// empty identifier list is the same as no identifier filter.
  pub fn build(&self) -> FilterClause {
    let mut predicates: Vec<String> = Vec::new();
    let mut args: Vec<BindValue> = Vec::new();

    if !self.ids.is_empty() {
      let placeholders = vec!["?"; self.ids.len()].join(", ");
      predicates.push(format!("id IN ({placeholders})"));
      args.extend(self.ids.iter().cloned().map(BindValue::Text));
    }

    match &self.period {
      Some(PeriodFilter::YearMonth { year, month }) => {
        predicates.push("year = ? AND month = ?".to_owned());
        args.push(BindValue::Int(i64::from(*year)));
        args.push(BindValue::Int(i64::from(*month)));
      }
      Some(PeriodFilter::Dates(tokens)) => {
        let mut disjuncts: Vec<&'static str> = Vec::new();
        for token in tokens {
          let Some(parsed) = Month::find_in(token) else {
            continue;
          };
          disjuncts.push("year = ? AND month = ?");
          args.push(BindValue::Int(i64::from(parsed.year)));
          args.push(BindValue::Int(i64::from(parsed.month)));
        }
        // A list of nothing but malformed tokens contributes no group.
        if !disjuncts.is_empty() {
          predicates.push(format!("({})", disjuncts.join(" OR ")));
        }
      }
      None => {}
    }

    if predicates.is_empty() {
      FilterClause {
        clause: String::new(),
        args,
        limit: Some(UNFILTERED_ROW_CAP),
      }
    } else {
      FilterClause {
        clause: format!("WHERE {}", predicates.join(" AND ")),
        args,
        limit: None,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
  }

  #[test]
  fn ids_only_emits_one_in_predicate() {
    let filter = CpiFilter { ids: ids(&["a", "b", "c"]), period: None };
    let built = filter.build();

    assert_eq!(built.clause, "WHERE id IN (?, ?, ?)");
    assert_eq!(built.args, vec![
      BindValue::Text("a".into()),
      BindValue::Text("b".into()),
      BindValue::Text("c".into()),
    ]);
    assert_eq!(built.limit, None);
  }

  #[test]
  fn year_month_pair_combines_with_ids() {
    let filter = CpiFilter {
      ids:    ids(&["a"]),
      period: Some(PeriodFilter::YearMonth { year: 2020, month: 7 }),
    };
    let built = filter.build();

    assert_eq!(built.clause, "WHERE id IN (?) AND year = ? AND month = ?");
    assert_eq!(built.args, vec![
      BindValue::Text("a".into()),
      BindValue::Int(2020),
      BindValue::Int(7),
    ]);
  }

  #[test]
  fn dates_emit_one_disjunct_per_well_formed_token() {
    let filter = CpiFilter {
      ids:    Vec::new(),
      period: Some(PeriodFilter::Dates(ids(&[
        "2019-01",
        "bogus",
        "2019-02",
      ]))),
    };
    let built = filter.build();

    assert_eq!(
      built.clause,
      "WHERE (year = ? AND month = ? OR year = ? AND month = ?)"
    );
    assert_eq!(built.args, vec![
      BindValue::Int(2019),
      BindValue::Int(1),
      BindValue::Int(2019),
      BindValue::Int(2),
    ]);
  }

  #[test]
  fn ids_precede_date_group() {
    let filter = CpiFilter {
      ids:    ids(&["x", "y"]),
      period: Some(PeriodFilter::Dates(ids(&["2021-12"]))),
    };
    let built = filter.build();

    assert_eq!(
      built.clause,
      "WHERE id IN (?, ?) AND (year = ? AND month = ?)"
    );
    assert_eq!(built.args, vec![
      BindValue::Text("x".into()),
      BindValue::Text("y".into()),
      BindValue::Int(2021),
      BindValue::Int(12),
    ]);
  }

  #[test]
  fn all_malformed_dates_contribute_nothing() {
    let filter = CpiFilter {
      ids:    Vec::new(),
      period: Some(PeriodFilter::Dates(ids(&["???", "2019", ""]))),
    };
    let built = filter.build();

    assert_eq!(built.clause, "");
    assert!(built.args.is_empty());
    assert_eq!(built.limit, Some(UNFILTERED_ROW_CAP));
  }

  #[test]
  fn empty_filter_applies_row_cap() {
    let built = CpiFilter::default().build();

    assert_eq!(built.clause, "");
    assert!(built.args.is_empty());
    assert_eq!(built.limit, Some(10));
  }

  #[test]
  fn build_is_pure() {
    let filter = CpiFilter {
      ids:    ids(&["a"]),
      period: Some(PeriodFilter::Dates(ids(&["2019-01", "junk"]))),
    };
    let first = filter.build();
    let second = filter.build();

    assert_eq!(first.clause, second.clause);
    assert_eq!(first.args, second.args);
  }
}
