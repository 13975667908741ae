//! Survey event states and the column/table allow-list.
//!
//! A survey event records one subscriber moving from a `before` plan to an
//! `after` plan. Each of the six combinations addresses exactly one counter
//! column. The static strings returned here are the only identifiers ever
//! interpolated into SQL text; all values are bound.

use serde::{Deserialize, Serialize};

/// The plan a subscriber held before the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanBefore {
  Base,
  Premium,
}

/// The plan a subscriber holds after the event; `None` means cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAfter {
  Base,
  Premium,
  None,
}

/// The counter column addressed by a `before`/`after` pair.
/// Must match the column names in the survey table DDL.
pub fn survey_column(before: PlanBefore, after: PlanAfter) -> &'static str {
  match (before, after) {
    (PlanBefore::Base, PlanAfter::Base) => "base_base",
    (PlanBefore::Base, PlanAfter::Premium) => "base_premium",
    (PlanBefore::Base, PlanAfter::None) => "base_none",
    (PlanBefore::Premium, PlanAfter::Base) => "premium_base",
    (PlanBefore::Premium, PlanAfter::Premium) => "premium_premium",
    (PlanBefore::Premium, PlanAfter::None) => "premium_none",
  }
}

/// Which physical survey table an operation targets. The production table
/// and its test twin share one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyTable {
  Survey,
  SurveyTest,
}

impl SurveyTable {
  pub fn table_name(self) -> &'static str {
    match self {
      Self::Survey => "survey",
      Self::SurveyTest => "survey_test",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_combination_addresses_a_distinct_column() {
    let befores = [PlanBefore::Base, PlanBefore::Premium];
    let afters = [PlanAfter::Base, PlanAfter::Premium, PlanAfter::None];

    let mut columns: Vec<&str> = befores
      .iter()
      .flat_map(|b| afters.iter().map(|a| survey_column(*b, *a)))
      .collect();
    columns.sort_unstable();
    columns.dedup();

    assert_eq!(columns.len(), 6);
  }

  #[test]
  fn states_deserialize_from_lowercase() {
    let before: PlanBefore = serde_json::from_str("\"premium\"").unwrap();
    let after: PlanAfter = serde_json::from_str("\"none\"").unwrap();
    assert_eq!(survey_column(before, after), "premium_none");
  }

  #[test]
  fn unknown_state_is_rejected() {
    assert!(serde_json::from_str::<PlanBefore>("\"none\"").is_err());
    assert!(serde_json::from_str::<PlanAfter>("\"gold\"").is_err());
  }
}
