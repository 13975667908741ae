//! Tallying of discrete add/remove events into per-identifier deltas.

use std::collections::BTreeMap;

/// Per-identifier increment computed from one batch of events.
///
/// This is the delta a storage backend merges into its persisted counters
/// with accumulate-on-conflict semantics; it is never an absolute count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
  pub added:   u64,
  pub removed: u64,
}

/// Count how often each identifier occurs in the `added` and `removed` event
/// sequences.
///
/// The result covers the set union of both sequences — every identifier
/// appearing in either list is present exactly once, with zero for the side
/// it does not appear in. Pure: no I/O, identical inputs yield identical
/// output.
pub fn tally_events(
  added: &[String],
  removed: &[String],
) -> BTreeMap<String, CounterDelta> {
  let mut deltas: BTreeMap<String, CounterDelta> = BTreeMap::new();

  for id in added {
    deltas.entry(id.clone()).or_default().added += 1;
  }
  for id in removed {
    deltas.entry(id.clone()).or_default().removed += 1;
  }

  deltas
}
