//! Read-only query engine over a loaded store
//!
//! The engine holds an `Arc<Store>`; clones are cheap and can be handed to
//! any number of request threads. Nothing here mutates the store, so reads
//! need no locking.

use crate::config::GapRange;
use crate::sequence_id::SequenceId;
use crate::store::{NumberRecord, SequenceRecord, Store};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Point lookups and the gap report
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<Store>,
    gap_range: GapRange,
}

impl QueryEngine {
    pub fn new(store: Arc<Store>, gap_range: GapRange) -> Self {
        Self { store, gap_range }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Sequence by id; `None` when the id is not in the store
    pub fn get_sequence(&self, id: SequenceId) -> Option<&SequenceRecord> {
        self.store.sequence(id)
    }

    /// Statistics for one value; `None` when it never occurred (or was capped)
    pub fn get_number(&self, value: i32) -> Option<&NumberRecord> {
        self.store.number(value)
    }

    /// Number of sequences containing each value in `[min, max]`
    ///
    /// An inverted range yields an empty report.
    pub fn gap_report(&self, min: i32, max: i32) -> BTreeMap<i32, u64> {
        if min > max {
            return BTreeMap::new();
        }

        let numbers = self.store.numbers();
        let span = (i64::from(max) - i64::from(min)) as u64 + 1;
        if span <= numbers.len() as u64 {
            (min..=max)
                .filter_map(|value| {
                    numbers
                        .get(&value)
                        .map(|n| (value, n.total_sequence_count))
                })
                .collect()
        } else {
            numbers
                .values()
                .filter(|n| (min..=max).contains(&n.value))
                .map(|n| (n.value, n.total_sequence_count))
                .collect()
        }
    }

    /// Gap report over the configured range (Sloane's gap)
    pub fn sloanes_gap(&self) -> BTreeMap<i32, u64> {
        self.gap_report(self.gap_range.min, self.gap_range.max)
    }

    /// Resolve ids (e.g. from a remote search) to stored sequences
    ///
    /// Order is preserved; ids missing from the store are skipped.
    pub fn resolve(&self, ids: impl IntoIterator<Item = SequenceId>) -> Vec<&SequenceRecord> {
        ids.into_iter()
            .filter_map(|id| self.get_sequence(id))
            .collect()
    }
}
