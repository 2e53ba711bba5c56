use super::topk::top_k;
use crate::store::{Neighbor, NumberRecord, SequenceRecord, NEIGHBOR_SLOTS, OFFSETS};
use fnv::FnvHashMap;
use std::collections::BTreeMap;

/// Running counts for one distinct value
///
/// Neighbor maps are keyed by dense value index, not by the raw value.
#[derive(Debug, Default)]
struct NumberAccumulator {
    total_count: u64,
    sequence_count: u64,
    /// Ordinal of the last sequence that contained this value (0 = none yet)
    last_sequence: u64,
    /// Occurrences per position; grows to the longest position seen
    index_counts: Vec<u64>,
    neighbors: [FnvHashMap<u32, u64>; NEIGHBOR_SLOTS],
}

/// Single-pass co-occurrence aggregation over sequence records
///
/// Observed values are interned to dense `u32` indices and their accumulators
/// live in one `Vec`, so the hot loop touches contiguous memory and small
/// hash keys.
///
/// # Example
/// ```
/// use voeis::cooccurrence::Aggregator;
/// use voeis::sequence_id::SequenceId;
/// use voeis::store::SequenceRecord;
///
/// let mut aggregator = Aggregator::new();
/// aggregator.add(&SequenceRecord {
///     id: SequenceId::new(42),
///     name: "Test".to_string(),
///     terms: vec![1, 2, 3, 2, 1],
/// });
/// let numbers = aggregator.finish(12);
///
/// let two = numbers.iter().find(|n| n.value == 2).unwrap();
/// assert_eq!(two.total_count, 2);
/// assert_eq!(two.neighbor_count(1, 3), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct Aggregator {
    dense: FnvHashMap<i32, u32>,
    values: Vec<i32>,
    accumulators: Vec<NumberAccumulator>,
    sequences_seen: u64,
    scratch: Vec<u32>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sequences folded in so far
    pub fn sequences_seen(&self) -> u64 {
        self.sequences_seen
    }

    /// Number of distinct values observed so far
    pub fn distinct_values(&self) -> usize {
        self.values.len()
    }

    fn intern(&mut self, value: i32) -> u32 {
        if let Some(&index) = self.dense.get(&value) {
            return index;
        }
        let index = self.values.len() as u32;
        self.dense.insert(value, index);
        self.values.push(value);
        self.accumulators.push(NumberAccumulator::default());
        index
    }

    /// Fold one sequence into the running counts
    ///
    /// Each call counts as one distinct sequence; sequence ids are unique in
    /// the corpus, so no id set is kept.
    pub fn add(&mut self, record: &SequenceRecord) {
        self.sequences_seen += 1;
        let ordinal = self.sequences_seen;

        let mut dense = std::mem::take(&mut self.scratch);
        dense.clear();
        dense.extend(record.terms.iter().map(|&term| self.intern(term)));

        let len = dense.len() as isize;
        for (position, &index) in dense.iter().enumerate() {
            let acc = &mut self.accumulators[index as usize];
            acc.total_count += 1;
            if acc.last_sequence != ordinal {
                acc.last_sequence = ordinal;
                acc.sequence_count += 1;
            }

            if acc.index_counts.len() <= position {
                acc.index_counts.resize(position + 1, 0);
            }
            acc.index_counts[position] += 1;

            for (slot, &offset) in OFFSETS.iter().enumerate() {
                let target = position as isize + offset as isize;
                if !(0..len).contains(&target) {
                    continue;
                }
                *acc.neighbors[slot]
                    .entry(dense[target as usize])
                    .or_insert(0) += 1;
            }
        }

        self.scratch = dense;
    }

    /// Fold every record of an iterator
    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a SequenceRecord>) {
        for record in records {
            self.add(record);
        }
    }

    /// Reduce each neighbor bucket to its `k` most popular entries
    ///
    /// Records come back ordered by value ascending.
    pub fn finish(self, k: usize) -> Vec<NumberRecord> {
        let Self {
            values,
            accumulators,
            ..
        } = self;

        let mut records: Vec<NumberRecord> = accumulators
            .iter()
            .zip(&values)
            .map(|(acc, &value)| {
                let index_counts: BTreeMap<u32, u64> = acc
                    .index_counts
                    .iter()
                    .enumerate()
                    .filter(|(_, &count)| count > 0)
                    .map(|(position, &count)| (position as u32, count))
                    .collect();

                let mut neighbors: [Vec<Neighbor>; NEIGHBOR_SLOTS] = Default::default();
                for (slot, bucket) in acc.neighbors.iter().enumerate() {
                    neighbors[slot] = top_k(
                        bucket.iter().map(|(&index, &count)| Neighbor {
                            value: values[index as usize],
                            count,
                        }),
                        k,
                    );
                }

                NumberRecord {
                    value,
                    total_count: acc.total_count,
                    total_sequence_count: acc.sequence_count,
                    index_counts,
                    neighbors,
                }
            })
            .collect();

        records.sort_unstable_by_key(|record| record.value);
        records
    }
}

/// Aggregate a slice of records and select the top `k` neighbors
pub fn aggregate(records: &[SequenceRecord], k: usize) -> Vec<NumberRecord> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.finish(k)
}
