// Sequence and number stores
//
// The store is two flat, line-oriented artifacts:
//
//   sequences.txt  <id>\t<name>\t<term> <term> ...
//   numbers.txt    <value> <total> <sequences>\t<pos> <count>,...\t<g1>;...;<g12>
//
// Each <gN> is a comma-separated list of `<neighbor> <count>` pairs for one
// relative offset, in the fixed order -6..-1, +1..+6. The writer produces
// them during the build; the loader turns them back into hash maps that are
// never mutated afterwards.

mod loader;
mod writer;

pub use loader::{load_store, parse_number_line, parse_sequence_line, LoadReport};
pub use writer::{
    publish, write_number_line, write_numbers, write_sequence_line, write_sequences,
    ArtifactWriter, StagedArtifact,
};

use crate::sequence_id::SequenceId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Largest relative offset for which neighbors are tracked
pub const MAX_NEIGHBOR_OFFSET: usize = 6;

/// Number of neighbor tables per number (offset 0 excluded)
pub const NEIGHBOR_SLOTS: usize = 2 * MAX_NEIGHBOR_OFFSET;

/// Most popular neighbors kept per offset
pub const MAX_NEIGHBORS_PER_OFFSET: usize = 12;

/// Offsets in slot order, as they appear in the number artifact
pub const OFFSETS: [i32; NEIGHBOR_SLOTS] = [-6, -5, -4, -3, -2, -1, 1, 2, 3, 4, 5, 6];

/// File name of the sequence artifact inside a store directory
pub const SEQUENCE_FILE: &str = "sequences.txt";

/// File name of the number artifact inside a store directory
pub const NUMBER_FILE: &str = "numbers.txt";

/// Slot index for a relative offset, `None` for 0 or anything beyond ±6
pub fn offset_slot(offset: i32) -> Option<usize> {
    match offset {
        -6..=-1 => Some((offset + 6) as usize),
        1..=6 => Some((offset + 5) as usize),
        _ => None,
    }
}

/// Locations of the two artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub sequences: PathBuf,
    pub numbers: PathBuf,
}

impl StorePaths {
    /// Standard artifact names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            sequences: dir.join(SEQUENCE_FILE),
            numbers: dir.join(NUMBER_FILE),
        }
    }
}

/// One sequence of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: SequenceId,
    pub name: String,
    /// Never empty
    pub terms: Vec<i32>,
}

/// A neighbor value and how often it was seen at a given offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    pub value: i32,
    pub count: u64,
}

/// Corpus-wide statistics for one distinct term value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRecord {
    pub value: i32,
    pub total_count: u64,
    pub total_sequence_count: u64,
    /// Position → occurrences at that position
    pub index_counts: BTreeMap<u32, u64>,
    /// Most popular neighbors per offset, best first
    #[serde(with = "neighbor_tables")]
    pub neighbors: [Vec<Neighbor>; NEIGHBOR_SLOTS],
}

impl NumberRecord {
    /// Neighbor table for a relative offset (empty for 0 or out of range)
    pub fn neighbors_at(&self, offset: i32) -> &[Neighbor] {
        offset_slot(offset)
            .map(|slot| self.neighbors[slot].as_slice())
            .unwrap_or(&[])
    }

    /// Count of `neighbor` at `offset`, if it made the table
    pub fn neighbor_count(&self, offset: i32, neighbor: i32) -> Option<u64> {
        self.neighbors_at(offset)
            .iter()
            .find(|n| n.value == neighbor)
            .map(|n| n.count)
    }
}

/// Neighbor tables serialize as a map keyed by offset so JSON consumers do
/// not need to know the slot layout.
mod neighbor_tables {
    use super::{offset_slot, Neighbor, NEIGHBOR_SLOTS, OFFSETS};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        tables: &[Vec<Neighbor>; NEIGHBOR_SLOTS],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let keyed: BTreeMap<i32, &Vec<Neighbor>> = OFFSETS.iter().copied().zip(tables).collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[Vec<Neighbor>; NEIGHBOR_SLOTS], D::Error> {
        let keyed = BTreeMap::<i32, Vec<Neighbor>>::deserialize(deserializer)?;
        let mut tables: [Vec<Neighbor>; NEIGHBOR_SLOTS] = Default::default();
        for (offset, table) in keyed {
            let slot = offset_slot(offset)
                .ok_or_else(|| D::Error::custom(format!("invalid neighbor offset {offset}")))?;
            tables[slot] = table;
        }
        Ok(tables)
    }
}

/// The loaded, read-only store
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Store {
    sequences: HashMap<SequenceId, SequenceRecord>,
    numbers: HashMap<i32, NumberRecord>,
}

impl Store {
    pub fn new(
        sequences: HashMap<SequenceId, SequenceRecord>,
        numbers: HashMap<i32, NumberRecord>,
    ) -> Self {
        Self { sequences, numbers }
    }

    /// Build a store from record lists; later duplicates replace earlier ones
    pub fn from_records(
        sequences: impl IntoIterator<Item = SequenceRecord>,
        numbers: impl IntoIterator<Item = NumberRecord>,
    ) -> Self {
        Self {
            sequences: sequences.into_iter().map(|s| (s.id, s)).collect(),
            numbers: numbers.into_iter().map(|n| (n.value, n)).collect(),
        }
    }

    pub fn sequence(&self, id: SequenceId) -> Option<&SequenceRecord> {
        self.sequences.get(&id)
    }

    pub fn number(&self, value: i32) -> Option<&NumberRecord> {
        self.numbers.get(&value)
    }

    pub fn sequences(&self) -> &HashMap<SequenceId, SequenceRecord> {
        &self.sequences
    }

    pub fn numbers(&self) -> &HashMap<i32, NumberRecord> {
        &self.numbers
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn number_count(&self) -> usize {
        self.numbers.len()
    }
}
