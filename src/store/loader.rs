//! Store loader
//!
//! Inverse of the writer's grammar. Caps from `LoadConfig` only shrink what is
//! kept in memory. Lines that do not parse are skipped and counted; a missing
//! artifact aborts the load.

use super::{
    Neighbor, NumberRecord, SequenceRecord, Store, StorePaths, MAX_NEIGHBORS_PER_OFFSET,
    NEIGHBOR_SLOTS, OFFSETS,
};
use crate::config::LoadConfig;
use crate::error::{Result, VoeisError};
use crate::line_reader::LossyLines;
use crate::sequence_id::SequenceId;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

const SEQUENCE_PROGRESS_INTERVAL: usize = 10_000;
const NUMBER_PROGRESS_INTERVAL: usize = 25_000;

/// What the loader kept and what it skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub sequences_loaded: usize,
    pub sequences_skipped: usize,
    pub numbers_loaded: usize,
    pub numbers_skipped: usize,
}

fn malformed(reason: impl Into<String>) -> VoeisError {
    VoeisError::MalformedArtifact(reason.into())
}

fn parse_field<T: FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| malformed(format!("bad {what} {token:?}")))
}

/// Parse a `<a> <b>` pair
fn parse_pair<A: FromStr, B: FromStr>(token: &str, what: &str) -> Result<(A, B)> {
    let (a, b) = token
        .split_once(' ')
        .ok_or_else(|| malformed(format!("bad {what} pair {token:?}")))?;
    Ok((parse_field(a, what)?, parse_field(b, what)?))
}

/// Parse one sequence artifact line
pub fn parse_sequence_line(line: &str) -> Result<SequenceRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [id, name, terms] = fields[..] else {
        return Err(malformed(format!(
            "expected 3 tab-separated fields, found {}",
            fields.len()
        )));
    };

    let id = SequenceId::new(parse_field(id, "sequence id")?);
    let terms = terms
        .split(' ')
        .map(|t| parse_field::<i32>(t, "term"))
        .collect::<Result<Vec<_>>>()?;

    Ok(SequenceRecord {
        id,
        name: name.to_string(),
        terms,
    })
}

/// Parse one number artifact line, keeping at most `neighbor_cap` neighbors
/// for offsets within ±`offset_cap`
pub fn parse_number_line(
    line: &str,
    offset_cap: usize,
    neighbor_cap: usize,
) -> Result<NumberRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [header, index_counts, groups] = fields[..] else {
        return Err(malformed(format!(
            "expected 3 tab-separated fields, found {}",
            fields.len()
        )));
    };

    let header: Vec<&str> = header.split(' ').collect();
    let [value, total_count, total_sequence_count] = header[..] else {
        return Err(malformed("header must be `<value> <total> <sequences>`"));
    };
    let value: i32 = parse_field(value, "value")?;
    let total_count: u64 = parse_field(total_count, "total count")?;
    let total_sequence_count: u64 = parse_field(total_sequence_count, "sequence count")?;

    let index_counts = index_counts
        .split(',')
        .map(|pair| parse_pair::<u32, u64>(pair, "index count"))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let groups: Vec<&str> = groups.split(';').collect();
    if groups.len() != NEIGHBOR_SLOTS {
        return Err(malformed(format!(
            "expected {NEIGHBOR_SLOTS} neighbor groups, found {}",
            groups.len()
        )));
    }

    let neighbor_cap = neighbor_cap.min(MAX_NEIGHBORS_PER_OFFSET);
    let mut neighbors: [Vec<Neighbor>; NEIGHBOR_SLOTS] = Default::default();
    for (slot, group) in groups.iter().enumerate() {
        if group.is_empty() || OFFSETS[slot].unsigned_abs() as usize > offset_cap {
            continue;
        }
        neighbors[slot] = group
            .split(',')
            .take(neighbor_cap)
            .map(|pair| {
                parse_pair::<i32, u64>(pair, "neighbor").map(|(value, count)| Neighbor {
                    value,
                    count,
                })
            })
            .collect::<Result<Vec<_>>>()?;
    }

    Ok(NumberRecord {
        value,
        total_count,
        total_sequence_count,
        index_counts,
        neighbors,
    })
}

fn open_artifact(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VoeisError::ArtifactNotFound(path.to_path_buf()))
        }
        Err(e) => Err(VoeisError::io(path, e)),
    }
}

/// Read lines from `reader` until `cap` records parsed, skipping bad lines
fn load_lines<R, T>(
    reader: R,
    path: &Path,
    cap: Option<usize>,
    progress_every: usize,
    kind: &str,
    mut parse: impl FnMut(&str) -> Result<T>,
) -> Result<(Vec<T>, usize)>
where
    R: BufRead,
{
    let mut records = Vec::new();
    let mut skipped = 0;

    for line in LossyLines::new(reader) {
        if cap.is_some_and(|cap| records.len() >= cap) {
            debug!(cap = ?cap, "{kind} cap reached");
            break;
        }
        let (line_number, line) = line.map_err(|e| VoeisError::io(path, e))?;
        if line.is_empty() {
            continue;
        }

        match parse(&line) {
            Ok(record) => {
                records.push(record);
                if records.len() % progress_every == 0 {
                    info!("  at {kind} {}", records.len());
                }
            }
            Err(e) => {
                skipped += 1;
                warn!(path = %path.display(), line = line_number, "skipping {kind} line: {e}");
            }
        }
    }

    Ok((records, skipped))
}

/// Load both artifacts into a `Store`
pub fn load_store(paths: &StorePaths, config: &LoadConfig) -> Result<(Store, LoadReport)> {
    config.validate()?;

    // Open both first so a missing artifact fails before any parsing work.
    let sequence_reader = open_artifact(&paths.sequences)?;
    let number_reader = open_artifact(&paths.numbers)?;

    info!(path = %paths.sequences.display(), "loading sequences");
    let (sequences, sequences_skipped) = load_lines(
        sequence_reader,
        &paths.sequences,
        config.sequence_cap,
        SEQUENCE_PROGRESS_INTERVAL,
        "sequence",
        parse_sequence_line,
    )?;

    info!(path = %paths.numbers.display(), "loading numbers");
    let (numbers, numbers_skipped) = load_lines(
        number_reader,
        &paths.numbers,
        config.number_cap,
        NUMBER_PROGRESS_INTERVAL,
        "number",
        |line| parse_number_line(line, config.offset_cap, config.neighbor_cap),
    )?;

    let report = LoadReport {
        sequences_loaded: sequences.len(),
        sequences_skipped,
        numbers_loaded: numbers.len(),
        numbers_skipped,
    };

    let sequences: HashMap<_, _> = sequences.into_iter().map(|s| (s.id, s)).collect();
    let numbers: HashMap<_, _> = numbers.into_iter().map(|n| (n.value, n)).collect();
    info!(
        sequences = sequences.len(),
        numbers = numbers.len(),
        skipped = sequences_skipped + numbers_skipped,
        "store loaded"
    );

    Ok((Store::new(sequences, numbers), report))
}
