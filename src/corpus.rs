//! Raw OEIS corpus parsing
//!
//! Two inputs:
//! - `stripped`: `A000045 ,0,1,1,2,3,5,8,` (terms)
//! - `names`: `A000045 Fibonacci numbers: ...` (names)
//!
//! Only lines starting with `A` are records; comments and blank lines are
//! skipped. Terms outside the signed 32-bit range are dropped, and a sequence
//! left with no terms is not emitted at all.

use crate::error::{Result, VoeisError};
use crate::line_reader::LossyLines;
use crate::sequence_id::{SequenceId, A_NUMBER_DIGITS};
use crate::store::SequenceRecord;
use fnv::FnvHashMap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Marker that starts every record line
pub const RECORD_MARKER: char = 'A';

/// Parse one integer term, `Ok(None)` when it does not fit in an `i32`
///
/// Syntax errors are reported; overflow is not an error, the term is simply
/// dropped by the caller.
pub fn parse_term(token: &str) -> std::result::Result<Option<i32>, String> {
    let digits = token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('+'))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("bad term {token:?}"));
    }

    match token.parse::<i32>() {
        Ok(value) => Ok(Some(value)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Ok(None)
        }
        Err(e) => Err(format!("bad term {token:?}: {e}")),
    }
}

/// Split a record line into its A-number and the remainder
fn split_record(line: &str) -> std::result::Result<Option<(SequenceId, &str)>, String> {
    if !line.starts_with(RECORD_MARKER) {
        return Ok(None);
    }
    let id_end = 1 + A_NUMBER_DIGITS;
    let id_token = line
        .get(..id_end)
        .ok_or_else(|| format!("record shorter than an A-number: {line:?}"))?;
    let id = id_token.parse::<SequenceId>().map_err(|e| e.to_string())?;
    let rest = line[id_end..].strip_prefix(' ').unwrap_or(&line[id_end..]);
    Ok(Some((id, rest)))
}

/// Terms kept from one `stripped` line plus how many were out of range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerms {
    pub id: SequenceId,
    pub terms: Vec<i32>,
    pub dropped: usize,
}

/// Parse one line of the `stripped` corpus; `Ok(None)` for non-record lines
pub fn parse_stripped_line(line: &str) -> std::result::Result<Option<ParsedTerms>, String> {
    let Some((id, rest)) = split_record(line)? else {
        return Ok(None);
    };

    let mut terms = Vec::new();
    let mut dropped = 0;
    let body = rest.trim().trim_matches(',');
    if !body.is_empty() {
        for token in body.split(',') {
            match parse_term(token.trim())? {
                Some(term) => terms.push(term),
                None => dropped += 1,
            }
        }
    }

    Ok(Some(ParsedTerms { id, terms, dropped }))
}

/// Parse one line of the `names` corpus; `Ok(None)` for non-record lines
pub fn parse_name_line(line: &str) -> std::result::Result<Option<(SequenceId, String)>, String> {
    Ok(split_record(line)?.map(|(id, rest)| (id, rest.to_string())))
}

fn open_corpus(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VoeisError::CorpusNotFound(path.to_path_buf()))
        }
        Err(e) => Err(VoeisError::io(path, e)),
    }
}

/// Sequence names keyed by id
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    names: FnvHashMap<SequenceId, String>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the whole `names` corpus
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_reader(open_corpus(path)?, path)
    }

    /// Read names from any reader; `path` is only used in error messages
    pub fn from_reader<R: BufRead>(reader: R, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut index = Self::new();
        for line in LossyLines::new(reader) {
            let (line_number, line) = line.map_err(|e| VoeisError::io(path, e))?;
            let parsed = parse_name_line(&line).map_err(|reason| VoeisError::MalformedCorpus {
                path: path.to_path_buf(),
                line: line_number,
                reason,
            })?;
            if let Some((id, name)) = parsed {
                index.insert(id, name);
            }
        }
        info!(names = index.len(), "loaded sequence names");
        Ok(index)
    }

    pub fn insert(&mut self, id: SequenceId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn get(&self, id: SequenceId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Counters collected while streaming the `stripped` corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    /// Record lines seen
    pub sequences_read: usize,
    /// Records yielded
    pub sequences_emitted: usize,
    /// Records dropped because no term fit in 32 bits
    pub empty_sequences_dropped: usize,
    /// Individual terms dropped for being out of range
    pub terms_dropped: usize,
    /// Records yielded without a matching name
    pub missing_names: usize,
}

/// Streams `SequenceRecord`s out of the `stripped` corpus
pub struct SequenceReader<'a, R> {
    lines: LossyLines<R>,
    path: PathBuf,
    names: &'a NameIndex,
    stats: CorpusStats,
}

impl<'a> SequenceReader<'a, BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, names: &'a NameIndex) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self::new(open_corpus(path)?, path, names))
    }
}

impl<'a, R: BufRead> SequenceReader<'a, R> {
    pub fn new(reader: R, path: impl AsRef<Path>, names: &'a NameIndex) -> Self {
        Self {
            lines: LossyLines::new(reader),
            path: path.as_ref().to_path_buf(),
            names,
            stats: CorpusStats::default(),
        }
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    fn next_record(&mut self) -> Option<Result<SequenceRecord>> {
        for line in self.lines.by_ref() {
            let (line_number, line) = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(VoeisError::io(&self.path, e))),
            };

            let parsed = match parse_stripped_line(&line) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => continue,
                Err(reason) => {
                    return Some(Err(VoeisError::MalformedCorpus {
                        path: self.path.clone(),
                        line: line_number,
                        reason,
                    }))
                }
            };

            self.stats.sequences_read += 1;
            self.stats.terms_dropped += parsed.dropped;
            if parsed.terms.is_empty() {
                self.stats.empty_sequences_dropped += 1;
                continue;
            }

            let name = match self.names.get(parsed.id) {
                Some(name) => name.to_string(),
                None => {
                    warn!(id = %parsed.id, "sequence has no name");
                    self.stats.missing_names += 1;
                    String::new()
                }
            };

            self.stats.sequences_emitted += 1;
            return Some(Ok(SequenceRecord {
                id: parsed.id,
                name,
                terms: parsed.terms,
            }));
        }
        None
    }
}

impl<R: BufRead> Iterator for SequenceReader<'_, R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}
