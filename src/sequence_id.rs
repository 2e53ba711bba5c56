//! Typed OEIS sequence identifier (A-number)
//!
//! Accepts either the bare integer (`42`) or the padded form (`A000042`)
//! at the edge; everything past parsing works with `SequenceId`.

use crate::error::VoeisError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Width of the zero-padded digit block in an A-number
pub const A_NUMBER_DIGITS: usize = 6;

/// Identifier of one sequence, e.g. `A000042`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u32);

impl SequenceId {
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// The numeric part of the A-number
    pub const fn number(self) -> u32 {
        self.0
    }
}

impl From<u32> for SequenceId {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{:0width$}", self.0, width = A_NUMBER_DIGITS)
    }
}

impl FromStr for SequenceId {
    type Err = VoeisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('A')
            .or_else(|| trimmed.strip_prefix('a'))
            .unwrap_or(trimmed);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VoeisError::InvalidSequenceId(s.to_string()));
        }

        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| VoeisError::InvalidSequenceId(s.to_string()))
    }
}

impl Serialize for SequenceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SequenceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
