//! Build and load configuration
//!
//! `LoadConfig` can come from a TOML file and is then overridden by command
//! line flags. Every cap only reduces what is loaded; none of them change
//! what the build writes.

use crate::error::{Result, VoeisError};
use crate::store::{MAX_NEIGHBORS_PER_OFFSET, MAX_NEIGHBOR_OFFSET};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number cap used by `LoadConfig::constrained` (144 squared)
pub const CONSTRAINED_NUMBER_CAP: usize = 20_736;

/// Inclusive value range for the gap report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRange {
    pub min: i32,
    pub max: i32,
}

impl Default for GapRange {
    fn default() -> Self {
        Self { min: 0, max: 10_000 }
    }
}

impl GapRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Inputs and output location of a store build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Corpus of terms, one `A000042 ,1,2,3,` line per sequence
    pub stripped_path: PathBuf,
    /// Corpus of names, one `A000042 Name` line per sequence
    pub names_path: PathBuf,
    /// Directory receiving `sequences.txt` and `numbers.txt`
    pub out_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            stripped_path: PathBuf::from("data/raw/stripped"),
            names_path: PathBuf::from("data/raw/names"),
            out_dir: PathBuf::from("data"),
        }
    }
}

impl BuildConfig {
    /// Both corpora must exist before the build starts
    pub fn validate(&self) -> Result<()> {
        for path in [&self.stripped_path, &self.names_path] {
            if !path.is_file() {
                return Err(VoeisError::CorpusNotFound(path.clone()));
            }
        }
        Ok(())
    }
}

/// Caps applied while loading the store
///
/// # Example
/// ```
/// use voeis::config::LoadConfig;
///
/// let config = LoadConfig::default();
/// assert_eq!(config.offset_cap, 6);
/// assert_eq!(config.neighbor_cap, 12);
/// assert!(config.sequence_cap.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Stop after this many sequences (`None` = all)
    pub sequence_cap: Option<usize>,

    /// Stop after this many numbers (`None` = all)
    pub number_cap: Option<usize>,

    /// Keep neighbor tables for offsets within ±`offset_cap` (at most 6)
    pub offset_cap: usize,

    /// Keep at most this many neighbors per offset (at most 12)
    pub neighbor_cap: usize,

    /// Value range used by the Sloane's gap report
    pub gap_range: GapRange,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            sequence_cap: None,
            number_cap: None,
            offset_cap: MAX_NEIGHBOR_OFFSET,
            neighbor_cap: MAX_NEIGHBORS_PER_OFFSET,
            gap_range: GapRange::default(),
        }
    }
}

impl LoadConfig {
    /// Memory-constrained deployment: only the first 20,736 numbers
    pub fn constrained() -> Self {
        Self {
            number_cap: Some(CONSTRAINED_NUMBER_CAP),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| VoeisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| VoeisError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.offset_cap > MAX_NEIGHBOR_OFFSET {
            return Err(VoeisError::InvalidConfig(format!(
                "offset_cap must be <= {MAX_NEIGHBOR_OFFSET}, got {}",
                self.offset_cap
            )));
        }

        if self.neighbor_cap > MAX_NEIGHBORS_PER_OFFSET {
            return Err(VoeisError::InvalidConfig(format!(
                "neighbor_cap must be <= {MAX_NEIGHBORS_PER_OFFSET}, got {}",
                self.neighbor_cap
            )));
        }

        if self.gap_range.min > self.gap_range.max {
            return Err(VoeisError::InvalidConfig(format!(
                "gap_range min {} exceeds max {}",
                self.gap_range.min, self.gap_range.max
            )));
        }

        Ok(())
    }
}
