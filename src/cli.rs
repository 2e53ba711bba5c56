//! CLI argument parsing for voeis

use crate::config::{BuildConfig, GapRange, LoadConfig};
use crate::error::Result;
use crate::sequence_id::SequenceId;
use crate::store::StorePaths;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "voeis")]
#[command(version)]
#[command(about = "Build and query a co-occurrence store over the OEIS", long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the store from the raw `stripped` and `names` files
    Build(BuildArgs),

    /// Print one sequence as JSON (`{}` when unknown)
    Sequence {
        #[command(flatten)]
        load: LoadArgs,

        /// A-number, e.g. A000045 or 45
        id: SequenceId,
    },

    /// Print statistics for one value as JSON (`{}` when unseen)
    Number {
        #[command(flatten)]
        load: LoadArgs,

        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Print how many sequences contain each value in a range
    Gap {
        #[command(flatten)]
        load: LoadArgs,

        /// Lower bound (inclusive); defaults to the configured gap range
        #[arg(allow_negative_numbers = true, requires = "max")]
        min: Option<i32>,

        /// Upper bound (inclusive)
        #[arg(allow_negative_numbers = true)]
        max: Option<i32>,
    },

    /// Resolve the ids of a saved text-format search response against the store
    Resolve {
        #[command(flatten)]
        load: LoadArgs,

        /// Search response body, as saved from the remote search
        response: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Path to the `stripped` terms file
    #[arg(long, value_name = "FILE", default_value = "data/raw/stripped")]
    pub stripped: PathBuf,

    /// Path to the `names` file
    #[arg(long, value_name = "FILE", default_value = "data/raw/names")]
    pub names: PathBuf,

    /// Directory that receives `sequences.txt` and `numbers.txt`
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub out: PathBuf,
}

impl BuildArgs {
    pub fn to_config(&self) -> BuildConfig {
        BuildConfig {
            stripped_path: self.stripped.clone(),
            names_path: self.names.clone(),
            out_dir: self.out.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Store directory
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub db: PathBuf,

    /// TOML load configuration; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Load at most this many sequences
    #[arg(short = 's', long, value_name = "N")]
    pub sequence_cap: Option<usize>,

    /// Load at most this many numbers
    #[arg(short = 'n', long, value_name = "N")]
    pub number_cap: Option<usize>,

    /// Keep neighbor tables for offsets within ±N (at most 6)
    #[arg(short = 'o', long, value_name = "N")]
    pub offset_cap: Option<usize>,

    /// Keep at most N neighbors per offset (at most 12)
    #[arg(short = 'e', long, value_name = "N")]
    pub neighbor_cap: Option<usize>,

    /// Value range of the Sloane's gap report
    #[arg(
        short = 'g',
        long,
        num_args = 2,
        value_names = ["MIN", "MAX"],
        allow_negative_numbers = true
    )]
    pub gap_range: Option<Vec<i32>>,
}

impl LoadArgs {
    pub fn paths(&self) -> StorePaths {
        StorePaths::in_dir(&self.db)
    }

    /// Config file (or defaults) with command-line overrides applied
    pub fn to_config(&self) -> Result<LoadConfig> {
        let mut config = match &self.config {
            Some(path) => LoadConfig::from_file(path)?,
            None => LoadConfig::default(),
        };

        if let Some(cap) = self.sequence_cap {
            config.sequence_cap = Some(cap);
        }
        if let Some(cap) = self.number_cap {
            config.number_cap = Some(cap);
        }
        if let Some(cap) = self.offset_cap {
            config.offset_cap = cap;
        }
        if let Some(cap) = self.neighbor_cap {
            config.neighbor_cap = cap;
        }
        if let Some([min, max]) = self.gap_range.as_deref() {
            config.gap_range = GapRange::new(*min, *max);
        }

        config.validate()?;
        Ok(config)
    }
}
