//! Store build pipeline
//!
//! `Parsing → Aggregating → Selecting → Serializing → Done`. Stages run in
//! order exactly once. `Parsing` loads the name index and opens the corpus;
//! the stripped corpus itself is streamed and parsed during `Aggregating`,
//! with each record written and counted as it arrives.
//!
//! Both artifacts are staged in temporary files and only published after
//! every stage succeeded. Publishing renames them together and restores the
//! previous store if either rename fails, so a failure anywhere leaves the
//! previous store untouched.

use crate::config::BuildConfig;
use crate::cooccurrence::Aggregator;
use crate::corpus::{CorpusStats, NameIndex, SequenceReader};
use crate::error::Result;
use crate::store::{publish, ArtifactWriter, StorePaths, MAX_NEIGHBORS_PER_OFFSET};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

const SEQUENCE_PROGRESS_INTERVAL: usize = 10_000;
const NUMBER_PROGRESS_INTERVAL: usize = 25_000;

/// Stage of a running build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BuildStage {
    Parsing,
    Aggregating,
    Selecting,
    Serializing,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Parsing => "parsing",
            BuildStage::Aggregating => "aggregating",
            BuildStage::Selecting => "selecting",
            BuildStage::Serializing => "serializing",
            BuildStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    #[serde(flatten)]
    pub corpus: CorpusStats,
    /// Distinct term values written to the number artifact
    pub distinct_numbers: usize,
    /// Hex SHA-256 of `sequences.txt`
    pub sequences_sha256: String,
    /// Hex SHA-256 of `numbers.txt`
    pub numbers_sha256: String,
}

/// Drives one build through its stages
#[derive(Debug)]
pub struct BuildPipeline {
    config: BuildConfig,
    stage: BuildStage,
}

impl BuildPipeline {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            stage: BuildStage::Parsing,
        }
    }

    fn advance(&mut self, next: BuildStage) {
        debug_assert!(next > self.stage, "build stage {next} after {}", self.stage);
        info!(from = %self.stage, to = %next, "build stage");
        self.stage = next;
    }

    /// Run every stage; consumes the pipeline since stages never re-enter
    pub fn run(mut self) -> Result<BuildSummary> {
        self.config.validate()?;
        let paths = StorePaths::in_dir(&self.config.out_dir);

        info!(path = %self.config.names_path.display(), "loading sequence names");
        let names = NameIndex::from_path(&self.config.names_path)?;
        let mut reader = SequenceReader::open(&self.config.stripped_path, &names)?;

        self.advance(BuildStage::Aggregating);
        let mut sequence_writer = ArtifactWriter::create(&paths.sequences)?;
        let mut aggregator = Aggregator::new();
        for record in reader.by_ref() {
            let record = record?;
            sequence_writer.write_sequence(&record)?;
            aggregator.add(&record);

            let written = aggregator.sequences_seen() as usize;
            if written % SEQUENCE_PROGRESS_INTERVAL == 0 {
                info!("  at sequence {written} of {}", names.len());
            }
        }
        let corpus = reader.stats().clone();
        debug!(?corpus, distinct = aggregator.distinct_values(), "corpus aggregated");

        self.advance(BuildStage::Selecting);
        let numbers = aggregator.finish(MAX_NEIGHBORS_PER_OFFSET);

        self.advance(BuildStage::Serializing);
        let mut number_writer = ArtifactWriter::create(&paths.numbers)?;
        for (i, number) in numbers.iter().enumerate() {
            number_writer.write_number(number)?;
            if (i + 1) % NUMBER_PROGRESS_INTERVAL == 0 {
                info!("  at number {} of {}", i + 1, numbers.len());
            }
        }
        let staged = vec![sequence_writer.finish()?, number_writer.finish()?];
        // One digest per staged artifact, in order.
        let digests = publish(staged)?;
        let (sequences_sha256, numbers_sha256) = (digests[0].clone(), digests[1].clone());

        self.advance(BuildStage::Done);
        let summary = BuildSummary {
            corpus,
            distinct_numbers: numbers.len(),
            sequences_sha256,
            numbers_sha256,
        };
        info!(
            sequences = summary.corpus.sequences_emitted,
            numbers = summary.distinct_numbers,
            missing_names = summary.corpus.missing_names,
            "store built"
        );
        Ok(summary)
    }
}

/// Build the store described by `config`
pub fn build_store(config: &BuildConfig) -> Result<BuildSummary> {
    BuildPipeline::new(config.clone()).run()
}
