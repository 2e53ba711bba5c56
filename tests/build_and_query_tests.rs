//! End-to-end tests: build a store from a corpus, load it, query it

mod utils;

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use utils::Corpus;
use voeis::build::build_store;
use voeis::config::{GapRange, LoadConfig};
use voeis::query::QueryEngine;
use voeis::store::{load_store, StorePaths};
use voeis::{SequenceId, VoeisError};

fn engine_for(corpus: &Corpus, config: &LoadConfig) -> QueryEngine {
    let (store, _) = load_store(&StorePaths::in_dir(corpus.out_dir()), config).unwrap();
    QueryEngine::new(Arc::new(store), config.gap_range)
}

#[test]
fn test_single_sequence_scenario() {
    let corpus = Corpus::new("A000042 ,1,2,3,2,1,\n", "A000042 Test\n");
    build_store(&corpus.config).unwrap();
    let engine = engine_for(&corpus, &LoadConfig::default());

    let sequence = engine.get_sequence(SequenceId::new(42)).unwrap();
    assert_eq!(sequence.name, "Test");
    assert_eq!(sequence.terms, vec![1, 2, 3, 2, 1]);

    let two = engine.get_number(2).unwrap();
    assert_eq!(two.total_count, 2);
    assert_eq!(two.total_sequence_count, 1);
    assert_eq!(two.index_counts, BTreeMap::from([(1, 1), (3, 1)]));
    assert_eq!(two.neighbor_count(1, 3), Some(1));
    assert_eq!(two.neighbor_count(1, 1), Some(1));
    assert_eq!(two.neighbor_count(-1, 1), Some(1));
    assert_eq!(two.neighbor_count(-1, 3), Some(1));

    assert_eq!(
        engine.gap_report(0, 5),
        BTreeMap::from([(1, 1), (2, 1), (3, 1)])
    );
}

#[test]
fn test_sample_corpus_summary() {
    let corpus = Corpus::sample();
    let summary = build_store(&corpus.config).unwrap();

    assert_eq!(summary.corpus.sequences_read, 6);
    assert_eq!(summary.corpus.sequences_emitted, 6);
    assert_eq!(summary.corpus.terms_dropped, 2);
    assert_eq!(summary.corpus.missing_names, 0);
    assert_eq!(summary.sequences_sha256.len(), 64);
    assert_eq!(summary.numbers_sha256.len(), 64);
}

#[test]
fn test_out_of_range_terms_never_stored() {
    let corpus = Corpus::sample();
    build_store(&corpus.config).unwrap();
    let engine = engine_for(&corpus, &LoadConfig::default());

    let powers = engine.get_sequence(SequenceId::new(79)).unwrap();
    assert_eq!(powers.terms.len(), 31);
    assert_eq!(powers.terms.last(), Some(&1_073_741_824));

    let numbers = fs::read_to_string(StorePaths::in_dir(corpus.out_dir()).numbers).unwrap();
    assert!(!numbers.contains("2147483648"));
    assert!(!numbers.contains("4294967296"));
}

#[test]
fn test_fully_out_of_range_sequence_dropped() {
    let corpus = Corpus::new(
        "A000001 ,1,2,\nA000002 ,2147483648,-2147483649,\n",
        "A000001 one\nA000002 huge\n",
    );
    let summary = build_store(&corpus.config).unwrap();
    assert_eq!(summary.corpus.sequences_read, 2);
    assert_eq!(summary.corpus.empty_sequences_dropped, 1);

    let engine = engine_for(&corpus, &LoadConfig::default());
    assert!(engine.get_sequence(SequenceId::new(1)).is_some());
    assert!(engine.get_sequence(SequenceId::new(2)).is_none());
}

#[test]
fn test_missing_name_kept_with_empty_name() {
    let corpus = Corpus::new("A000007 ,1,0,0,\n", "A000008 other\n");
    let summary = build_store(&corpus.config).unwrap();
    assert_eq!(summary.corpus.missing_names, 1);

    let engine = engine_for(&corpus, &LoadConfig::default());
    let record = engine.get_sequence(SequenceId::new(7)).unwrap();
    assert_eq!(record.name, "");
    assert_eq!(record.terms, vec![1, 0, 0]);
}

#[test]
fn test_rebuild_is_byte_identical() {
    let corpus = Corpus::sample();
    let paths = StorePaths::in_dir(corpus.out_dir());

    let first = build_store(&corpus.config).unwrap();
    let sequences = fs::read(&paths.sequences).unwrap();
    let numbers = fs::read(&paths.numbers).unwrap();

    let second = build_store(&corpus.config).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&paths.sequences).unwrap(), sequences);
    assert_eq!(fs::read(&paths.numbers).unwrap(), numbers);
}

#[test]
fn test_failed_rebuild_keeps_previous_store() {
    let corpus = Corpus::sample();
    build_store(&corpus.config).unwrap();
    let paths = StorePaths::in_dir(corpus.out_dir());
    let before = fs::read(&paths.numbers).unwrap();

    fs::write(&corpus.config.stripped_path, "A000001 ,1,x,\n").unwrap();
    let err = build_store(&corpus.config).unwrap_err();
    assert!(matches!(err, VoeisError::MalformedCorpus { line: 1, .. }));
    assert_eq!(fs::read(&paths.numbers).unwrap(), before);
}

#[test]
fn test_store_invariants_after_load() {
    let corpus = Corpus::sample();
    build_store(&corpus.config).unwrap();
    let engine = engine_for(&corpus, &LoadConfig::default());

    for number in engine.store().numbers().values() {
        let index_total: u64 = number.index_counts.values().sum();
        assert_eq!(index_total, number.total_count);
        assert!(number.total_sequence_count <= number.total_count);
        for table in &number.neighbors {
            assert!(table.len() <= 12);
        }
    }

    // 1 appears in A000027, A000042 (twice), A000045 (twice), A000079 and A033999 (4x)
    let one = engine.get_number(1).unwrap();
    assert_eq!(one.total_sequence_count, 5);
    assert_eq!(one.total_count, 10);
    assert!(engine.get_number(0).unwrap().total_sequence_count == 2);
}

#[test]
fn test_gap_report_ranges() {
    let corpus = Corpus::sample();
    build_store(&corpus.config).unwrap();
    let config = LoadConfig {
        gap_range: GapRange::new(-1, 3),
        ..LoadConfig::default()
    };
    let engine = engine_for(&corpus, &config);

    let gap = engine.sloanes_gap();
    assert_eq!(gap.keys().copied().collect::<Vec<_>>(), vec![-1, 0, 1, 2, 3]);
    assert_eq!(gap[&-1], 1);
    assert_eq!(gap[&2], 4);

    assert_eq!(engine.gap_report(i32::MIN, -2), BTreeMap::new());
    assert_eq!(engine.gap_report(10, 5), BTreeMap::new());
    assert!(engine.gap_report(i32::MIN, i32::MAX).contains_key(&1_073_741_824));
}

#[test]
fn test_load_caps_shrink_store() {
    let corpus = Corpus::sample();
    build_store(&corpus.config).unwrap();
    let config = LoadConfig {
        sequence_cap: Some(3),
        offset_cap: 2,
        neighbor_cap: 3,
        ..LoadConfig::default()
    };
    let engine = engine_for(&corpus, &config);

    assert_eq!(engine.store().sequence_count(), 3);
    assert!(engine.get_sequence(SequenceId::new(42)).is_some());
    assert!(engine.get_sequence(SequenceId::new(45)).is_none());

    let one = engine.get_number(1).unwrap();
    assert!(one.neighbors_at(3).is_empty());
    assert!(one.neighbors_at(1).len() <= 3);
    assert_eq!(one.total_count, 10);
}

#[test]
fn test_missing_store_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = load_store(&StorePaths::in_dir(dir.path()), &LoadConfig::default()).unwrap_err();
    assert!(matches!(err, VoeisError::ArtifactNotFound(_)));
}
