//! Command-line tests: build a store and query it through the binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use predicates::prelude::*;
use std::fs;
use utils::Corpus;

fn built_corpus() -> Corpus {
    let corpus = Corpus::sample();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("build")
        .arg("--stripped")
        .arg(&corpus.config.stripped_path)
        .arg("--names")
        .arg(&corpus.config.names_path)
        .arg("--out")
        .arg(corpus.out_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sequences_emitted\": 6"))
        .stdout(predicate::str::contains("numbers_sha256"));
    corpus
}

#[test]
fn test_cli_help() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("gap"));
}

#[test]
fn test_cli_requires_subcommand() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.assert().failure();
}

#[test]
fn test_build_missing_corpus_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("build")
        .arg("--stripped")
        .arg(dir.path().join("nope"))
        .arg("--names")
        .arg(dir.path().join("nope"))
        .arg("--out")
        .arg(dir.path().join("db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corpus file not found"));
}

#[test]
fn test_sequence_lookup() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("sequence")
        .arg("--db")
        .arg(corpus.out_dir())
        .arg("A000045")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"A000045\""))
        .stdout(predicate::str::contains("Fibonacci numbers"));
}

#[test]
fn test_sequence_miss_prints_empty_object() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("sequence")
        .arg("--db")
        .arg(corpus.out_dir())
        .arg("999999")
        .assert()
        .success()
        .stdout(predicate::eq("{}\n"));
}

#[test]
fn test_number_lookup_negative_value() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    let output = cmd
        .arg("number")
        .arg("--db")
        .arg(corpus.out_dir())
        .arg("-1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["value"], -1);
    assert_eq!(json["total_count"], 4);
    assert_eq!(json["total_sequence_count"], 1);
    assert_eq!(json["neighbors"]["1"][0]["value"], 1);
}

#[test]
fn test_number_miss_prints_empty_object() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("number")
        .arg("--db")
        .arg(corpus.out_dir())
        .arg("77")
        .assert()
        .success()
        .stdout(predicate::eq("{}\n"));
}

#[test]
fn test_gap_report_explicit_range() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    let output = cmd
        .arg("gap")
        .arg("--db")
        .arg(corpus.out_dir())
        .args(["-1", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["-1"], 1);
    assert_eq!(json["0"], 2);
    assert_eq!(json["1"], 5);
    assert_eq!(json["3"], 3);
}

#[test]
fn test_gap_report_configured_range() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    let output = cmd
        .arg("gap")
        .arg("--db")
        .arg(corpus.out_dir())
        .args(["-g", "5", "8"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["5", "6", "7", "8"]);
}

#[test]
fn test_missing_store_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("gap")
        .arg("--db")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Store artifact not found"));
}

#[test]
fn test_invalid_offset_cap_rejected() {
    let corpus = built_corpus();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.arg("number")
        .arg("--db")
        .arg(corpus.out_dir())
        .args(["-o", "7", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offset_cap"));
}

#[test]
fn test_resolve_search_response() {
    let corpus = built_corpus();
    let response = corpus.dir.path().join("search.txt");
    fs::write(
        &response,
        "%I A000045 M0692\n%N A000045 Fibonacci numbers.\n\n%I A123456\n\n%I A000042\n",
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    let output = cmd
        .arg("resolve")
        .arg("--db")
        .arg(corpus.out_dir())
        .arg(&response)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["A000045", "A000042"]);
}

#[test]
fn test_build_logs_progress_on_stderr() {
    let corpus = Corpus::sample();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("voeis");
    cmd.env_remove("RUST_LOG")
        .arg("build")
        .arg("--stripped")
        .arg(&corpus.config.stripped_path)
        .arg("--names")
        .arg(&corpus.config.names_path)
        .arg("--out")
        .arg(corpus.out_dir())
        .assert()
        .success()
        .stderr(predicate::str::contains("store built"));
    assert!(corpus.out_dir().join("numbers.txt").is_file());
}
