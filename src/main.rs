use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use voeis::cli::{Cli, Command, LoadArgs};
use voeis::query::QueryEngine;
use voeis::{build, remote, store};

/// Initialize tracing subscriber; progress goes to stderr, results to stdout
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Misses print an empty object rather than failing
fn print_optional<T: Serialize>(value: Option<&T>) -> Result<()> {
    match value {
        Some(value) => print_json(value),
        None => {
            println!("{{}}");
            Ok(())
        }
    }
}

fn open_engine(load: &LoadArgs) -> Result<QueryEngine> {
    let config = load.to_config()?;
    let (store, report) = store::load_store(&load.paths(), &config)
        .with_context(|| format!("failed to load store from {}", load.db.display()))?;
    debug!(?report, "load report");
    Ok(QueryEngine::new(Arc::new(store), config.gap_range))
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    match args.command {
        Command::Build(build_args) => {
            let summary = build::build_store(&build_args.to_config())
                .context("store build failed")?;
            print_json(&summary)
        }
        Command::Sequence { load, id } => {
            let engine = open_engine(&load)?;
            print_optional(engine.get_sequence(id))
        }
        Command::Number { load, value } => {
            let engine = open_engine(&load)?;
            print_optional(engine.get_number(value))
        }
        Command::Gap { load, min, max } => {
            let engine = open_engine(&load)?;
            let report = match (min, max) {
                (Some(min), Some(max)) => engine.gap_report(min, max),
                _ => engine.sloanes_gap(),
            };
            print_json(&report)
        }
        Command::Resolve { load, response } => {
            let body = std::fs::read(&response)
                .with_context(|| format!("failed to read {}", response.display()))?;
            let ids = remote::parse_search_ids(&String::from_utf8_lossy(&body));
            let engine = open_engine(&load)?;
            print_json(&engine.resolve(ids))
        }
    }
}
