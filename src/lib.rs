//! voeis - co-occurrence statistics over the integer sequences of the OEIS
//!
//! A one-off build parses the OEIS `stripped` and `names` dumps, counts how
//! often every term value occurs, where, and next to which other values, and
//! writes two flat artifacts. The query side loads them into read-only maps
//! and answers sequence lookups, number lookups and the Sloane's gap report.

pub mod build;
pub mod cli;
pub mod config;
pub mod cooccurrence;
pub mod corpus;
pub mod error;
pub mod line_reader;
pub mod query;
pub mod remote;
pub mod sequence_id;
pub mod store;

pub use error::{Result, VoeisError};
pub use query::QueryEngine;
pub use sequence_id::SequenceId;
