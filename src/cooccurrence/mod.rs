// Co-occurrence statistics over integer sequences
//
// For every distinct term value in the corpus this tracks how often it occurs,
// in how many sequences, at which positions, and which values sit next to it
// at each relative offset in -6..-1, +1..+6. The neighbor buckets can grow
// without bound during the pass; `finish` reduces each one to its twelve most
// popular entries.
//
// Offsets that fall outside a sequence contribute nothing: no wraparound and
// no padding.

mod aggregator;
mod topk;

pub use aggregator::{aggregate, Aggregator};
pub use topk::top_k;
