//! Helpers for the remote sequence database
//!
//! Only the boundary is modelled here: building request URLs and parsing
//! response bodies. Fetching is left to the caller, so everything in this
//! module is pure and testable offline.

use crate::corpus::parse_term;
use crate::sequence_id::{SequenceId, A_NUMBER_DIGITS};

/// Base URL of the remote database
pub const BASE_URL: &str = "https://oeis.org";

/// Default number of search results requested
pub const DEFAULT_SEARCH_CAP: usize = 12;

/// Default number of extended terms kept from a b-file
pub const DEFAULT_FETCH_CAP: usize = 1_728;

/// Marker preceding each id in a text-format search response
const SEARCH_ID_MARKER: &str = "%I A";

/// URL of a text-format full-text search returning at most `cap` results
pub fn search_url(query: &str, cap: usize) -> String {
    let query = query.trim().replace(' ', "%20");
    format!("{BASE_URL}/search?q={query}&n={cap}&fmt=text")
}

/// URL of the b-file (extended terms) for a sequence
pub fn bfile_url(id: SequenceId) -> String {
    format!("{BASE_URL}/{id}/b{:06}.txt", id.number())
}

/// Ids in the order they appear in a text-format search response
///
/// Entries whose id does not parse are ignored. Pass the result through
/// `QueryEngine::resolve` to keep only sequences present in the store.
pub fn parse_search_ids(response: &str) -> Vec<SequenceId> {
    response
        .split(SEARCH_ID_MARKER)
        .skip(1)
        .filter_map(|entry| entry.get(..A_NUMBER_DIGITS))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .map(SequenceId::new)
        .collect()
}

/// Parse one `n a(n)` line into its term
///
/// `None` for anything that is not such a pair (comments, blank lines);
/// `Some(None)` for a pair whose term does not fit in an `i32`.
fn bfile_term(line: &str) -> Option<Option<i32>> {
    let mut tokens = line.split_whitespace();
    let (index, term, rest) = (tokens.next()?, tokens.next()?, tokens.next());
    if rest.is_some() {
        return None;
    }
    parse_term(index).ok()?;
    parse_term(term).ok()
}

/// Terms of a b-file, at most `cap` of them
///
/// Leading comment lines are skipped until the first `n a(n)` pair. The
/// terms stop at the first value outside the `i32` range, since the ones
/// after it could not be contiguous.
pub fn parse_bfile(body: &str, cap: usize) -> Vec<i32> {
    body.lines()
        .filter_map(bfile_term)
        .map_while(|term| term)
        .take(cap)
        .collect()
}
