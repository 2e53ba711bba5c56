use crate::store::Neighbor;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Neighbor ordered by popularity: higher count first, then smaller value
///
/// `a > b` means `a` ranks ahead of `b`. Values are unique within one bucket,
/// so this is a total order and the selection is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked(Neighbor);

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .count
            .cmp(&other.0.count)
            .then_with(|| other.0.value.cmp(&self.0.value))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the `k` most popular neighbors from one bucket
///
/// Runs a min-heap capped at `k` entries, O(n log k). The result is ordered
/// best first: count descending, ties broken by neighbor value ascending.
///
/// # Example
/// ```
/// use voeis::cooccurrence::top_k;
/// use voeis::store::Neighbor;
///
/// let bucket = [(5, 1), (7, 3), (2, 3), (9, 2)]
///     .map(|(value, count)| Neighbor { value, count });
/// let best = top_k(bucket, 2);
///
/// assert_eq!(best, vec![Neighbor { value: 2, count: 3 }, Neighbor { value: 7, count: 3 }]);
/// ```
pub fn top_k(candidates: impl IntoIterator<Item = Neighbor>, k: usize) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k + 1);
    for neighbor in candidates {
        let candidate = Ranked(neighbor);
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if heap.peek().is_some_and(|Reverse(worst)| candidate > *worst) {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }

    // Ascending over Reverse is descending over Ranked: best first.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(Ranked(neighbor))| neighbor)
        .collect()
}
