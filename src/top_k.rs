//! Top-k selection over scored candidates.
//!
//! Ranking is by descending score; equal scores rank the higher index first.
//! Two selectors share that order: [`select_top_k`] collects everything and
//! extracts the best `k`, [`TopK`] streams candidates through a bounded
//! min-heap. Both return identical output for the same candidates.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A neighbor: position in the collection and its similarity to the query.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub index: usize,
    pub score: f32,
}

impl SearchResult {
    pub fn new(index: usize, score: f32) -> Self {
        Self { index, score }
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Greater means ranked ahead: higher score, then higher index.
impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Extract the best `k` of `candidates`, best first.
pub fn select_top_k(mut candidates: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    if k == 0 {
        return Vec::new();
    }
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, |a, b| b.cmp(a));
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    candidates
}

/// Bounded streaming selector holding at most `k` candidates.
///
/// The heap top is the worst member held, so eviction always removes the
/// lowest score (the lower index among equal lowest scores).
#[derive(Debug)]
pub struct TopK {
    heap: BinaryHeap<Reverse<SearchResult>>,
    k: usize,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
            k,
        }
    }

    /// Offer a candidate; returns whether it was admitted.
    pub fn push(&mut self, index: usize, score: f32) -> bool {
        if self.k == 0 {
            return false;
        }
        let candidate = SearchResult::new(index, score);
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
            return true;
        }
        match self.heap.peek() {
            Some(Reverse(worst)) if candidate > *worst => {
                self.heap.pop();
                self.heap.push(Reverse(candidate));
                true
            }
            _ => false,
        }
    }

    /// Whether `k` candidates are held.
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Score of the worst member once full; below every score until then.
    pub fn worst_score(&self) -> f32 {
        if !self.is_full() {
            return f32::NEG_INFINITY;
        }
        self.heap
            .peek()
            .map(|Reverse(r)| r.score)
            .unwrap_or(f32::NEG_INFINITY)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into a Vec ordered best first.
    pub fn into_sorted_vec(self) -> Vec<SearchResult> {
        // Ascending order of Reverse is descending order of the results.
        self.heap.into_sorted_vec().into_iter().map(|Reverse(r)| r).collect()
    }
}
