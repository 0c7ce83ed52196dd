//! A static index over half-open integer intervals.
//!
//! Intervals are partitioned into bins by length: the bin with span `S` holds
//! every interval whose length `L` satisfies `S / Q < L <= S`, where `S` is a
//! power of the base `Q`. Because no interval in that bin is longer than `S`,
//! any interval in it that overlaps a query `[first, stop)` must start in
//! `[first - S + 1, stop)`. That window is found with two predecessor searches
//! over the bin's start-sorted entries, the few candidates that end too early
//! are filtered out, and the per-bin results are merged back into one
//! start-sorted list.

use super::interval::{overlaps, GenericInterval};
use super::merge::merge_sorted_by_into;
use super::search::predecessor_index_in;
use log::debug;
use std::cmp::Ordering;
use std::fmt;

/// Base used for bin spans unless `IntervalIndex::with_bin_base` says otherwise.
pub const DEFAULT_BIN_BASE: u32 = 2;

// An interval as stored in a bin: its precomputed bounds and its position in
// the original item sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    start: i32,
    stop: i32,
    index: usize,
}

// start ascending, then longer first, then insertion order
#[inline(always)]
fn entry_cmp(a: &Entry, b: &Entry) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.stop.cmp(&a.stop))
        .then_with(|| a.index.cmp(&b.index))
}

// Entries whose length is at most `span`, sorted by `entry_cmp`.
#[derive(Clone, Debug)]
struct Bin {
    span: i64,
    entries: Vec<Entry>,
}

/// Size of one length bin, as reported by `IntervalIndex::bins`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinSummary {
    /// Upper bound on the length of every interval in the bin.
    pub span: i64,
    /// Number of intervals in the bin.
    pub len: usize,
}

/// Reusable per-query buffers.
///
/// Queries on a shared `IntervalIndex` never mutate the index; everything
/// they need to write goes here. A scratch must not be shared between queries
/// running at the same time.
#[derive(Default, Debug)]
pub struct QueryScratch {
    candidates: Vec<Vec<Entry>>,
    merged: Vec<Entry>,
}

impl QueryScratch {
    pub fn new() -> QueryScratch {
        QueryScratch::default()
    }

    fn reset(&mut self, nbins: usize) {
        if self.candidates.len() < nbins {
            self.candidates.resize_with(nbins, Vec::new);
        }
        for candidates in &mut self.candidates {
            candidates.clear();
        }
        self.merged.clear();
    }
}

/// A static set of intervals supporting fast overlap queries.
///
/// Each item's `start` (inclusive) and `stop` (exclusive) are computed exactly
/// once, at construction. Results come back ordered by start ascending, then
/// stop descending, then original position, regardless of insertion order.
///
/// # Examples
/// ```
/// use rangebins::IntervalIndex;
///
/// let ranges = vec![(1, 2), (3, 4), (5, 6), (0, 5), (1, 6), (1, 17), (1, 18)];
/// let index = IntervalIndex::new(ranges, |r| r.0, |r| r.1);
///
/// let found: Vec<(i32, i32)> = index.overlapping_items(17, 100).into_iter().copied().collect();
/// assert_eq!(found, [(1, 18)]);
///
/// let found: Vec<(i32, i32)> = index.overlapping_items(16, 100).into_iter().copied().collect();
/// assert_eq!(found, [(1, 18), (1, 17)]);
/// ```
#[derive(Clone)]
pub struct IntervalIndex<T> {
    items: Vec<T>,

    // (start, stop) for each item, parallel to `items`
    bounds: Vec<(i32, i32)>,

    // ascending by span; only spans that are actually used
    bins: Vec<Bin>,

    base: u32,
}

impl<T> IntervalIndex<T> {
    /// Index `items`, using `start` and `stop` to read each item's bounds.
    pub fn new<S, E>(items: Vec<T>, start: S, stop: E) -> IntervalIndex<T>
    where
        S: Fn(&T) -> i32,
        E: Fn(&T) -> i32,
    {
        Self::with_bin_base(items, start, stop, DEFAULT_BIN_BASE)
    }

    /// Index `items` with bin spans that are powers of `base`.
    ///
    /// Larger bases give fewer bins (so cheaper merges) but wider candidate
    /// windows per bin.
    ///
    /// # Panics
    /// If `base < 2`.
    pub fn with_bin_base<S, E>(items: Vec<T>, start: S, stop: E, base: u32) -> IntervalIndex<T>
    where
        S: Fn(&T) -> i32,
        E: Fn(&T) -> i32,
    {
        assert!(base >= 2, "bin base must be at least 2, got {}", base);

        let bounds: Vec<(i32, i32)> = items.iter().map(|item| (start(item), stop(item))).collect();

        let mut binned: Vec<(i64, Entry)> = bounds
            .iter()
            .enumerate()
            .map(|(index, &(start, stop))| {
                let span = bin_span(stop as i64 - start as i64, base);
                (span, Entry { start, stop, index })
            })
            .collect();

        binned.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| entry_cmp(&a.1, &b.1)));

        let mut bins: Vec<Bin> = Vec::new();
        for (span, entry) in binned {
            match bins.last_mut() {
                Some(bin) if bin.span == span => bin.entries.push(entry),
                _ => bins.push(Bin {
                    span,
                    entries: vec![entry],
                }),
            }
        }

        debug!(
            "indexed {} intervals into {} bins (base {})",
            items.len(),
            bins.len(),
            base
        );

        IntervalIndex {
            items,
            bounds,
            bins,
            base,
        }
    }

    /// Number of intervals in the set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True iff the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn bin_base(&self) -> u32 {
        self.base
    }

    /// The indexed items, in their original order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// `(start, stop)` of the item at `index`, as read at construction.
    pub fn bounds(&self, index: usize) -> Option<(i32, i32)> {
        self.bounds.get(index).copied()
    }

    /// Iterate through the items in their original order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Non-empty bins in ascending span order.
    pub fn bins(&self) -> impl Iterator<Item = BinSummary> + '_ {
        self.bins.iter().map(|bin| BinSummary {
            span: bin.span,
            len: bin.entries.len(),
        })
    }

    /// Write a one-line summary of every bin to the debug log.
    pub fn log_bins(&self) {
        for bin in self.bins() {
            debug!("bin length<={}: {} intervals", bin.span, bin.len);
        }
    }

    /// Find items overlapping `[first, stop)` and call `visit` on each with
    /// its original index, in result order. `scratch` is reused between calls
    /// to avoid reallocating.
    pub fn query_with<'a, F>(
        &'a self,
        first: i32,
        stop: i32,
        scratch: &mut QueryScratch,
        mut visit: F,
    ) where
        F: FnMut(usize, &'a T),
    {
        self.collect_into(first, stop, scratch);
        for entry in &scratch.merged {
            visit(entry.index, &self.items[entry.index]);
        }
    }

    /// Find items overlapping `[first, stop)` and call `visit` on each with
    /// its original index, in result order.
    pub fn query<'a, F>(&'a self, first: i32, stop: i32, visit: F)
    where
        F: FnMut(usize, &'a T),
    {
        self.query_with(first, stop, &mut QueryScratch::new(), visit);
    }

    /// Original indices of all items overlapping `[first, stop)`, ordered by
    /// start ascending, then stop descending.
    pub fn overlapping_indices(&self, first: i32, stop: i32) -> Vec<usize> {
        let mut out = Vec::new();
        self.query(first, stop, |i, _| out.push(i));
        out
    }

    /// All items overlapping `[first, stop)`, ordered by start ascending, then
    /// stop descending. Does not preserve insertion order.
    pub fn overlapping_items(&self, first: i32, stop: i32) -> Vec<&T> {
        let mut out = Vec::new();
        self.query(first, stop, |_, item| out.push(item));
        out
    }

    /// Count the number of intervals in the set overlapping `[first, stop)`.
    pub fn query_count(&self, first: i32, stop: i32) -> usize {
        let mut count = 0;
        for bin in &self.bins {
            if let Some((from, to)) = candidate_window(bin, first, stop) {
                count += bin.entries[from..to]
                    .iter()
                    .filter(|entry| entry.stop > first)
                    .count();
            }
        }
        count
    }

    /// Return a pair `(count, cov)`, where `count` gives the number of intervals
    /// in the set overlapping `[first, stop)`, and `cov` the number of positions
    /// in that query covered by at least one interval in the set.
    pub fn coverage(&self, first: i32, stop: i32) -> (usize, usize) {
        let mut scratch = QueryScratch::new();
        self.collect_into(first, stop, &mut scratch);

        let count = scratch.merged.len();
        if first >= stop {
            return (count, 0);
        }

        // sweep the start-sorted hits, clamped to the query
        let mut covered: i64 = 0;
        let mut cov_stop = first as i64;
        for entry in &scratch.merged {
            let start = (entry.start as i64).max(cov_stop);
            let end = (entry.stop as i64).min(stop as i64);
            if end > start {
                covered += end - start;
                cov_stop = end;
            }
        }

        (count, covered as usize)
    }

    /// Brute-force version of `overlapping_indices`, in insertion order. We
    /// test against this algorithm which we assume to be correct.
    pub fn overlapping_indices_reference(&self, first: i32, stop: i32) -> Vec<usize> {
        self.bounds
            .iter()
            .enumerate()
            .filter(|(_, &(start, end))| overlaps(start, end, first, stop))
            .map(|(i, _)| i)
            .collect()
    }

    /// Brute-force version of `overlapping_items`, in insertion order.
    pub fn overlapping_items_reference(&self, first: i32, stop: i32) -> Vec<&T> {
        self.overlapping_indices_reference(first, stop)
            .into_iter()
            .map(|i| &self.items[i])
            .collect()
    }

    // Fill `scratch.merged` with every overlapping entry in result order.
    fn collect_into(&self, first: i32, stop: i32, scratch: &mut QueryScratch) {
        scratch.reset(self.bins.len());

        for (bin, candidates) in self.bins.iter().zip(&mut scratch.candidates) {
            if let Some((from, to)) = candidate_window(bin, first, stop) {
                // the start window bounds where hits can begin, but an
                // interval shorter than the span can still end before `first`
                candidates.extend(
                    bin.entries[from..to]
                        .iter()
                        .filter(|entry| entry.stop > first),
                );
            }
        }

        let QueryScratch { candidates, merged } = scratch;
        merge_sorted_by_into(&candidates[..self.bins.len()], entry_cmp, merged);
    }
}

impl<T> IntervalIndex<T>
where
    T: GenericInterval,
{
    /// Index items that know their own bounds.
    pub fn from_intervals(items: Vec<T>) -> IntervalIndex<T> {
        Self::new(items, |item| item.start(), |item| item.stop())
    }
}

impl<T> fmt::Debug for IntervalIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalIndex")
            .field("len", &self.len())
            .field("base", &self.base)
            .field("bins", &self.bins().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a IntervalIndex<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> std::slice::Iter<'a, T> {
        self.iter()
    }
}

// Smallest power of `base` that is >= `length`. Degenerate lengths go in the
// span 1 bin.
fn bin_span(length: i64, base: u32) -> i64 {
    let mut span: i64 = 1;
    while span < length {
        span = span.checked_mul(base as i64).unwrap_or(i64::MAX);
    }
    span
}

// Range of entries in `bin` whose start lies in `[first - span + 1, stop)`,
// or None if it is empty.
fn candidate_window(bin: &Bin, first: i32, stop: i32) -> Option<(usize, usize)> {
    let entries = &bin.entries;
    // spans saturate at i64::MAX for huge bases
    let lower = (first as i64).saturating_sub(bin.span - 1);
    let from = predecessor_index_in(entries, lower, 0, entries.len(), |e| e.start as i64);
    if from == entries.len() {
        return None;
    }
    // with first > stop the window can be inverted
    let to = predecessor_index_in(entries, stop as i64, from, entries.len(), |e| e.start as i64);
    if to > from {
        Some((from, to))
    } else {
        None
    }
}
