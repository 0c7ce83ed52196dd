//! Lower-bound ("predecessor") search over sorted slices keyed by a projection.

/// Windows at or below this size are finished with a linear scan instead of
/// further bisection.
pub const LINEAR_SCAN_THRESHOLD: usize = 4;

/// Return the index of the first element of `sorted` for which
/// `key(element) >= query`, or `sorted.len()` if every key is less than `query`.
///
/// This is the first position where `query` could be inserted while keeping
/// the slice sorted. `sorted` must be sorted ascending by `key`; otherwise the
/// result is unspecified (but the call still returns an index in `[0, len]`).
///
/// # Examples
/// ```
/// use rangebins::predecessor_index;
///
/// let xs = [0, 1, 2, 3, 4, 6, 6, 6, 8, 9, 10, 11, 12];
/// assert_eq!(predecessor_index(&xs, 6, |x| *x), 5);
/// assert_eq!(predecessor_index(&xs, 7, |x| *x), 8);
/// assert_eq!(predecessor_index(&xs, 13, |x| *x), xs.len());
/// ```
pub fn predecessor_index<T, K, F>(sorted: &[T], query: K, key: F) -> usize
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    predecessor_index_in(sorted, query, 0, sorted.len(), key)
}

/// Like `predecessor_index` but restricted to `sorted[start..end]`. Returns
/// `end` if no element in the window qualifies.
///
/// # Panics
/// If `start > end` or `end > sorted.len()`.
pub fn predecessor_index_in<T, K, F>(
    sorted: &[T],
    query: K,
    mut start: usize,
    mut end: usize,
    mut key: F,
) -> usize
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    assert!(
        start <= end && end <= sorted.len(),
        "bad search window {}..{} for length {}",
        start,
        end,
        sorted.len()
    );

    // Invariants:
    //   key(sorted[i]) < query for each i < start
    //   key(sorted[i]) >= query for each i >= end
    while end - start > LINEAR_SCAN_THRESHOLD {
        let mid = start + (end - start) / 2;
        if key(&sorted[mid]) >= query {
            end = mid;
        } else {
            start = mid + 1;
        }
    }

    for (i, element) in sorted[start..end].iter().enumerate() {
        if key(element) >= query {
            return start + i;
        }
    }

    end
}

/// Linear-scan version of `predecessor_index`. We test against this algorithm
/// which we assume to be correct.
pub fn predecessor_index_linear<T, K, F>(sorted: &[T], query: K, mut key: F) -> usize
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    sorted
        .iter()
        .position(|element| key(element) >= query)
        .unwrap_or(sorted.len())
}
