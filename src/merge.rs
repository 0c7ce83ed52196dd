//! Merging of several already-sorted sequences.
//!
//! There is no heap here: the number of sequences being merged is expected to
//! be small (one per length bin in `IntervalIndex`), and a short linear
//! re-insertion into a sorted queue beats a binary heap at that size.

use std::cmp::Ordering;

/// Merge sequences that are each sorted ascending by `Ord`.
///
/// # Examples
/// ```
/// use rangebins::merge_sorted;
///
/// let merged: Vec<i32> = merge_sorted(&[
///     vec![2, 4, 9, 12], vec![6, 7, 11], vec![], vec![5], vec![1, 3, 5], vec![8, 10]]);
/// assert_eq!(merged, [1, 2, 3, 4, 5, 5, 6, 7, 8, 9, 10, 11, 12]);
/// ```
pub fn merge_sorted<T, S>(sequences: &[S]) -> Vec<T>
where
    T: Ord + Clone,
    S: AsRef<[T]>,
{
    merge_sorted_by(sequences, T::cmp)
}

/// Merge sequences that are each sorted ascending by `cmp` into one sorted
/// `Vec`.
///
/// `cmp` must be a strict weak ordering and every input must already be sorted
/// by it; unsorted inputs give an unspecified (but complete) result. Equal
/// elements from different inputs come out in no particular order, so any
/// tie-breaking that matters belongs in `cmp`.
pub fn merge_sorted_by<T, S, F>(sequences: &[S], cmp: F) -> Vec<T>
where
    T: Clone,
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> Ordering,
{
    let total = sequences.iter().map(|s| s.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    merge_sorted_by_into(sequences, cmp, &mut out);
    out
}

/// Like `merge_sorted_by` but appends to `out`.
pub fn merge_sorted_by_into<T, S, F>(sequences: &[S], mut cmp: F, out: &mut Vec<T>)
where
    T: Clone,
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> Ordering,
{
    // position of the current head in each sequence
    let mut heads: Vec<usize> = vec![0; sequences.len()];

    // non-empty sequences, ordered by their head element
    let mut queue: Vec<usize> = (0..sequences.len())
        .filter(|&i| !sequences[i].as_ref().is_empty())
        .collect();

    match queue.len() {
        0 => return,
        1 => {
            out.extend_from_slice(sequences[queue[0]].as_ref());
            return;
        }
        _ => {}
    }

    queue.sort_by(|&a, &b| cmp(&sequences[a].as_ref()[0], &sequences[b].as_ref()[0]));

    out.reserve(sequences.iter().map(|s| s.as_ref().len()).sum());

    while let Some(&front) = queue.first() {
        let seq = sequences[front].as_ref();
        out.push(seq[heads[front]].clone());
        heads[front] += 1;

        if heads[front] == seq.len() {
            queue.remove(0);
            continue;
        }

        if queue.len() == 1 {
            out.extend_from_slice(&seq[heads[front]..]);
            break;
        }

        // The new head can only be >= the old one, so walk it back from the
        // front past every head that is not greater.
        let head = &seq[heads[front]];
        let mut j = 1;
        while j < queue.len() {
            let other = &sequences[queue[j]].as_ref()[heads[queue[j]]];
            if cmp(other, head) == Ordering::Greater {
                break;
            }
            queue[j - 1] = queue[j];
            j += 1;
        }
        queue[j - 1] = front;
    }
}
