//! # rangebins
//! `rangebins` implements a static index over half-open integer intervals,
//! built with genomic feature tracks in mind: intervals are loaded once and
//! then queried over and over as a view is panned and zoomed.
//!
//! Rather than a tree, `IntervalIndex` buckets intervals by length into bins
//! whose spans are powers of two. Within a bin every interval is at most as
//! long as the span, so the candidates for a query lie in one contiguous,
//! start-sorted window that two binary searches find. The per-bin hits are then
//! merged so results always come back ordered by start, then longest first.
//!
//! The building blocks are exposed on their own: `predecessor_index` (lower
//! bound search by a key projection) and `merge_sorted_by` (k-way merge of
//! sorted sequences).
//!
//! `CoalescingScheduler` is the companion piece for whatever consumes query
//! results: it turns a flood of "inputs changed, please redraw" requests into
//! at most one in-flight run of an expensive callback on a local executor.

pub mod index;
pub mod interval;
pub mod merge;
pub mod scheduler;
pub mod search;

pub use index::{BinSummary, IntervalIndex, QueryScratch, DEFAULT_BIN_BASE};
pub use interval::{GenericInterval, Interval};
pub use merge::{merge_sorted, merge_sorted_by, merge_sorted_by_into};
pub use scheduler::{yield_now, BoxedWork, CoalescingScheduler, YieldNow};
pub use search::{
    predecessor_index, predecessor_index_in, predecessor_index_linear, LINEAR_SCAN_THRESHOLD,
};
