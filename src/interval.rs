use std::ops::Range;

/// Anything with half-open integer bounds `[start, stop)`.
pub trait GenericInterval {
    fn start(&self) -> i32;
    fn stop(&self) -> i32;

    /// Number of positions covered. Degenerate intervals have length 0.
    fn len(&self) -> i32 {
        0.max(self.stop().saturating_sub(self.start()))
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True iff the interval overlaps the half-open query `[start, stop)`.
    fn overlaps(&self, start: i32, stop: i32) -> bool {
        overlaps(self.start(), self.stop(), start, stop)
    }
}

/// An interval with associated metadata.
///
/// Intervals are half-open: `start` is inclusive, `stop` is exclusive.
///
/// # Examples
/// ```
/// use rangebins::{GenericInterval, Interval};
///
/// #[derive(Clone)]
/// struct MyMetadata {
///     chrom: String,
///     posstrand: bool
/// }
///
/// let some_interval = Interval::new(
///     10, 24000, MyMetadata{chrom: String::from("chr1"), posstrand: false});
///
/// assert_eq!(some_interval.len(), 23990);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    pub start: i32,
    pub stop: i32,
    pub metadata: T,
}

impl<T> Interval<T> {
    pub fn new(start: i32, stop: i32, metadata: T) -> Interval<T> {
        Self {
            start,
            stop,
            metadata,
        }
    }

    pub fn as_ref(&self) -> Interval<&T> {
        Interval::new(self.start, self.stop, &self.metadata)
    }
}

impl<T> GenericInterval for Interval<T> {
    fn start(&self) -> i32 {
        self.start
    }

    fn stop(&self) -> i32 {
        self.stop
    }
}

impl GenericInterval for Range<i32> {
    fn start(&self) -> i32 {
        self.start
    }

    fn stop(&self) -> i32 {
        self.end
    }
}

impl GenericInterval for (i32, i32) {
    fn start(&self) -> i32 {
        self.0
    }

    fn stop(&self) -> i32 {
        self.1
    }
}

impl<V: GenericInterval + ?Sized> GenericInterval for &V {
    fn start(&self) -> i32 {
        (**self).start()
    }

    fn stop(&self) -> i32 {
        (**self).stop()
    }
}

// True iff the two half-open intervals overlap.
#[inline(always)]
pub(crate) fn overlaps(start_a: i32, stop_a: i32, start_b: i32, stop_b: i32) -> bool {
    start_a < stop_b && stop_a > start_b
}

#[test]
fn test_interval_len() {
    fn make_interval(start: i32, stop: i32) -> Interval<()> {
        Interval::new(start, stop, ())
    }

    assert_eq!(make_interval(1, -1).len(), 0);
    assert_eq!(make_interval(1, 1).len(), 0);
    assert_eq!(make_interval(1, 2).len(), 1);
    assert_eq!(make_interval(1, 3).len(), 2);
    assert!(make_interval(4, 4).is_empty());
}

#[test]
fn test_interval_overlaps() {
    let pair: (i32, i32) = (1, 17);
    assert!(pair.overlaps(16, 100));
    assert!(!pair.overlaps(17, 100));

    let empty: Range<i32> = 5..5;
    let wide: Range<i32> = 0..10;
    assert!(!empty.overlaps(5, 6));
    assert!(wide.overlaps(5, 5));
    assert!(Interval::new(3, 8, "x").as_ref().overlaps(7, 8));
}
