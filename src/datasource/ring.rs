//! Fixed-capacity circular sample storage.

use crate::datasource::CapacityError;
use crate::geom::Point;
use crate::view::{Range, Viewport};

/// Fixed-capacity append-only 2D series that overwrites its oldest samples.
///
/// Samples are stored in two parallel slices. Logical index `i` (oldest
/// first) lives at physical slot `(start + i) % capacity`. The x/y extents
/// are maintained incrementally: pushes widen the cached range, and a full
/// rescan only happens after the sole holder of an extreme was evicted.
#[derive(Debug, Clone)]
pub struct RingBuffer2D {
    xs: Box<[f64]>,
    ys: Box<[f64]>,
    start: usize,
    len: usize,
    cached_range: Option<Viewport>,
    range_dirty: bool,
    descents: usize,
    generation: u64,
}

impl RingBuffer2D {
    /// Create an empty store holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError::Zero);
        }
        Ok(Self {
            xs: vec![0.0; capacity].into_boxed_slice(),
            ys: vec![0.0; capacity].into_boxed_slice(),
            start: 0,
            len: 0,
            cached_range: None,
            range_dirty: false,
            descents: 0,
            generation: 0,
        })
    }

    /// Build a store with a different capacity holding the newest samples of `self`.
    pub fn with_capacity_from(&self, capacity: usize) -> Result<Self, CapacityError> {
        let mut next = Self::new(capacity)?;
        let skip = self.len.saturating_sub(capacity);
        for point in self.iter().skip(skip) {
            next.push(point.x, point.y);
        }
        tracing::debug!(
            from = self.capacity(),
            to = capacity,
            kept = next.len(),
            "rebuilt sample store"
        );
        Ok(next)
    }

    /// Maximum number of samples held.
    pub fn capacity(&self) -> usize {
        self.xs.len()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the store holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the next push will evict the oldest sample.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Counter bumped on every accepted push and on clear.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether x never decreases between neighbouring samples.
    pub fn is_monotonic(&self) -> bool {
        self.descents == 0
    }

    /// Append a sample, evicting the oldest one when full.
    ///
    /// Samples with a non-finite coordinate are dropped and `false` is returned.
    pub fn push(&mut self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let capacity = self.capacity();

        if capacity > 1
            && let Some(last) = self.last()
            && x < last.x
        {
            self.descents += 1;
        }

        let slot = if !self.is_full() {
            let slot = self.physical(self.len);
            self.len += 1;
            slot
        } else {
            let slot = self.start;
            let evicted = Point::new(self.xs[slot], self.ys[slot]);
            if capacity > 1 {
                let next = self.physical(1);
                if self.xs[next] < evicted.x {
                    self.descents -= 1;
                }
            }
            if self.holds_extreme(evicted) {
                self.range_dirty = true;
            }
            self.start = (self.start + 1) % capacity;
            slot
        };

        self.xs[slot] = x;
        self.ys[slot] = y;
        self.widen_range(x, y);
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Current `{x, y}` extents, or `None` when empty.
    ///
    /// Recomputes with a full scan only after an extreme was evicted.
    pub fn range(&mut self) -> Option<Viewport> {
        if self.len == 0 {
            return None;
        }
        if self.range_dirty {
            self.cached_range = self.scan_range();
            self.range_dirty = false;
        }
        self.cached_range
    }

    /// Sample at a logical index (0 is the oldest).
    pub fn get(&self, index: usize) -> Option<Point> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        Some(Point::new(self.xs[slot], self.ys[slot]))
    }

    /// X value at a logical index without bounds checks beyond the slice.
    pub(crate) fn x_at(&self, index: usize) -> f64 {
        self.xs[self.physical(index)]
    }

    /// Oldest sample.
    pub fn first(&self) -> Option<Point> {
        self.get(0)
    }

    /// Newest sample.
    pub fn last(&self) -> Option<Point> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Iterate samples from oldest to newest.
    pub fn iter(&self) -> Samples<'_> {
        Samples {
            store: self,
            front: 0,
            back: self.len,
        }
    }

    /// Iterate every `stride`-th sample, always finishing on the newest one.
    ///
    /// A stride of 0 is treated as 1.
    pub fn iter_sampled(&self, stride: usize) -> impl Iterator<Item = Point> + '_ {
        let stride = stride.max(1);
        let last = self.len.checked_sub(1);
        let tail = last.filter(|last| last % stride != 0);
        (0..self.len)
            .step_by(stride)
            .chain(tail)
            .filter_map(move |index| self.get(index))
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
        self.cached_range = None;
        self.range_dirty = false;
        self.descents = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn physical(&self, index: usize) -> usize {
        (self.start + index) % self.capacity()
    }

    fn holds_extreme(&self, point: Point) -> bool {
        match self.cached_range {
            Some(range) => {
                point.x == range.x.min
                    || point.x == range.x.max
                    || point.y == range.y.min
                    || point.y == range.y.max
            }
            None => false,
        }
    }

    fn widen_range(&mut self, x: f64, y: f64) {
        match self.cached_range.as_mut() {
            Some(range) => {
                range.x.expand_to_include(x);
                range.y.expand_to_include(y);
            }
            None => {
                self.cached_range = Some(Viewport::new(Range::point(x), Range::point(y)));
            }
        }
    }

    fn scan_range(&self) -> Option<Viewport> {
        let mut points = self.iter();
        let first = points.next()?;
        let mut range = Viewport::new(Range::point(first.x), Range::point(first.y));
        for point in points {
            range.x.expand_to_include(point.x);
            range.y.expand_to_include(point.y);
        }
        Some(range)
    }
}

/// Oldest-to-newest iterator over a [`RingBuffer2D`].
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    store: &'a RingBuffer2D,
    front: usize,
    back: usize,
}

impl Iterator for Samples<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let point = self.store.get(self.front);
        self.front += 1;
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Samples<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.store.get(self.back)
    }
}

impl ExactSizeIterator for Samples<'_> {}

impl<'a> IntoIterator for &'a RingBuffer2D {
    type Item = Point;
    type IntoIter = Samples<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(capacity: usize, points: &[(f64, f64)]) -> RingBuffer2D {
        let mut store = RingBuffer2D::new(capacity).unwrap();
        for &(x, y) in points {
            assert!(store.push(x, y));
        }
        store
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(RingBuffer2D::new(0).unwrap_err(), CapacityError::Zero);
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let store = store_with(3, &[(1.0, 10.0), (2.0, 20.0), (3.0, 30.0), (4.0, 40.0)]);
        assert_eq!(store.len(), 3);
        assert!(store.is_full());
        assert!(!store_with(3, &[(1.0, 10.0)]).is_full());
        assert_eq!(store.get(0), Some(Point::new(2.0, 20.0)));
        assert_eq!(store.get(2), Some(Point::new(4.0, 40.0)));
        assert_eq!(store.get(3), None);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut store = store_with(4, &[(0.0, 1.0)]);
        assert!(!store.push(f64::NAN, 1.0));
        assert!(!store.push(1.0, f64::INFINITY));
        assert_eq!(store.len(), 1);
        let range = store.range().unwrap();
        assert!(range.is_finite());
    }

    #[test]
    fn empty_store_has_no_range() {
        let mut store = RingBuffer2D::new(8).unwrap();
        assert!(store.range().is_none());
        store.push(1.0, 1.0);
        store.clear();
        assert!(store.range().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn evicting_unique_extreme_recomputes_range() {
        let mut store = store_with(3, &[(0.0, 100.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(store.range().unwrap().y, Range::new(1.0, 100.0));
        store.push(3.0, 3.0);
        let range = store.range().unwrap();
        assert_eq!(range.y, Range::new(1.0, 3.0));
        assert_eq!(range.x, Range::new(1.0, 3.0));
    }

    #[test]
    fn evicting_interior_sample_keeps_cache_clean() {
        let mut store = store_with(3, &[(5.0, 0.0), (1.0, -5.0), (9.0, 9.0)]);
        store.range();
        store.push(4.0, 1.0);
        assert!(!store.range_dirty);
        assert_eq!(store.range().unwrap().x, Range::new(1.0, 9.0));
        store.push(6.0, 2.0);
        assert!(store.range_dirty, "x minimum 1.0 was evicted");
        assert_eq!(store.range().unwrap(), Viewport::new(Range::new(4.0, 9.0), Range::new(1.0, 9.0)));
    }

    #[test]
    fn range_reads_are_idempotent() {
        let mut store = store_with(4, &[(0.0, 3.0), (1.0, -1.0), (2.0, 7.0), (3.0, 2.0), (4.0, 0.5)]);
        let first = store.range();
        let second = store.range();
        assert_eq!(first, second);
    }

    #[test]
    fn iterators_walk_oldest_to_newest() {
        let store = store_with(4, &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0), (5.0, 5.0)]);
        let xs: Vec<f64> = store.iter().map(|point| point.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0, 5.0]);
        let reversed: Vec<f64> = store.iter().rev().map(|point| point.x).collect();
        assert_eq!(reversed, vec![5.0, 4.0, 3.0, 2.0]);
        // restartable
        assert_eq!(store.iter().count(), 4);
        assert_eq!(store.iter().len(), 4);
    }

    #[test]
    fn sampled_iteration_keeps_newest_sample() {
        let store = store_with(16, &(0..10).map(|i| (i as f64, 0.0)).collect::<Vec<_>>());
        let xs: Vec<f64> = store.iter_sampled(4).map(|point| point.x).collect();
        assert_eq!(xs, vec![0.0, 4.0, 8.0, 9.0]);
        let xs: Vec<f64> = store.iter_sampled(3).map(|point| point.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(store.iter_sampled(0).count(), 10);
    }

    #[test]
    fn monotonic_flag_recovers_after_descent_is_evicted() {
        let mut store = store_with(3, &[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)]);
        assert!(!store.is_monotonic());
        store.push(3.0, 0.0);
        assert!(!store.is_monotonic(), "pair (2, 1) still live");
        store.push(4.0, 0.0);
        assert!(store.is_monotonic());
    }

    #[test]
    fn rebuild_keeps_newest_samples() {
        let store = store_with(5, &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let mut smaller = store.with_capacity_from(2).unwrap();
        assert_eq!(smaller.len(), 2);
        assert_eq!(smaller.first(), Some(Point::new(2.0, 2.0)));
        assert_eq!(smaller.range().unwrap().x, Range::new(2.0, 3.0));
        let larger = store.with_capacity_from(10).unwrap();
        assert_eq!(larger.len(), 4);
        assert_eq!(larger.capacity(), 10);
    }

    #[test]
    fn capacity_one_store_tracks_single_sample() {
        let mut store = store_with(1, &[(0.0, 5.0), (1.0, -5.0)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.range().unwrap().y, Range::point(-5.0));
        assert!(store.is_monotonic());
    }
}
