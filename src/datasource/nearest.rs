//! Nearest-sample lookup by X value.
//!
//! Cursor tracking runs inside pointer handlers, so the lookup must stay
//! logarithmic. Stores whose X values ever decrease inside the live window
//! are searched with a full scan instead.

use crate::datasource::RingBuffer2D;
use crate::geom::Point;

/// Search path taken by a nearest-sample query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Bounded bisection over monotonic X values.
    Bisection,
    /// Full O(n) scan.
    LinearScan,
}

/// Result of a nearest-sample query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestSample {
    /// Logical index of the sample inside the store.
    pub index: usize,
    /// The sample itself.
    pub point: Point,
    /// Number of samples inspected to answer the query.
    pub visited: usize,
    /// Search path used.
    pub strategy: SearchStrategy,
}

/// Find the sample whose X is closest to `target_x`.
///
/// Picks bisection when the store's X values are non-decreasing and falls
/// back to a linear scan otherwise.
pub fn nearest_by_x(store: &RingBuffer2D, target_x: f64) -> Option<NearestSample> {
    if store.is_monotonic() {
        bisect_nearest(store, target_x)
    } else {
        scan_nearest(store, target_x)
    }
}

/// Bisection over logical indices. Requires non-decreasing X values.
pub fn bisect_nearest(store: &RingBuffer2D, target_x: f64) -> Option<NearestSample> {
    if store.is_empty() || !target_x.is_finite() {
        return None;
    }
    let mut visited = 0;

    // First index whose x is >= target.
    let mut left = 0;
    let mut right = store.len();
    while left < right {
        let mid = left + (right - left) / 2;
        visited += 1;
        if store.x_at(mid) < target_x {
            left = mid + 1;
        } else {
            right = mid;
        }
    }

    let index = if left == 0 {
        0
    } else if left >= store.len() {
        store.len() - 1
    } else {
        let before = left - 1;
        visited += 2;
        let before_dist = (store.x_at(before) - target_x).abs();
        let after_dist = (store.x_at(left) - target_x).abs();
        if before_dist <= after_dist { before } else { left }
    };

    let point = store.get(index)?;
    Some(NearestSample {
        index,
        point,
        visited: visited + 1,
        strategy: SearchStrategy::Bisection,
    })
}

/// Full scan over every sample. Safe for any X ordering.
pub fn scan_nearest(store: &RingBuffer2D, target_x: f64) -> Option<NearestSample> {
    if !target_x.is_finite() {
        return None;
    }
    let mut best: Option<(usize, Point, f64)> = None;
    let mut visited = 0;
    for (index, point) in store.iter().enumerate() {
        visited += 1;
        let distance = (point.x - target_x).abs();
        if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
            best = Some((index, point, distance));
        }
    }
    best.map(|(index, point, _)| NearestSample {
        index,
        point,
        visited,
        strategy: SearchStrategy::LinearScan,
    })
}
