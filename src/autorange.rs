//! Jitter-free automatic axis windows.
//!
//! Re-fitting an axis to the instantaneous extent of a noisy signal makes the
//! axis wobble every frame. The stabilizer expands immediately when data
//! escapes the window but only shrinks once the data has retreated past a
//! deadband, and then only a fraction of the way per frame.

use crate::view::Range;

/// Fraction of `|value|` used to widen a zero-width extent.
const DEGENERATE_WIDEN_RATIO: f64 = 0.1;
/// Widening used for a zero-width extent at exactly zero.
const DEGENERATE_WIDEN_AT_ZERO: f64 = 1.0;

/// Tuning for one axis of the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoRangeParams {
    /// Padding added on each side of the raw extent, as a fraction of its span.
    pub padding_ratio: f64,
    /// Extra headroom applied on a side that expands, as a fraction of the span.
    pub expand_ratio: f64,
    /// How far inside the current window (fraction of its span) the padded
    /// extent must retreat before a shrink starts.
    pub shrink_deadband_ratio: f64,
    /// Per-frame interpolation factor toward the tight window while shrinking.
    pub shrink_smoothing: f64,
}

impl AutoRangeParams {
    /// Preset for time-like X axes.
    pub const X_AXIS: Self = Self {
        padding_ratio: 0.03,
        expand_ratio: 0.02,
        shrink_deadband_ratio: 0.16,
        shrink_smoothing: 0.2,
    };

    /// Preset for measured Y axes.
    pub const Y_AXIS: Self = Self {
        padding_ratio: 0.05,
        expand_ratio: 0.025,
        shrink_deadband_ratio: 0.14,
        shrink_smoothing: 0.2,
    };

    /// Padded window that fits `raw` exactly.
    ///
    /// Zero-width extents are widened first so the window always has a span.
    pub fn tight_window(&self, raw: Range) -> Range {
        let raw = if raw.span() > 0.0 {
            raw
        } else {
            let widen = if raw.min == 0.0 {
                DEGENERATE_WIDEN_AT_ZERO
            } else {
                raw.min.abs() * DEGENERATE_WIDEN_RATIO
            };
            Range::new(raw.min - widen, raw.max + widen)
        };
        raw.padded(self.padding_ratio)
    }

    /// Compute this frame's window from the raw data extent and the previous window.
    ///
    /// Returns `previous` unchanged when `raw` is not finite.
    pub fn stabilize(&self, raw: Range, previous: Option<Range>) -> Option<Range> {
        if !raw.is_finite() {
            return previous;
        }
        let tight = self.tight_window(raw);
        let Some(previous) = previous.filter(Range::is_valid) else {
            return Some(tight);
        };

        let escapes_low = tight.min < previous.min;
        let escapes_high = tight.max > previous.max;
        if escapes_low || escapes_high {
            let headroom = tight.span() * self.expand_ratio;
            let min = if escapes_low {
                tight.min - headroom
            } else {
                previous.min
            };
            let max = if escapes_high {
                tight.max + headroom
            } else {
                previous.max
            };
            return Some(Range::new(min, max));
        }

        let deadband = previous.span() * self.shrink_deadband_ratio;
        let retreat_low = tight.min - previous.min;
        let retreat_high = previous.max - tight.max;
        if retreat_low > deadband || retreat_high > deadband {
            let smoothing = self.shrink_smoothing.clamp(0.0, 1.0);
            return Some(Range::new(
                previous.min + (tight.min - previous.min) * smoothing,
                previous.max + (tight.max - previous.max) * smoothing,
            ));
        }

        Some(previous)
    }
}

impl Default for AutoRangeParams {
    fn default() -> Self {
        Self::Y_AXIS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: AutoRangeParams = AutoRangeParams::Y_AXIS;

    #[test]
    fn first_window_is_padded_extent() {
        let window = PARAMS.stabilize(Range::new(0.0, 100.0), None).unwrap();
        assert!((window.min + 5.0).abs() < 1e-9);
        assert!((window.max - 105.0).abs() < 1e-9);
    }

    #[test]
    fn growth_expands_immediately_with_headroom() {
        let previous = PARAMS.stabilize(Range::new(0.0, 10.0), None);
        let window = PARAMS.stabilize(Range::new(5.0, 50.0), previous).unwrap();
        assert!(window.max > 50.0 + 45.0 * PARAMS.padding_ratio);
        assert_eq!(window.min, previous.unwrap().min);
    }

    #[test]
    fn small_retreat_inside_deadband_keeps_window() {
        let previous = PARAMS.stabilize(Range::new(0.0, 100.0), None);
        let window = PARAMS.stabilize(Range::new(0.0, 95.0), previous);
        assert_eq!(window, previous);
    }

    #[test]
    fn large_retreat_shrinks_gradually() {
        let previous = PARAMS.stabilize(Range::new(0.0, 100.0), None).unwrap();
        let window = PARAMS.stabilize(Range::new(0.0, 20.0), Some(previous)).unwrap();
        let snapped = PARAMS.tight_window(Range::new(0.0, 20.0));
        assert!(window.span() > previous.span() * 0.75);
        assert!(window.span() < previous.span());
        assert!(window.span() > snapped.span() * 3.0);
        assert!(window.min <= 0.0 && window.max >= 20.0);
    }

    #[test]
    fn repeated_shrinking_converges_on_tight_window() {
        let raw = Range::new(0.0, 20.0);
        let mut window = PARAMS.stabilize(Range::new(0.0, 100.0), None);
        for _ in 0..200 {
            window = PARAMS.stabilize(raw, window);
        }
        let window = window.unwrap();
        let tight = PARAMS.tight_window(raw);
        assert!(window.max - tight.max <= window.span() * PARAMS.shrink_deadband_ratio + 1e-9);
        assert!(window.min <= tight.min && window.max >= tight.max);
    }

    #[test]
    fn degenerate_extent_is_widened() {
        let window = PARAMS.tight_window(Range::point(0.0));
        assert!(window.min < -1.0 + 1e-9 && window.max > 1.0 - 1e-9);
        let window = PARAMS.tight_window(Range::point(-50.0));
        assert!(window.contains(-55.0) && window.contains(-45.0));
    }

    #[test]
    fn non_finite_extent_keeps_previous() {
        let previous = Some(Range::new(0.0, 1.0));
        let raw = Range::new(0.0, f64::INFINITY);
        assert_eq!(PARAMS.stabilize(raw, previous), previous);
        assert_eq!(PARAMS.stabilize(raw, None), None);
    }
}
