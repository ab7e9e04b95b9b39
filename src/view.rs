//! Value intervals used for data extents and axis windows.

/// Closed interval `[min, max]` on one axis.
///
/// Constructors keep `min <= max`. A window is only drawable when it is
/// [valid](Range::is_valid): both ends finite and a positive span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Lower end.
    pub min: f64,
    /// Upper end.
    pub max: f64,
}

impl Range {
    /// Interval between two values in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if b < a {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    /// Zero-width interval at `value`.
    pub fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Finite with a positive span.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.max > self.min
    }

    /// Inclusive membership test.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Grow to cover `value`. Non-finite values are ignored.
    pub fn expand_to_include(&mut self, value: f64) {
        if value.is_finite() {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }

    /// Widen each side by `ratio` of the span.
    pub fn padded(&self, ratio: f64) -> Self {
        let pad = self.span().abs() * ratio;
        Self::new(self.min - pad, self.max + pad)
    }

    /// Grow symmetrically about the midpoint until the span is at least `min_span`.
    pub fn with_min_span(&self, min_span: f64) -> Self {
        if self.span() >= min_span {
            return *self;
        }
        let mid = self.min + self.span() * 0.5;
        Self::new(mid - min_span * 0.5, mid + min_span * 0.5)
    }

    /// Value at `ratio` of the way from `min` to `max`.
    pub fn lerp(&self, ratio: f64) -> f64 {
        self.min + self.span() * ratio
    }

    /// Position of `value` as a fraction of the span. `None` on a degenerate window.
    pub fn ratio_of(&self, value: f64) -> Option<f64> {
        let span = self.span();
        (span.is_finite() && span > 0.0 && value.is_finite()).then(|| (value - self.min) / span)
    }
}

/// X and Y extents of a sample store, or the pair of axis windows of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: Range,
    pub y: Range,
}

impl Viewport {
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Both axes have finite ends.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
