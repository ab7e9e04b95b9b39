//! Geometric primitives used by the charting pipeline.
//!
//! [`Point`] lives in data space. [`ScreenPoint`] and [`ScreenRect`] are
//! logical pixels relative to the chart surface origin.

/// A sample in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X value in data coordinates.
    pub x: f64,
    /// Y value in data coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new data point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point in screen space (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// X value in pixels, growing to the right.
    pub x: f32,
    /// Y value in pixels, growing downwards.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Create a rectangle anchored at the origin with the given size.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(width, height))
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Check whether the point lies inside the rectangle (edges included).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamp a point into the rectangle.
    pub fn clamp(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Rectangle shrunk by the given insets.
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(
            ScreenPoint::new(self.min.x + left, self.min.y + top),
            ScreenPoint::new(self.max.x - right, self.max.y - bottom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_includes_edges() {
        let rect = ScreenRect::from_size(10.0, 5.0);
        assert!(rect.contains(ScreenPoint::new(0.0, 0.0)));
        assert!(rect.contains(ScreenPoint::new(10.0, 5.0)));
        assert!(!rect.contains(ScreenPoint::new(10.5, 2.0)));
    }

    #[test]
    fn inset_can_collapse_rect() {
        let rect = ScreenRect::from_size(20.0, 20.0).inset(15.0, 0.0, 10.0, 0.0);
        assert!(!rect.is_valid());
    }
}
