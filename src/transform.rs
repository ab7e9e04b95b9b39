//! Mapping between data space and screen space.

use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::view::{Range, Viewport};

/// Smallest span a mapped axis may have.
pub(crate) const MIN_SPAN: f64 = 1e-12;

/// Linear transform from a data window onto a screen rectangle.
///
/// Y grows upwards in data space and downwards on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    x: Range,
    y: Range,
    screen: ScreenRect,
}

impl Transform {
    /// Create a transform for the given data window and screen rectangle.
    ///
    /// Returns `None` when the rectangle has no area or a bound is not finite.
    pub fn new(window: Viewport, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() || !window.is_finite() {
            return None;
        }
        Some(Self {
            x: window.x.with_min_span(MIN_SPAN),
            y: window.y.with_min_span(MIN_SPAN),
            screen,
        })
    }

    /// Data window being mapped.
    pub fn window(&self) -> Viewport {
        Viewport::new(self.x, self.y)
    }

    /// Screen rectangle the window maps onto.
    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Map a data X value to a screen X coordinate.
    pub fn x_to_screen(&self, x: f64) -> f32 {
        let norm = (x - self.x.min) / self.x.span();
        (self.screen.min.x as f64 + norm * self.screen.width() as f64) as f32
    }

    /// Map a data Y value to a screen Y coordinate.
    pub fn y_to_screen(&self, y: f64) -> f32 {
        let norm = (y - self.y.min) / self.y.span();
        (self.screen.max.y as f64 - norm * self.screen.height() as f64) as f32
    }

    /// Map a data point into screen space.
    pub fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        Some(ScreenPoint::new(
            self.x_to_screen(point.x),
            self.y_to_screen(point.y),
        ))
    }

    /// Map a screen point into data space.
    pub fn screen_to_data(&self, point: ScreenPoint) -> Point {
        let x_norm = (point.x as f64 - self.screen.min.x as f64) / self.screen.width() as f64;
        let y_norm = (self.screen.max.y as f64 - point.y as f64) / self.screen.height() as f64;
        Point::new(self.x.lerp(x_norm), self.y.lerp(y_norm))
    }

    /// Position of a screen point as fractions of the plot rectangle.
    ///
    /// `x` grows to the right and `y` grows upwards; both are clamped to `[0, 1]`.
    pub fn screen_to_ratio(&self, point: ScreenPoint) -> (f64, f64) {
        let x = (point.x - self.screen.min.x) as f64 / self.screen.width() as f64;
        let y = (self.screen.max.y - point.y) as f64 / self.screen.height() as f64;
        (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
    }

    /// Screen point at the given plot-rectangle fractions.
    pub fn ratio_to_screen(&self, x_ratio: f64, y_ratio: f64) -> ScreenPoint {
        ScreenPoint::new(
            self.screen.min.x + (x_ratio * self.screen.width() as f64) as f32,
            self.screen.max.y - (y_ratio * self.screen.height() as f64) as f32,
        )
    }
}
