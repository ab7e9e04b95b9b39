//! Per-redraw layout: the inner plot rectangle, resolved windows and ticks.

use crate::axis::{X_TICK_SPACING_PX, Y_TICK_SPACING_PX, nice_step, nice_ticks, tick_count_for};
use crate::geom::ScreenRect;
use crate::transform::Transform;
use crate::view::{Range, Viewport};

/// Extra padding applied to a manual X window, as a fraction of its span.
pub const MANUAL_X_PADDING_RATIO: f64 = 0.01;
/// Extra padding applied to a manual Y window, as a fraction of its span.
pub const MANUAL_Y_PADDING_RATIO: f64 = 0.04;

/// Insets between the canvas edge and the inner plot rectangle, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    /// Space for Y tick labels.
    pub left: f32,
    /// Right margin.
    pub right: f32,
    /// Top margin.
    pub top: f32,
    /// Space for X tick labels.
    pub bottom: f32,
}

impl Padding {
    /// Layout used by scope charts.
    pub const DEFAULT: Self = Self {
        left: 56.0,
        right: 14.0,
        top: 12.0,
        bottom: 28.0,
    };
}

impl Default for Padding {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Inputs to [`compute_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    /// Canvas width in logical pixels.
    pub width: f32,
    /// Canvas height in logical pixels.
    pub height: f32,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f32,
    /// Resolved X window (auto-range or manual).
    pub x: Range,
    /// Resolved Y window (auto-range or manual).
    pub y: Range,
    /// X window was set by hand.
    pub x_manual: bool,
    /// Y window was set by hand.
    pub y_manual: bool,
    /// Canvas insets.
    pub padding: Padding,
}

/// Layout metadata for one redraw. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
    transform: Transform,
    x_ticks: Vec<f64>,
    y_ticks: Vec<f64>,
    x_step: f64,
    y_step: f64,
}

impl Frame {
    /// Canvas size in logical pixels.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Physical pixels per logical pixel.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Whole canvas rectangle.
    pub fn canvas_rect(&self) -> ScreenRect {
        ScreenRect::from_size(self.width, self.height)
    }

    /// Inner plotting rectangle.
    pub fn plot_rect(&self) -> ScreenRect {
        self.transform.screen()
    }

    /// Value/pixel mapping for the plot rectangle.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// X window as mapped, including manual padding.
    pub fn x_window(&self) -> Range {
        self.transform.window().x
    }

    /// Y window as mapped, including manual padding.
    pub fn y_window(&self) -> Range {
        self.transform.window().y
    }

    /// X tick values, strictly increasing.
    pub fn x_ticks(&self) -> &[f64] {
        &self.x_ticks
    }

    /// Y tick values, strictly increasing.
    pub fn y_ticks(&self) -> &[f64] {
        &self.y_ticks
    }

    /// Spacing between X ticks.
    pub fn x_step(&self) -> f64 {
        self.x_step
    }

    /// Spacing between Y ticks.
    pub fn y_step(&self) -> f64 {
        self.y_step
    }

    /// Fraction of the X window at which `x` sits.
    pub fn x_ratio(&self, x: f64) -> Option<f64> {
        self.x_window().ratio_of(x)
    }

    /// Fraction of the Y window at which `y` sits, measured from the bottom.
    pub fn y_ratio(&self, y: f64) -> Option<f64> {
        self.y_window().ratio_of(y)
    }

    /// X value at the given window fraction.
    pub fn x_at_ratio(&self, ratio: f64) -> f64 {
        self.x_window().lerp(ratio)
    }
}

/// Lay out a frame, or `None` when there is nothing drawable.
///
/// No frame is produced for non-finite windows, a non-positive device-pixel
/// ratio, or padding that leaves the plot rectangle without area.
pub fn compute_frame(request: &FrameRequest) -> Option<Frame> {
    if !request.x.is_finite() || !request.y.is_finite() {
        return None;
    }
    if !(request.device_pixel_ratio > 0.0) || !request.device_pixel_ratio.is_finite() {
        return None;
    }
    let padding = request.padding;
    let plot_rect = ScreenRect::from_size(request.width, request.height).inset(
        padding.left,
        padding.top,
        padding.right,
        padding.bottom,
    );
    if !plot_rect.is_valid() {
        return None;
    }

    let x = resolve_window(request.x, request.x_manual, MANUAL_X_PADDING_RATIO);
    let y = resolve_window(request.y, request.y_manual, MANUAL_Y_PADDING_RATIO);
    let transform = Transform::new(Viewport::new(x, y), plot_rect)?;
    let window = transform.window();

    let x_count = tick_count_for(plot_rect.width(), X_TICK_SPACING_PX);
    let y_count = tick_count_for(plot_rect.height(), Y_TICK_SPACING_PX);
    let x_ticks = nice_ticks(window.x.min, window.x.max, x_count);
    let y_ticks = nice_ticks(window.y.min, window.y.max, y_count);

    Some(Frame {
        width: request.width,
        height: request.height,
        device_pixel_ratio: request.device_pixel_ratio,
        x_step: tick_step(&x_ticks, window.x, x_count),
        y_step: tick_step(&y_ticks, window.y, y_count),
        transform,
        x_ticks,
        y_ticks,
    })
}

fn resolve_window(range: Range, manual: bool, manual_ratio: f64) -> Range {
    let range = if range.span() > 0.0 {
        range
    } else {
        let half = if range.min == 0.0 {
            0.5
        } else {
            range.min.abs() * 0.05
        };
        Range::new(range.min - half, range.max + half)
    };
    if manual {
        range.padded(manual_ratio)
    } else {
        range
    }
}

fn tick_step(ticks: &[f64], window: Range, count: usize) -> f64 {
    match ticks {
        [first, second, ..] => second - first,
        _ => nice_step(window.span() / count as f64).unwrap_or(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(x: Range, y: Range) -> FrameRequest {
        FrameRequest {
            width: 400.0,
            height: 240.0,
            device_pixel_ratio: 2.0,
            x,
            y,
            x_manual: false,
            y_manual: false,
            padding: Padding::DEFAULT,
        }
    }

    #[test]
    fn plot_rect_respects_padding() {
        let frame = compute_frame(&request(Range::new(0.0, 10.0), Range::new(-1.0, 1.0))).unwrap();
        let rect = frame.plot_rect();
        assert_eq!(rect.min.x, Padding::DEFAULT.left);
        assert_eq!(rect.max.y, 240.0 - Padding::DEFAULT.bottom);
        assert_eq!(frame.x_window(), Range::new(0.0, 10.0));
    }

    #[test]
    fn ticks_cover_windows() {
        let frame = compute_frame(&request(Range::new(0.3, 9.7), Range::new(-2.2, 3.1))).unwrap();
        let x_ticks = frame.x_ticks();
        assert!(x_ticks[0] <= 0.3 && *x_ticks.last().unwrap() >= 9.7);
        let y_ticks = frame.y_ticks();
        assert!(y_ticks[0] <= -2.2 && *y_ticks.last().unwrap() >= 3.1);
        assert!(frame.x_step() > 0.0 && frame.y_step() > 0.0);
    }

    #[test]
    fn no_frame_for_non_finite_or_empty_layouts() {
        assert!(compute_frame(&request(Range::new(0.0, f64::NAN), Range::new(0.0, 1.0))).is_none());
        let mut tiny = request(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        tiny.width = 40.0;
        assert!(compute_frame(&tiny).is_none());
        let mut no_dpr = request(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        no_dpr.device_pixel_ratio = 0.0;
        assert!(compute_frame(&no_dpr).is_none());
    }

    #[test]
    fn zero_width_windows_are_widened() {
        let frame = compute_frame(&request(Range::point(0.0), Range::point(4.0))).unwrap();
        assert!(frame.x_window().span() > 0.0);
        assert!(frame.y_window().contains(4.0));
        assert!(frame.y_window().span() > 0.0);
    }

    #[test]
    fn manual_windows_get_extra_padding() {
        let mut manual = request(Range::new(0.0, 100.0), Range::new(0.0, 100.0));
        manual.x_manual = true;
        manual.y_manual = true;
        let frame = compute_frame(&manual).unwrap();
        assert!((frame.x_window().min + 1.0).abs() < 1e-9);
        assert!((frame.y_window().max - 104.0).abs() < 1e-9);
    }

    #[test]
    fn ratios_match_transform() {
        let frame = compute_frame(&request(Range::new(0.0, 10.0), Range::new(0.0, 2.0))).unwrap();
        assert_eq!(frame.x_ratio(2.5), Some(0.25));
        assert_eq!(frame.y_ratio(1.5), Some(0.75));
        assert_eq!(frame.x_at_ratio(0.5), 5.0);
    }
}
