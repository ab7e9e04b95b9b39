//! Rendering primitives, draw surfaces and clipping helpers.
//!
//! Charts are described as [`RenderList`]s of backend-agnostic commands and
//! replayed onto a [`Surface`]. The GPUI backend implements [`Surface`]; the
//! [`RecordingSurface`] keeps commands in memory for headless use.

pub mod cache;
pub mod chart;

use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::transform::Transform;

/// RGBA color.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn rgb(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
            1.0,
        )
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

/// Line stroke styling. The width is in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    /// Circle marker.
    Circle,
    /// Square marker.
    Square,
}

/// Marker styling. Sizes are diameters in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Marker color.
    pub color: Color,
    /// Marker size in pixels.
    pub size: f32,
    /// Marker shape.
    pub shape: MarkerShape,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 6.0,
            shape: MarkerShape::Circle,
        }
    }
}

/// Rectangle styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    /// Fill color.
    pub fill: Color,
    /// Stroke color.
    pub stroke: Color,
    /// Stroke width. Zero disables the stroke.
    pub stroke_width: f32,
}

impl RectStyle {
    /// Fill without a stroke.
    pub fn filled(fill: Color) -> Self {
        Self {
            fill,
            stroke: Color::TRANSPARENT,
            stroke_width: 0.0,
        }
    }
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            fill: Color::TRANSPARENT,
            stroke: Color::BLACK,
            stroke_width: 1.0,
        }
    }
}

/// Text styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Text color.
    pub color: Color,
    /// Font size in pixels.
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 11.0,
        }
    }
}

/// A line segment in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Segment start.
    pub start: ScreenPoint,
    /// Segment end.
    pub end: ScreenPoint,
}

impl LineSegment {
    /// Create a new line segment.
    pub fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self { start, end }
    }

    /// Vertical segment spanning the rectangle at `x`.
    pub fn vertical(x: f32, rect: ScreenRect) -> Self {
        Self::new(ScreenPoint::new(x, rect.min.y), ScreenPoint::new(x, rect.max.y))
    }

    /// Horizontal segment spanning the rectangle at `y`.
    pub fn horizontal(y: f32, rect: ScreenRect) -> Self {
        Self::new(ScreenPoint::new(rect.min.x, y), ScreenPoint::new(rect.max.x, y))
    }
}

/// A single draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Start clipping to a rectangle.
    ClipRect(ScreenRect),
    /// End the innermost clip.
    ClipEnd,
    /// Draw line segments.
    LineSegments {
        /// Segments to draw.
        segments: Vec<LineSegment>,
        /// Styling for the segments.
        style: LineStyle,
    },
    /// Draw markers.
    Points {
        /// Marker centers.
        points: Vec<ScreenPoint>,
        /// Marker styling.
        style: MarkerStyle,
    },
    /// Draw a rectangle.
    Rect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Rectangle styling.
        style: RectStyle,
    },
    /// Draw text with its top-left corner at `position`.
    Text {
        /// Text position.
        position: ScreenPoint,
        /// Text content.
        text: String,
        /// Text styling.
        style: TextStyle,
    },
}

/// Ordered render commands.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Append every command of another list.
    pub fn extend_from(&mut self, other: &RenderList) {
        self.commands.extend_from_slice(&other.commands);
    }

    /// Access all render commands.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check whether the list has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over text commands, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            RenderCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Issue every command onto a surface.
    pub fn replay<S: Surface + ?Sized>(&self, surface: &mut S) {
        for command in &self.commands {
            match command {
                RenderCommand::ClipRect(rect) => surface.push_clip(*rect),
                RenderCommand::ClipEnd => surface.pop_clip(),
                RenderCommand::LineSegments { segments, style } => {
                    surface.stroke_segments(segments, style)
                }
                RenderCommand::Points { points, style } => surface.fill_markers(points, style),
                RenderCommand::Rect { rect, style } => surface.fill_rect(*rect, style),
                RenderCommand::Text {
                    position,
                    text,
                    style,
                } => surface.draw_text(*position, text, style),
            }
        }
    }
}

/// Minimal draw-primitive interface a chart is painted onto.
pub trait Surface {
    /// Restrict subsequent drawing to `rect` until the matching [`Surface::pop_clip`].
    fn push_clip(&mut self, rect: ScreenRect);
    /// Drop the innermost clip.
    fn pop_clip(&mut self);
    /// Fill (and optionally stroke) a rectangle.
    fn fill_rect(&mut self, rect: ScreenRect, style: &RectStyle);
    /// Stroke independent line segments.
    fn stroke_segments(&mut self, segments: &[LineSegment], style: &LineStyle);
    /// Draw markers centered on the given points.
    fn fill_markers(&mut self, points: &[ScreenPoint], style: &MarkerStyle);
    /// Draw a single line of text with its top-left corner at `position`.
    fn draw_text(&mut self, position: ScreenPoint, text: &str, style: &TextStyle);

    /// Draw a cached layer. Backends with retained layers may override this.
    fn draw_layer(&mut self, layer: &RenderList) {
        layer.replay(self);
    }
}

/// Text measurement used for label layout.
pub trait TextMeasurer {
    /// Measure text and return `(width, height)` in logical pixels.
    fn measure(&self, text: &str, size: f32) -> (f32, f32);
}

/// Fixed-advance measurer for headless layout and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Advance per character, as a fraction of the font size.
    pub advance: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        (text.chars().count() as f32 * size * self.advance, size * 1.2)
    }
}

/// Surface that records primitives instead of drawing them.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    list: RenderList,
    layers: usize,
}

impl RecordingSurface {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything drawn so far, with cached layers inlined.
    pub fn recorded(&self) -> &RenderList {
        &self.list
    }

    /// Number of cached layers drawn.
    pub fn layers_drawn(&self) -> usize {
        self.layers
    }

    /// Forget everything recorded.
    pub fn reset(&mut self) {
        self.list = RenderList::new();
        self.layers = 0;
    }
}

impl Surface for RecordingSurface {
    fn push_clip(&mut self, rect: ScreenRect) {
        self.list.push(RenderCommand::ClipRect(rect));
    }

    fn pop_clip(&mut self) {
        self.list.push(RenderCommand::ClipEnd);
    }

    fn fill_rect(&mut self, rect: ScreenRect, style: &RectStyle) {
        self.list.push(RenderCommand::Rect {
            rect,
            style: *style,
        });
    }

    fn stroke_segments(&mut self, segments: &[LineSegment], style: &LineStyle) {
        self.list.push(RenderCommand::LineSegments {
            segments: segments.to_vec(),
            style: *style,
        });
    }

    fn fill_markers(&mut self, points: &[ScreenPoint], style: &MarkerStyle) {
        self.list.push(RenderCommand::Points {
            points: points.to_vec(),
            style: *style,
        });
    }

    fn draw_text(&mut self, position: ScreenPoint, text: &str, style: &TextStyle) {
        self.list.push(RenderCommand::Text {
            position,
            text: text.to_string(),
            style: *style,
        });
    }

    fn draw_layer(&mut self, layer: &RenderList) {
        self.layers += 1;
        self.list.extend_from(layer);
    }
}

/// Build clipped segments joining consecutive data points.
///
/// Points that cannot be mapped break the polyline.
pub fn build_polyline<I>(points: I, transform: &Transform, clip: ScreenRect, out: &mut Vec<LineSegment>)
where
    I: IntoIterator<Item = Point>,
{
    out.clear();
    let mut previous: Option<ScreenPoint> = None;
    for point in points {
        let current = transform.data_to_screen(point);
        if let (Some(start), Some(end)) = (previous, current)
            && let Some((clipped_start, clipped_end)) = clip_segment(start, end, clip)
        {
            out.push(LineSegment::new(clipped_start, clipped_end));
        }
        previous = current;
    }
}

/// Clip a segment to a rectangle (Cohen–Sutherland).
pub(crate) fn clip_segment(
    mut start: ScreenPoint,
    mut end: ScreenPoint,
    rect: ScreenRect,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let mut out_start = region_code(start, rect);
    let mut out_end = region_code(end, rect);

    loop {
        if (out_start | out_end) == 0 {
            return Some((start, end));
        }
        if (out_start & out_end) != 0 {
            return None;
        }

        let out_code = if out_start != 0 { out_start } else { out_end };
        let (x, y) = if (out_code & TOP) != 0 {
            (
                start.x + (end.x - start.x) * (rect.min.y - start.y) / (end.y - start.y),
                rect.min.y,
            )
        } else if (out_code & BOTTOM) != 0 {
            (
                start.x + (end.x - start.x) * (rect.max.y - start.y) / (end.y - start.y),
                rect.max.y,
            )
        } else if (out_code & RIGHT) != 0 {
            (
                rect.max.x,
                start.y + (end.y - start.y) * (rect.max.x - start.x) / (end.x - start.x),
            )
        } else {
            (
                rect.min.x,
                start.y + (end.y - start.y) * (rect.min.x - start.x) / (end.x - start.x),
            )
        };

        let new_point = ScreenPoint::new(x, y);
        if out_code == out_start {
            start = new_point;
            out_start = region_code(start, rect);
        } else {
            end = new_point;
            out_end = region_code(end, rect);
        }
    }
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn region_code(point: ScreenPoint, rect: ScreenRect) -> u8 {
    let mut code = 0;
    if point.x < rect.min.x {
        code |= LEFT;
    } else if point.x > rect.max.x {
        code |= RIGHT;
    }
    if point.y < rect.min.y {
        code |= TOP;
    } else if point.y > rect.max.y {
        code |= BOTTOM;
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Range, Viewport};

    fn square() -> ScreenRect {
        ScreenRect::from_size(10.0, 10.0)
    }

    #[test]
    fn clip_segment_inside() {
        let start = ScreenPoint::new(2.0, 2.0);
        let end = ScreenPoint::new(8.0, 8.0);
        assert_eq!(clip_segment(start, end, square()), Some((start, end)));
    }

    #[test]
    fn clip_segment_crossing_edge() {
        let (start, end) =
            clip_segment(ScreenPoint::new(5.0, 5.0), ScreenPoint::new(15.0, 5.0), square()).unwrap();
        assert_eq!(start, ScreenPoint::new(5.0, 5.0));
        assert_eq!(end, ScreenPoint::new(10.0, 5.0));
        assert!(clip_segment(ScreenPoint::new(11.0, 0.0), ScreenPoint::new(12.0, 9.0), square()).is_none());
    }

    #[test]
    fn polyline_breaks_on_unmappable_points() {
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let transform = Transform::new(viewport, square()).unwrap();
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.5),
            Point::new(f64::NAN, 0.5),
            Point::new(1.0, 1.0),
        ];
        let mut out = Vec::new();
        build_polyline(points, &transform, square(), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].end, ScreenPoint::new(5.0, 5.0));
    }

    #[test]
    fn recording_surface_replays_lists() {
        let mut layer = RenderList::new();
        layer.push(RenderCommand::ClipRect(square()));
        layer.push(RenderCommand::Text {
            position: ScreenPoint::new(1.0, 1.0),
            text: "0.5".to_string(),
            style: TextStyle::default(),
        });
        layer.push(RenderCommand::ClipEnd);

        let mut surface = RecordingSurface::new();
        surface.draw_layer(&layer);
        surface.fill_rect(square(), &RectStyle::filled(Color::WHITE));
        assert_eq!(surface.layers_drawn(), 1);
        assert_eq!(surface.recorded().len(), 4);
        assert_eq!(surface.recorded().texts().collect::<Vec<_>>(), vec!["0.5"]);

        let mut replayed = RecordingSurface::new();
        layer.replay(&mut replayed);
        assert_eq!(replayed.recorded(), &layer);
        assert_eq!(replayed.layers_drawn(), 0);
    }

    #[test]
    fn monospace_measurer_scales_with_size() {
        let measurer = MonospaceMeasurer::default();
        assert_eq!(measurer.measure("", 12.0), (0.0, 0.0));
        let (width, height) = measurer.measure("abcd", 10.0);
        assert!((width - 24.0).abs() < 1e-4);
        assert!((height - 12.0).abs() < 1e-4);
    }

    #[test]
    fn colors_from_hex() {
        let color = Color::rgb(0xff0080);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.with_alpha(0.5).a, 0.5);
    }
}
