use std::sync::Arc;

use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, TextRun, Window,
    WindowTextSystem, font, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{
    Color, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, Surface, TextMeasurer,
    TextStyle,
};

const FONT_FAMILY: &str = ".SystemUIFont";

/// Paints chart commands into a GPUI window at a given origin.
pub(crate) struct GpuiSurface<'a> {
    window: &'a mut Window,
    cx: &'a mut App,
    origin: ScreenPoint,
    clip_stack: Vec<ContentMask<Pixels>>,
}

impl<'a> GpuiSurface<'a> {
    pub(crate) fn new(window: &'a mut Window, cx: &'a mut App, origin: ScreenPoint) -> Self {
        Self {
            window,
            cx,
            origin,
            clip_stack: Vec::new(),
        }
    }

    fn place(&self, position: ScreenPoint) -> gpui::Point<Pixels> {
        point(px(self.origin.x + position.x), px(self.origin.y + position.y))
    }

    fn bounds(&self, rect: ScreenRect) -> Bounds<Pixels> {
        Bounds::from_corners(self.place(rect.min), self.place(rect.max))
    }
}

impl Surface for GpuiSurface<'_> {
    fn push_clip(&mut self, rect: ScreenRect) {
        let bounds = self.bounds(rect);
        self.clip_stack.push(ContentMask { bounds });
    }

    fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    fn fill_rect(&mut self, rect: ScreenRect, style: &RectStyle) {
        let bounds = self.bounds(rect);
        with_clip(self.window, &self.clip_stack, |window| {
            window.paint_quad(quad(
                bounds,
                Corners::all(px(0.0)),
                to_rgba(style.fill),
                Edges::all(px(style.stroke_width)),
                to_rgba(style.stroke),
                BorderStyle::default(),
            ));
        });
    }

    fn stroke_segments(&mut self, segments: &[LineSegment], style: &LineStyle) {
        if segments.is_empty() {
            return;
        }
        let mut builder = PathBuilder::stroke(px(style.width.max(0.5)));
        for segment in segments {
            builder.move_to(self.place(segment.start));
            builder.line_to(self.place(segment.end));
        }
        let Ok(path) = builder.build() else {
            return;
        };
        with_clip(self.window, &self.clip_stack, |window| {
            window.paint_path(path, to_rgba(style.color));
        });
    }

    fn fill_markers(&mut self, points: &[ScreenPoint], style: &MarkerStyle) {
        let half = style.size.max(2.0) * 0.5;
        let corner = match style.shape {
            MarkerShape::Circle => half,
            MarkerShape::Square => 0.0,
        };
        let quads: Vec<_> = points
            .iter()
            .map(|center| {
                let bounds = Bounds::from_corners(
                    self.place(ScreenPoint::new(center.x - half, center.y - half)),
                    self.place(ScreenPoint::new(center.x + half, center.y + half)),
                );
                quad(
                    bounds,
                    Corners::all(px(corner)),
                    to_rgba(style.color),
                    Edges::all(px(0.0)),
                    to_rgba(style.color),
                    BorderStyle::default(),
                )
            })
            .collect();
        with_clip(self.window, &self.clip_stack, |window| {
            for marker in quads {
                window.paint_quad(marker);
            }
        });
    }

    fn draw_text(&mut self, position: ScreenPoint, text: &str, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let origin = self.place(position);
        let run = text_run(text, style.color);
        let cx = &mut *self.cx;
        with_clip(self.window, &self.clip_stack, |window| {
            let shaped = window.text_system().shape_line(
                text.to_string().into(),
                px(style.size),
                &[run],
                None,
            );
            let line_height = shaped.ascent + shaped.descent;
            if let Err(err) = shaped.paint(origin, line_height, window, cx) {
                tracing::debug!(%err, "failed to paint chart text");
            }
        });
    }
}

/// Measures label text with the window's text system.
pub(crate) struct GpuiTextMeasurer {
    text_system: Arc<WindowTextSystem>,
}

impl GpuiTextMeasurer {
    pub(crate) fn new(window: &Window) -> Self {
        Self {
            text_system: Arc::clone(window.text_system()),
        }
    }
}

impl TextMeasurer for GpuiTextMeasurer {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let shaped = self.text_system.shape_line(
            text.to_string().into(),
            px(size),
            &[text_run(text, Color::BLACK)],
            None,
        );
        let width = f32::from(shaped.width);
        let height = f32::from(shaped.ascent + shaped.descent);
        (width, height.max(size * 1.2))
    }
}

fn text_run(text: &str, color: Color) -> TextRun {
    TextRun {
        len: text.len(),
        font: font(FONT_FAMILY),
        color: to_hsla(color),
        background_color: None,
        underline: None,
        strikethrough: None,
    }
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}
