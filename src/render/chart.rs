//! Chart layers built from a [`Frame`] and a sample store.
//!
//! The static layer (background, grid, border, tick labels) depends only on
//! the frame and is cached by the caller. The data and cursor layers are
//! rebuilt on every redraw.

use crate::config::ChartConfig;
use crate::datasource::RingBuffer2D;
use crate::frame::Frame;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::render::{
    Color, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, RenderCommand, RenderList,
    TextMeasurer, TextStyle, build_polyline,
};
use crate::style::Theme;

/// Text shown while a chart has nothing to draw.
pub const PLACEHOLDER_TEXT: &str = "Waiting for data";

const LABEL_GAP: f32 = 4.0;
const READOUT_PADDING: f32 = 4.0;
const CURSOR_MARKER_SIZE: f32 = 7.0;

/// Cursor to draw on top of the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMarker {
    /// Sample the cursor snapped to.
    pub sample: Point,
    /// Mirrored from another chart.
    pub linked: bool,
    /// Latched in place.
    pub frozen: bool,
}

/// Background, grid, border and tick labels.
pub fn build_static_layer(
    frame: &Frame,
    config: &ChartConfig,
    measurer: &dyn TextMeasurer,
) -> RenderList {
    let theme = &config.theme;
    let transform = frame.transform();
    let rect = frame.plot_rect();
    let x_window = frame.x_window();
    let y_window = frame.y_window();
    let mut render = RenderList::new();

    render.push(RenderCommand::Rect {
        rect: frame.canvas_rect(),
        style: RectStyle::filled(theme.background),
    });
    render.push(RenderCommand::Rect {
        rect,
        style: RectStyle::filled(theme.plot_background),
    });

    let mut grid = Vec::new();
    for &tick in frame.x_ticks().iter().filter(|tick| x_window.contains(**tick)) {
        grid.push(LineSegment::vertical(transform.x_to_screen(tick), rect));
    }
    for &tick in frame.y_ticks().iter().filter(|tick| y_window.contains(**tick)) {
        grid.push(LineSegment::horizontal(transform.y_to_screen(tick), rect));
    }

    render.push(RenderCommand::ClipRect(rect));
    if !grid.is_empty() {
        render.push(RenderCommand::LineSegments {
            segments: grid,
            style: LineStyle {
                color: theme.grid,
                width: 1.0,
            },
        });
    }
    if y_window.min < 0.0 && y_window.max > 0.0 {
        render.push(RenderCommand::LineSegments {
            segments: vec![LineSegment::horizontal(transform.y_to_screen(0.0), rect)],
            style: LineStyle {
                color: theme.axis,
                width: 1.0,
            },
        });
    }
    render.push(RenderCommand::ClipEnd);

    render.push(RenderCommand::Rect {
        rect,
        style: RectStyle {
            fill: Color::TRANSPARENT,
            stroke: theme.axis,
            stroke_width: 1.0,
        },
    });

    let label_style = TextStyle {
        color: theme.label,
        size: theme.label_size,
    };
    for &tick in frame.x_ticks().iter().filter(|tick| x_window.contains(**tick)) {
        let text = config.x_formatter.format_tick(tick, frame.x_step());
        let (width, _) = measurer.measure(&text, label_style.size);
        let x = (transform.x_to_screen(tick) - width * 0.5)
            .clamp(0.0, (frame.size().0 - width).max(0.0));
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(x, rect.max.y + LABEL_GAP),
            text,
            style: label_style,
        });
    }
    for &tick in frame.y_ticks().iter().filter(|tick| y_window.contains(**tick)) {
        let text = config.y_formatter.format_tick(tick, frame.y_step());
        let (width, height) = measurer.measure(&text, label_style.size);
        let x = (rect.min.x - LABEL_GAP - width).max(0.0);
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(x, transform.y_to_screen(tick) - height * 0.5),
            text,
            style: label_style,
        });
    }

    render
}

/// Series trace, stride-sampled down to `config.max_drawn_points`.
pub fn build_data_layer(frame: &Frame, store: &RingBuffer2D, config: &ChartConfig) -> RenderList {
    let theme = &config.theme;
    let rect = frame.plot_rect();
    let mut render = RenderList::new();
    if store.is_empty() {
        return render;
    }

    render.push(RenderCommand::ClipRect(rect));
    if store.len() == 1 {
        if let Some(point) = store.last().and_then(|point| frame.transform().data_to_screen(point)) {
            render.push(RenderCommand::Points {
                points: vec![point],
                style: MarkerStyle {
                    color: theme.trace,
                    size: theme.trace_width * 3.0,
                    shape: MarkerShape::Circle,
                },
            });
        }
    } else {
        let budget = config.max_drawn_points.max(2);
        let stride = store.len().div_ceil(budget).max(1);
        let mut segments = Vec::new();
        build_polyline(store.iter_sampled(stride), frame.transform(), rect, &mut segments);
        if !segments.is_empty() {
            render.push(RenderCommand::LineSegments {
                segments,
                style: LineStyle {
                    color: theme.trace,
                    width: theme.trace_width,
                },
            });
        }
    }
    render.push(RenderCommand::ClipEnd);
    render
}

/// Plot name in the top-left corner of the plot rectangle.
pub fn build_title(frame: &Frame, name: &str, theme: &Theme) -> RenderList {
    let mut render = RenderList::new();
    if name.is_empty() {
        return render;
    }
    let rect = frame.plot_rect();
    render.push(RenderCommand::Text {
        position: ScreenPoint::new(rect.min.x + 6.0, rect.min.y + 4.0),
        text: name.to_string(),
        style: TextStyle {
            color: theme.label,
            size: theme.label_size,
        },
    });
    render
}

/// Crosshair, marker and value readout for a cursor.
pub fn build_cursor_layer(
    frame: &Frame,
    cursor: &CursorMarker,
    config: &ChartConfig,
    measurer: &dyn TextMeasurer,
) -> RenderList {
    let theme = &config.theme;
    let transform = frame.transform();
    let rect = frame.plot_rect();
    let color = if cursor.linked {
        theme.linked_cursor
    } else {
        theme.cursor
    };
    let mut render = RenderList::new();
    let Some(anchor) = transform.data_to_screen(cursor.sample) else {
        return render;
    };

    render.push(RenderCommand::ClipRect(rect));
    if frame.x_window().contains(cursor.sample.x) {
        render.push(RenderCommand::LineSegments {
            segments: vec![LineSegment::vertical(anchor.x, rect)],
            style: LineStyle { color, width: 1.0 },
        });
    }
    if rect.contains(anchor) {
        render.push(RenderCommand::Points {
            points: vec![anchor],
            style: MarkerStyle {
                color,
                size: CURSOR_MARKER_SIZE,
                shape: if cursor.frozen {
                    MarkerShape::Square
                } else {
                    MarkerShape::Circle
                },
            },
        });
    }
    render.push(RenderCommand::ClipEnd);

    if config.show_readout {
        let text = format!(
            "x {}  y {}",
            config.x_formatter.format(cursor.sample.x),
            config.y_formatter.format(cursor.sample.y)
        );
        let style = TextStyle {
            color: theme.label,
            size: theme.label_size,
        };
        let (width, height) = measurer.measure(&text, style.size);
        let box_width = width + READOUT_PADDING * 2.0;
        let box_height = height + READOUT_PADDING * 2.0;
        let mut left = anchor.x + CURSOR_MARKER_SIZE;
        if left + box_width > rect.max.x {
            left = anchor.x - CURSOR_MARKER_SIZE - box_width;
        }
        let left = left.max(rect.min.x);
        let top = rect.min.y + READOUT_PADDING;
        render.push(RenderCommand::Rect {
            rect: ScreenRect::new(
                ScreenPoint::new(left, top),
                ScreenPoint::new(left + box_width, top + box_height),
            ),
            style: RectStyle::filled(theme.readout_background),
        });
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(left + READOUT_PADDING, top + READOUT_PADDING),
            text,
            style,
        });
    }
    render
}

/// Empty-state canvas with a centered message.
pub fn build_placeholder(
    width: f32,
    height: f32,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) -> RenderList {
    let mut render = RenderList::new();
    if !(width > 0.0) || !(height > 0.0) {
        return render;
    }
    render.push(RenderCommand::Rect {
        rect: ScreenRect::from_size(width, height),
        style: RectStyle::filled(theme.background),
    });
    let size = theme.label_size + 2.0;
    let (text_width, text_height) = measurer.measure(PLACEHOLDER_TEXT, size);
    render.push(RenderCommand::Text {
        position: ScreenPoint::new(
            ((width - text_width) * 0.5).max(0.0),
            ((height - text_height) * 0.5).max(0.0),
        ),
        text: PLACEHOLDER_TEXT.to_string(),
        style: TextStyle {
            color: theme.placeholder,
            size,
        },
    });
    render
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameRequest, Padding, compute_frame};
    use crate::render::MonospaceMeasurer;
    use crate::view::Range;

    fn frame() -> Frame {
        compute_frame(&FrameRequest {
            width: 400.0,
            height: 200.0,
            device_pixel_ratio: 1.0,
            x: Range::new(0.0, 10.0),
            y: Range::new(-1.0, 1.0),
            x_manual: false,
            y_manual: false,
            padding: Padding::DEFAULT,
        })
        .unwrap()
    }

    fn segment_count(list: &RenderList) -> usize {
        list.commands()
            .iter()
            .map(|command| match command {
                RenderCommand::LineSegments { segments, .. } => segments.len(),
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn static_layer_labels_every_visible_tick() {
        let frame = frame();
        let layer = build_static_layer(&frame, &ChartConfig::default(), &MonospaceMeasurer::default());
        let labels: Vec<_> = layer.texts().collect();
        let visible_x = frame.x_ticks().iter().filter(|t| frame.x_window().contains(**t)).count();
        let visible_y = frame.y_ticks().iter().filter(|t| frame.y_window().contains(**t)).count();
        assert_eq!(labels.len(), visible_x + visible_y);
        assert!(labels.contains(&"0"));
        assert!(labels.contains(&"10"));
    }

    #[test]
    fn data_layer_respects_draw_budget() {
        let frame = frame();
        let mut store = RingBuffer2D::new(1000).unwrap();
        for i in 0..1000 {
            let x = i as f64 / 100.0;
            store.push(x, x.sin() * 0.5);
        }
        let config = ChartConfig {
            max_drawn_points: 100,
            ..ChartConfig::default()
        };
        let layer = build_data_layer(&frame, &store, &config);
        let segments = segment_count(&layer);
        assert!(segments > 50 && segments <= 100, "{segments}");
    }

    #[test]
    fn single_sample_draws_a_marker() {
        let frame = frame();
        let mut store = RingBuffer2D::new(4).unwrap();
        store.push(5.0, 0.0);
        let layer = build_data_layer(&frame, &store, &ChartConfig::default());
        assert!(layer.commands().iter().any(|command| matches!(command, RenderCommand::Points { .. })));
    }

    #[test]
    fn cursor_layer_shows_readout() {
        let frame = frame();
        let cursor = CursorMarker {
            sample: Point::new(2.5, 0.5),
            linked: true,
            frozen: false,
        };
        let config = ChartConfig::default();
        let layer = build_cursor_layer(&frame, &cursor, &config, &MonospaceMeasurer::default());
        assert_eq!(layer.texts().collect::<Vec<_>>(), vec!["x 2.5  y 0.5"]);
        let crosshair = layer.commands().iter().find_map(|command| match command {
            RenderCommand::LineSegments { segments, style } => Some((segments[0], style.color)),
            _ => None,
        });
        let (segment, color) = crosshair.unwrap();
        assert_eq!(color, config.theme.linked_cursor);
        assert_eq!(segment.start.x, frame.transform().x_to_screen(2.5));
    }

    #[test]
    fn placeholder_centers_message() {
        let layer = build_placeholder(300.0, 100.0, &Theme::default(), &MonospaceMeasurer::default());
        assert_eq!(layer.texts().collect::<Vec<_>>(), vec![PLACEHOLDER_TEXT]);
        assert!(build_placeholder(0.0, 100.0, &Theme::default(), &MonospaceMeasurer::default()).is_empty());
    }
}
