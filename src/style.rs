//! Chart colors and text sizes.

use crate::render::Color;

/// Visual theme for scope charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Canvas background.
    pub background: Color,
    /// Plot rectangle background.
    pub plot_background: Color,
    /// Grid lines at ticks.
    pub grid: Color,
    /// Plot rectangle border and zero line.
    pub axis: Color,
    /// Tick labels.
    pub label: Color,
    /// Series stroke.
    pub trace: Color,
    /// Local cursor crosshair and marker.
    pub cursor: Color,
    /// Cursor mirrored from a linked chart.
    pub linked_cursor: Color,
    /// Readout box fill.
    pub readout_background: Color,
    /// Empty-state text.
    pub placeholder: Color,
    /// Tick label font size.
    pub label_size: f32,
    /// Series stroke width.
    pub trace_width: f32,
}

impl Theme {
    /// Create the default (dark) theme.
    pub fn new() -> Self {
        Self::dark()
    }

    /// Dark scope theme.
    pub fn dark() -> Self {
        Self {
            background: Color::rgb(0x14161a),
            plot_background: Color::rgb(0x1b1e24),
            grid: Color::rgb(0x2c313a),
            axis: Color::rgb(0x5c6370),
            label: Color::rgb(0x9da5b4),
            trace: Color::rgb(0x4fc3f7),
            cursor: Color::rgb(0xffd54f),
            linked_cursor: Color::rgb(0xffd54f).with_alpha(0.55),
            readout_background: Color::rgb(0x000000).with_alpha(0.7),
            placeholder: Color::rgb(0x6b7280),
            label_size: 11.0,
            trace_width: 1.5,
        }
    }

    /// Light theme for printing and screenshots.
    pub fn light() -> Self {
        Self {
            background: Color::WHITE,
            plot_background: Color::rgb(0xfafafa),
            grid: Color::rgb(0xe3e3e3),
            axis: Color::rgb(0x8a8a8a),
            label: Color::rgb(0x404040),
            trace: Color::rgb(0x1565c0),
            cursor: Color::rgb(0xd84315),
            linked_cursor: Color::rgb(0xd84315).with_alpha(0.5),
            readout_background: Color::WHITE.with_alpha(0.85),
            placeholder: Color::rgb(0x9e9e9e),
            label_size: 11.0,
            trace_width: 1.5,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}
