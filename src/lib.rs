//! scopeplot is a live oscilloscope-style charting engine for running simulations.
//! It stores streaming samples in fixed-size ring buffers, keeps axes steady
//! while the signal moves, and links cursors across independently scaled charts.

#![forbid(unsafe_code)]

pub mod autorange;
pub mod axis;
pub mod config;
pub mod datasource;
pub mod frame;
pub mod geom;
pub mod interaction;
pub mod link;
pub mod plot;
pub mod quantity;
pub mod render;
pub mod scope;
pub mod style;
pub mod transform;
pub mod view;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use autorange::AutoRangeParams;
pub use axis::{AxisFormatter, nice_ticks};
pub use config::{AxisSettings, ChartConfig, ConfigError, PlotSettings, ScopeSettings};
pub use datasource::{
    CapacityError, NearestSample, RingBuffer2D, SearchStrategy, bisect_nearest, nearest_by_x,
    scan_nearest,
};
pub use frame::{Frame, FrameRequest, Padding, compute_frame};
pub use geom::{Point, ScreenPoint, ScreenRect};
pub use interaction::{ChartInteraction, InteractionPhase, PointerEvent, PointerKind};
pub use link::{ChartId, CursorLink, CursorUpdate, LinkedCursor};
pub use plot::{Axis, CursorReadout, Plot};
pub use quantity::{QuantitySource, ValueTransform, YDisplayMode};
pub use render::cache::{StaticLayerCache, frame_signature};
pub use render::{
    Color, LineSegment, LineStyle, MarkerShape, MarkerStyle, MonospaceMeasurer, RecordingSurface,
    RectStyle, RenderCommand, RenderList, Surface, TextMeasurer, TextStyle,
};
pub use scope::{RedrawScheduler, Scope};
pub use style::Theme;
pub use transform::Transform;
pub use view::{Range, Viewport};
