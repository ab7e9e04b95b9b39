//! A single scope chart: one sample store plus everything needed to draw it.

use crate::config::{AxisSettings, ChartConfig, PlotSettings};
use crate::datasource::{CapacityError, NearestSample, RingBuffer2D, nearest_by_x};
use crate::frame::{Frame, FrameRequest, compute_frame};
use crate::interaction::{ChartInteraction, PointerEvent};
use crate::link::{ChartId, CursorLink, LinkedCursor};
use crate::quantity::{QuantitySource, TIME_SOURCE, ValueTransform};
use crate::render::cache::StaticLayerCache;
use crate::render::chart::{
    CursorMarker, build_cursor_layer, build_data_layer, build_placeholder, build_static_layer,
    build_title,
};
use crate::render::{Surface, TextMeasurer};
use crate::view::Range;

/// Axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Cursor position resolved against the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorReadout {
    /// Nearest sample to the cursor X.
    pub nearest: NearestSample,
    /// Mirrored from another chart.
    pub linked: bool,
    /// Latched in place.
    pub frozen: bool,
}

#[derive(Debug, Clone)]
struct LinkBinding {
    link: CursorLink,
    id: ChartId,
    seen_seq: u64,
    mirrored: Option<LinkedCursor>,
}

/// One chart: settings, samples, auto-range state, cursor and render cache.
#[derive(Debug, Clone)]
pub struct Plot {
    settings: PlotSettings,
    config: ChartConfig,
    store: RingBuffer2D,
    x_window: Option<Range>,
    y_window: Option<Range>,
    interaction: ChartInteraction,
    cache: StaticLayerCache,
    frame: Option<Frame>,
    link: Option<LinkBinding>,
    dirty: bool,
}

impl Plot {
    /// Create a plot with default chart tunables.
    pub fn new(settings: PlotSettings) -> Result<Self, CapacityError> {
        Self::with_config(settings, ChartConfig::default())
    }

    /// Create a plot with custom chart tunables.
    pub fn with_config(settings: PlotSettings, config: ChartConfig) -> Result<Self, CapacityError> {
        let store = RingBuffer2D::new(settings.max_points)?;
        Ok(Self {
            interaction: ChartInteraction::new(config.hold_ms),
            settings,
            config,
            store,
            x_window: None,
            y_window: None,
            cache: StaticLayerCache::new(),
            frame: None,
            link: None,
            dirty: true,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    /// Chart tunables.
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Replace the chart tunables. The static layer is rebuilt on the next render.
    pub fn set_config(&mut self, config: ChartConfig) {
        self.interaction.set_hold_ms(config.hold_ms);
        self.config = config;
        self.cache.invalidate();
        self.dirty = true;
    }

    /// Samples.
    pub fn store(&self) -> &RingBuffer2D {
        &self.store
    }

    /// Pointer state.
    pub fn interaction(&self) -> &ChartInteraction {
        &self.interaction
    }

    /// Static layer cache.
    pub fn cache(&self) -> &StaticLayerCache {
        &self.cache
    }

    /// Frame of the last render or layout.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Current auto-range window of an axis, if one has been established.
    pub fn auto_window(&self, axis: Axis) -> Option<Range> {
        match axis {
            Axis::X => self.x_window,
            Axis::Y => self.y_window,
        }
    }

    /// Whether something visible changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a redraw on the next flush.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rename the plot.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.settings.name = name.into();
        self.dirty = true;
    }

    /// Append a sample. Returns `false` when it was rejected as non-finite.
    pub fn record(&mut self, x: f64, y: f64) -> bool {
        let stored = self.store.push(x, y);
        self.dirty |= stored;
        stored
    }

    /// Evaluate both axes at `sim_time` and record the result.
    ///
    /// Returns `false` when either axis has no value this tick.
    pub fn sample(&mut self, source: &dyn QuantitySource, sim_time: f64) -> bool {
        let Some(x) = evaluate_axis(&self.settings.x, source, sim_time) else {
            return false;
        };
        let Some(y) = evaluate_axis(&self.settings.y, source, sim_time) else {
            return false;
        };
        let y = self.settings.y_display_mode.apply(y);
        self.record(x, y)
    }

    /// Resize the store, keeping the newest samples.
    pub fn set_max_points(&mut self, max_points: usize) -> Result<(), CapacityError> {
        if max_points == self.store.capacity() {
            return Ok(());
        }
        self.store = self.store.with_capacity_from(max_points)?;
        self.settings.max_points = max_points;
        self.reset_windows();
        Ok(())
    }

    /// Switch an axis between auto-range and its manual window.
    pub fn set_auto_range(&mut self, axis: Axis, auto_range: bool) {
        let settings = self.axis_settings_mut(axis);
        if settings.auto_range == auto_range {
            return;
        }
        settings.auto_range = auto_range;
        self.discard_window(axis);
    }

    /// Set a manual window and turn auto-range off for the axis.
    pub fn set_manual_range(&mut self, axis: Axis, min: f64, max: f64) {
        let range = Range::new(min, max);
        let settings = self.axis_settings_mut(axis);
        settings.auto_range = false;
        settings.min = Some(range.min);
        settings.max = Some(range.max);
        self.discard_window(axis);
    }

    /// Change what an axis measures. Existing samples no longer apply and are dropped.
    pub fn set_quantity(
        &mut self,
        axis: Axis,
        source_id: impl Into<String>,
        quantity_id: impl Into<String>,
        transform: ValueTransform,
    ) {
        let settings = self.axis_settings_mut(axis);
        settings.source_id = source_id.into();
        settings.quantity_id = quantity_id.into();
        settings.transform = transform;
        self.clear();
    }

    /// Drop every sample and any cursor.
    pub fn clear(&mut self) {
        self.store.clear();
        self.interaction.reset();
        if let Some(binding) = &self.link {
            binding.link.withdraw(binding.id);
        }
        self.reset_windows();
    }

    /// Join a cursor link. Any previous link is left first.
    ///
    /// A cursor already live on the link is mirrored on the next sync.
    pub fn attach_link(&mut self, link: &CursorLink) -> ChartId {
        self.detach_link();
        let id = link.register();
        self.link = Some(LinkBinding {
            link: link.clone(),
            id,
            seen_seq: 0,
            mirrored: None,
        });
        id
    }

    /// Leave the current cursor link, withdrawing any published cursor.
    pub fn detach_link(&mut self) {
        if let Some(binding) = self.link.take() {
            binding.link.leave(binding.id);
            self.dirty |= binding.mirrored.is_some();
        }
    }

    /// Identifier on the current link.
    pub fn link_id(&self) -> Option<ChartId> {
        self.link.as_ref().map(|binding| binding.id)
    }

    /// Cursor mirrored from a sibling chart.
    pub fn mirrored_cursor(&self) -> Option<LinkedCursor> {
        self.link.as_ref().and_then(|binding| binding.mirrored)
    }

    /// Consume link messages newer than the last one seen.
    ///
    /// Returns whether the mirrored cursor changed.
    pub fn sync_link(&mut self) -> bool {
        let Some(binding) = self.link.as_mut() else {
            return false;
        };
        let Some(update) = binding.link.latest_since(binding.seen_seq) else {
            return false;
        };
        binding.seen_seq = update.seq;
        let mirrored = update.mirrored_for(binding.id);
        if binding.mirrored == mirrored {
            return false;
        }
        binding.mirrored = mirrored;
        self.dirty = true;
        true
    }

    /// Handle a press. Returns whether the chart needs a redraw.
    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        let changed = self.interaction.pointer_down(event);
        self.after_pointer(changed)
    }

    /// Handle pointer motion. Returns whether the chart needs a redraw.
    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        let changed = self.interaction.pointer_move(event);
        self.after_pointer(changed)
    }

    /// Handle a release. Returns whether the chart needs a redraw.
    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        let changed = self.interaction.pointer_up(event);
        self.after_pointer(changed)
    }

    /// Handle the pointer leaving. Returns whether the chart needs a redraw.
    pub fn pointer_leave(&mut self) -> bool {
        let changed = self.interaction.pointer_leave();
        self.after_pointer(changed)
    }

    /// Resolve the windows and lay out a frame for the given canvas.
    ///
    /// Auto-range windows advance by one stabilizer step per call.
    pub fn layout(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Option<&Frame> {
        self.frame = self.resolve_frame(width, height, device_pixel_ratio);
        self.frame.as_ref()
    }

    /// Cursor to show: the local readout, or else a mirrored sibling cursor.
    pub fn cursor_readout(&self) -> Option<CursorReadout> {
        let frame = self.frame.as_ref()?;
        if let Some(position) = self.interaction.readout() {
            let x = frame.transform().screen_to_data(position).x;
            return nearest_by_x(&self.store, x).map(|nearest| CursorReadout {
                nearest,
                linked: false,
                frozen: self.interaction.is_frozen(),
            });
        }
        let mirrored = self.mirrored_cursor()?;
        let x = frame.x_at_ratio(mirrored.x_ratio.clamp(0.0, 1.0));
        nearest_by_x(&self.store, x).map(|nearest| CursorReadout {
            nearest,
            linked: true,
            frozen: mirrored.frozen,
        })
    }

    /// Draw the chart onto `surface`.
    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        measurer: &dyn TextMeasurer,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
    ) {
        self.sync_link();
        self.dirty = false;
        self.frame = self.resolve_frame(width, height, device_pixel_ratio);
        let Some(frame) = self.frame.as_ref() else {
            build_placeholder(width, height, &self.config.theme, measurer).replay(surface);
            return;
        };

        let config = &self.config;
        let layer = self
            .cache
            .layer(frame, |frame| build_static_layer(frame, config, measurer));
        surface.draw_layer(layer);
        build_data_layer(frame, &self.store, config).replay(surface);
        build_title(frame, &self.settings.name, &config.theme).replay(surface);

        if let Some(readout) = self.cursor_readout() {
            let marker = CursorMarker {
                sample: readout.nearest.point,
                linked: readout.linked,
                frozen: readout.frozen,
            };
            build_cursor_layer(frame, &marker, config, measurer).replay(surface);
        }
    }

    fn resolve_frame(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Option<Frame> {
        if self.store.is_empty() {
            return None;
        }
        let extent = self.store.range();
        let x = match self.settings.x.manual_range() {
            Some(range) => Some(range),
            None => {
                let raw = extent?.x;
                self.x_window = self.config.x_auto_range.stabilize(raw, self.x_window);
                self.x_window
            }
        };
        let y = match self.settings.y.manual_range() {
            Some(range) => Some(range),
            None => {
                let raw = extent?.y;
                self.y_window = self.config.y_auto_range.stabilize(raw, self.y_window);
                self.y_window
            }
        };
        compute_frame(&FrameRequest {
            width,
            height,
            device_pixel_ratio,
            x: x?,
            y: y?,
            x_manual: self.settings.x.manual_range().is_some(),
            y_manual: self.settings.y.manual_range().is_some(),
            padding: self.config.padding,
        })
    }

    fn after_pointer(&mut self, changed: bool) -> bool {
        if !changed {
            return false;
        }
        self.dirty = true;
        self.publish_cursor();
        true
    }

    /// Publish the local cursor again if the link currently carries none.
    ///
    /// Returns whether a message was sent.
    pub fn reclaim_link(&self) -> bool {
        let Some(binding) = &self.link else {
            return false;
        };
        let vacant = binding.link.latest().is_none_or(|update| update.cursor.is_none());
        if !vacant || self.interaction.readout().is_none() || self.frame.is_none() {
            return false;
        }
        self.publish_cursor();
        true
    }

    fn publish_cursor(&self) {
        let Some(binding) = &self.link else {
            return;
        };
        let position = self.interaction.readout();
        match (position, self.frame.as_ref()) {
            (Some(position), Some(frame)) => {
                let (x_ratio, y_ratio) = frame.transform().screen_to_ratio(position);
                binding.link.publish(LinkedCursor {
                    source: binding.id,
                    x_ratio,
                    y_ratio,
                    frozen: self.interaction.is_frozen(),
                });
            }
            _ => binding.link.withdraw(binding.id),
        }
    }

    fn axis_settings_mut(&mut self, axis: Axis) -> &mut AxisSettings {
        match axis {
            Axis::X => &mut self.settings.x,
            Axis::Y => &mut self.settings.y,
        }
    }

    fn discard_window(&mut self, axis: Axis) {
        match axis {
            Axis::X => self.x_window = None,
            Axis::Y => self.y_window = None,
        }
        self.dirty = true;
    }

    fn reset_windows(&mut self) {
        tracing::debug!(plot = %self.settings.name, "resetting auto-range windows");
        self.x_window = None;
        self.y_window = None;
        self.dirty = true;
    }
}

fn evaluate_axis(axis: &AxisSettings, source: &dyn QuantitySource, sim_time: f64) -> Option<f64> {
    let raw = if axis.source_id == TIME_SOURCE {
        Some(sim_time)
    } else {
        source.evaluate(&axis.source_id, &axis.quantity_id)
    };
    axis.transform.apply(raw?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::ScreenPoint;
    use crate::interaction::PointerKind;
    use crate::quantity::YDisplayMode;
    use crate::render::chart::PLACEHOLDER_TEXT;
    use crate::render::{MonospaceMeasurer, RecordingSurface};

    fn plot(max_points: usize) -> Plot {
        let mut settings = PlotSettings::new("V(R1)", AxisSettings::new("R1", "voltage"));
        settings.max_points = max_points;
        Plot::new(settings).unwrap()
    }

    fn render(plot: &mut Plot) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        plot.render(&mut surface, &MonospaceMeasurer::default(), 400.0, 200.0, 1.0);
        surface
    }

    fn mouse(x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(ScreenPoint::new(x, y), PointerKind::Mouse, 0.0)
    }

    #[test]
    fn zero_budget_is_rejected() {
        let settings = PlotSettings {
            max_points: 0,
            ..PlotSettings::new("p", AxisSettings::time())
        };
        assert_eq!(Plot::new(settings).unwrap_err(), CapacityError::Zero);
    }

    #[test]
    fn empty_plot_renders_placeholder() {
        let mut plot = plot(8);
        let surface = render(&mut plot);
        assert_eq!(surface.recorded().texts().collect::<Vec<_>>(), vec![PLACEHOLDER_TEXT]);
        assert!(plot.frame().is_none());
        assert!(!plot.is_dirty());
    }

    #[test]
    fn sampling_applies_transform_and_display_mode() {
        let mut settings = PlotSettings::new(
            "p",
            AxisSettings::new("R1", "voltage").with_transform(ValueTransform::Negate),
        );
        settings.y_display_mode = YDisplayMode::Magnitude;
        let mut plot = Plot::new(settings).unwrap();
        let source = |_: &str, _: &str| Some(2.0);
        assert!(plot.sample(&source, 0.5));
        assert_eq!(plot.store().last().unwrap(), crate::geom::Point::new(0.5, 2.0));

        let missing = |_: &str, _: &str| None::<f64>;
        assert!(!plot.sample(&missing, 0.6));
        assert_eq!(plot.store().len(), 1);
    }

    #[test]
    fn static_layer_is_reused_between_identical_frames() {
        let mut plot = plot(16);
        for i in 0..10 {
            plot.record(i as f64, (i % 3) as f64);
        }
        render(&mut plot);
        let surface = render(&mut plot);
        assert_eq!(plot.cache().misses(), 1);
        assert_eq!(plot.cache().hits(), 1);
        assert_eq!(surface.layers_drawn(), 1);
    }

    #[test]
    fn manual_range_bypasses_auto_range() {
        let mut plot = plot(16);
        plot.record(0.0, 100.0);
        plot.record(1.0, 200.0);
        plot.set_manual_range(Axis::Y, -1.0, 1.0);
        let frame = plot.layout(400.0, 200.0, 1.0).unwrap();
        assert!((frame.y_window().min + 1.08).abs() < 1e-9);
        assert!(plot.auto_window(Axis::Y).is_none());

        plot.set_auto_range(Axis::Y, true);
        let frame = plot.layout(400.0, 200.0, 1.0).unwrap();
        assert!(frame.y_window().contains(100.0) && frame.y_window().contains(200.0));
        assert!(plot.auto_window(Axis::Y).is_some());
    }

    #[test]
    fn resizing_keeps_newest_samples_and_resets_windows() {
        let mut plot = plot(8);
        for i in 0..8 {
            plot.record(i as f64, i as f64);
        }
        plot.layout(400.0, 200.0, 1.0);
        assert!(plot.auto_window(Axis::X).is_some());
        plot.set_max_points(3).unwrap();
        assert_eq!(plot.store().len(), 3);
        assert_eq!(plot.store().first().unwrap().x, 5.0);
        assert_eq!(plot.settings().max_points, 3);
        assert!(plot.auto_window(Axis::X).is_none());
        assert_eq!(plot.set_max_points(0), Err(CapacityError::Zero));
    }

    #[test]
    fn hover_snaps_to_nearest_sample() {
        let mut plot = plot(32);
        for i in 0..=10 {
            plot.record(i as f64, (i * i) as f64);
        }
        render(&mut plot);
        let frame = plot.frame().unwrap();
        let position = ScreenPoint::new(frame.transform().x_to_screen(3.2), 50.0);
        assert!(plot.pointer_move(PointerEvent::new(position, PointerKind::Mouse, 0.0)));
        let readout = plot.cursor_readout().unwrap();
        assert_eq!(readout.nearest.point.x, 3.0);
        assert!(!readout.linked);

        let surface = render(&mut plot);
        assert!(surface.recorded().texts().any(|text| text == "x 3  y 9"));
    }

    #[test]
    fn linked_cursor_resolves_in_sibling_domain() {
        let link = CursorLink::new();
        let mut a = plot(64);
        let mut b = plot(64);
        let a_id = a.attach_link(&link);
        b.attach_link(&link);
        for i in 0..=20 {
            a.record(i as f64, 0.0);
            b.record(i as f64 * 10.0, i as f64);
        }
        render(&mut a);
        render(&mut b);

        let frame = a.frame().unwrap();
        let target = frame.x_window().lerp(0.5);
        let position = ScreenPoint::new(frame.transform().x_to_screen(target), 40.0);
        assert!(a.pointer_move(mouse(position.x, position.y)));
        let published = link.latest().unwrap();
        assert_eq!(published.source, a_id);
        assert!(published.cursor.is_some());

        assert!(b.sync_link());
        let readout = b.cursor_readout().unwrap();
        assert!(readout.linked);
        let expected = b.frame().unwrap().x_at_ratio(published.cursor.unwrap().x_ratio);
        assert!((readout.nearest.point.x - expected).abs() <= 5.0);

        assert!(!a.sync_link() || a.mirrored_cursor().is_none());
        assert!(a.cursor_readout().is_some_and(|readout| !readout.linked));

        assert!(a.pointer_leave());
        assert!(b.sync_link());
        assert!(b.cursor_readout().is_none());
    }

    #[test]
    fn clear_drops_samples_cursor_and_windows() {
        let mut plot = plot(8);
        plot.record(0.0, 1.0);
        plot.record(1.0, 2.0);
        render(&mut plot);
        plot.pointer_move(mouse(100.0, 100.0));
        plot.clear();
        assert!(plot.store().is_empty());
        assert!(plot.interaction().readout().is_none());
        assert!(plot.auto_window(Axis::Y).is_none());
        assert!(plot.is_dirty());
    }
}
