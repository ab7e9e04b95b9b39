//! The scope: a stack of linked plots fed from a running simulation.

use crate::config::{ChartConfig, MAX_SAMPLE_INTERVAL_MS, PlotSettings, ScopeSettings};
use crate::datasource::CapacityError;
use crate::interaction::PointerEvent;
use crate::link::CursorLink;
use crate::plot::Plot;
use crate::quantity::QuantitySource;

/// Slack on the cadence gate so float rounding never skips a due sample.
const CADENCE_EPSILON: f64 = 1e-12;

/// Coalesces redraw requests into a single pending callback.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RedrawScheduler {
    pending: bool,
}

impl RedrawScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw.
    ///
    /// Returns `true` only when no redraw was pending, in which case the
    /// caller must schedule exactly one callback.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Whether a redraw is pending.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark the pending redraw as done.
    pub fn complete(&mut self) {
        self.pending = false;
    }
}

/// Linked plots sharing a sampling cadence.
#[derive(Debug)]
pub struct Scope {
    sample_interval_ms: u32,
    last_sample_time: Option<f64>,
    plots: Vec<Plot>,
    link: CursorLink,
    scheduler: RedrawScheduler,
    config: ChartConfig,
}

impl Scope {
    /// Create an empty scope that samples on every tick.
    pub fn new(config: ChartConfig) -> Self {
        Self {
            sample_interval_ms: 0,
            last_sample_time: None,
            plots: Vec::new(),
            link: CursorLink::new(),
            scheduler: RedrawScheduler::new(),
            config,
        }
    }

    /// Restore a scope from persisted settings.
    pub fn from_settings(settings: ScopeSettings, config: ChartConfig) -> Result<Self, CapacityError> {
        let mut scope = Self::new(config);
        scope.set_sample_interval_ms(settings.sample_interval_ms);
        for plot in settings.plots {
            scope.add_plot(plot)?;
        }
        Ok(scope)
    }

    /// Settings to persist.
    pub fn settings(&self) -> ScopeSettings {
        ScopeSettings {
            sample_interval_ms: self.sample_interval_ms,
            plots: self.plots.iter().map(|plot| plot.settings().clone()).collect(),
        }
    }

    /// Cursor link shared by every plot.
    pub fn link(&self) -> &CursorLink {
        &self.link
    }

    /// Plots in display order.
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    /// Plot at `index`.
    pub fn plot(&self, index: usize) -> Option<&Plot> {
        self.plots.get(index)
    }

    /// Plot at `index`, mutably. Callers changing visible state should
    /// follow up with [`Scope::request_redraw`].
    pub fn plot_mut(&mut self, index: usize) -> Option<&mut Plot> {
        self.plots.get_mut(index)
    }

    /// Append a plot and link its cursor to the others. Returns its index.
    pub fn add_plot(&mut self, settings: PlotSettings) -> Result<usize, CapacityError> {
        let mut plot = Plot::with_config(settings, self.config.clone())?;
        plot.attach_link(&self.link);
        self.plots.push(plot);
        self.request_redraw();
        Ok(self.plots.len() - 1)
    }

    /// Remove the plot at `index`.
    pub fn remove_plot(&mut self, index: usize) -> Option<Plot> {
        if index >= self.plots.len() {
            return None;
        }
        let mut plot = self.plots.remove(index);
        plot.detach_link();
        self.reclaim_link();
        self.request_redraw();
        Some(plot)
    }

    /// Minimum simulated time between samples, in milliseconds.
    pub fn sample_interval_ms(&self) -> u32 {
        self.sample_interval_ms
    }

    /// Change the sampling cadence. Values above the limit are clamped.
    pub fn set_sample_interval_ms(&mut self, interval_ms: u32) {
        if interval_ms > MAX_SAMPLE_INTERVAL_MS {
            tracing::warn!(requested = interval_ms, "clamping sample interval");
        }
        self.sample_interval_ms = interval_ms.min(MAX_SAMPLE_INTERVAL_MS);
    }

    /// Whether a sample is due at `sim_time`.
    pub fn is_sample_due(&self, sim_time: f64) -> bool {
        let Some(last) = self.last_sample_time else {
            return true;
        };
        let interval = f64::from(self.sample_interval_ms) / 1000.0;
        sim_time + CADENCE_EPSILON >= last + interval
    }

    /// Sample every plot if the cadence gate allows it.
    ///
    /// A clock earlier than the last sample means the simulation restarted:
    /// the scope is [reset](Scope::reset) first so X keeps increasing.
    /// Returns whether any plot recorded a sample. A redraw is requested
    /// when one did.
    pub fn sample(&mut self, source: &dyn QuantitySource, sim_time: f64) -> bool {
        if !sim_time.is_finite() {
            return false;
        }
        if self.last_sample_time.is_some_and(|last| sim_time < last) {
            tracing::debug!(sim_time, "simulation clock rewound");
            self.reset();
        }
        if !self.is_sample_due(sim_time) {
            return false;
        }
        self.last_sample_time = Some(sim_time);
        let mut recorded = false;
        for plot in &mut self.plots {
            recorded |= plot.sample(source, sim_time);
        }
        if recorded {
            self.request_redraw();
        }
        recorded
    }

    /// Clear every plot and restart the cadence gate.
    pub fn reset(&mut self) {
        tracing::debug!(plots = self.plots.len(), "resetting scope");
        self.last_sample_time = None;
        for plot in &mut self.plots {
            plot.clear();
        }
        self.request_redraw();
    }

    /// Ask for a redraw. See [`RedrawScheduler::request`].
    pub fn request_redraw(&mut self) -> bool {
        self.scheduler.request()
    }

    /// Whether a redraw is pending.
    pub fn redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Forward a press to a plot.
    pub fn pointer_down(&mut self, index: usize, event: PointerEvent) -> bool {
        self.with_plot(index, |plot| plot.pointer_down(event))
    }

    /// Forward pointer motion to a plot.
    pub fn pointer_move(&mut self, index: usize, event: PointerEvent) -> bool {
        self.with_plot(index, |plot| plot.pointer_move(event))
    }

    /// Forward a release to a plot.
    pub fn pointer_up(&mut self, index: usize, event: PointerEvent) -> bool {
        self.with_plot(index, |plot| plot.pointer_up(event))
    }

    /// Forward the pointer leaving a plot.
    pub fn pointer_leave(&mut self, index: usize) -> bool {
        self.with_plot(index, Plot::pointer_leave)
    }

    /// Run the pending redraw: render every dirty plot, then clear the flag.
    ///
    /// Link messages are consumed first so siblings of the pointer's chart are
    /// redrawn too. Returns the number of plots rendered.
    pub fn flush_redraw<F>(&mut self, mut render: F) -> usize
    where
        F: FnMut(usize, &mut Plot),
    {
        self.reclaim_link();
        let mut rendered = 0;
        for (index, plot) in self.plots.iter_mut().enumerate() {
            plot.sync_link();
            if plot.is_dirty() {
                render(index, plot);
                rendered += 1;
            }
        }
        self.scheduler.complete();
        rendered
    }

    /// Render every plot, dirty or not, and clear the pending flag.
    ///
    /// Used by immediate-mode backends that repaint the whole canvas each frame.
    pub fn render_all<F>(&mut self, mut render: F)
    where
        F: FnMut(usize, &mut Plot),
    {
        self.reclaim_link();
        for (index, plot) in self.plots.iter_mut().enumerate() {
            plot.sync_link();
            render(index, plot);
        }
        self.scheduler.complete();
    }

    fn with_plot(&mut self, index: usize, handle: impl FnOnce(&mut Plot) -> bool) -> bool {
        let Some(plot) = self.plots.get_mut(index) else {
            return false;
        };
        let changed = handle(plot);
        if changed {
            self.reclaim_link();
            self.request_redraw();
        }
        changed
    }

    /// Hand an empty link back to a plot that still shows a cursor.
    ///
    /// When one plot withdraws, a frozen pin (or any other live readout) on a
    /// sibling is published again so the remaining plots keep mirroring it.
    fn reclaim_link(&self) {
        let live = |frozen: bool| {
            self.plots.iter().find(|plot| {
                plot.interaction().readout().is_some() && plot.interaction().is_frozen() == frozen
            })
        };
        if let Some(plot) = live(true).or_else(|| live(false)) {
            plot.reclaim_link();
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}
