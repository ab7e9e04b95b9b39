//! Persisted scope settings and runtime chart tunables.
//!
//! The persisted schema is camelCase JSON. Reading and writing files is left
//! to the host; this module only maps between strings and settings.

use serde::{Deserialize, Deserializer, Serialize};

use crate::autorange::AutoRangeParams;
use crate::axis::AxisFormatter;
use crate::frame::Padding;
use crate::interaction::DEFAULT_HOLD_MS;
use crate::quantity::{TIME_SOURCE, ValueTransform, YDisplayMode};
use crate::style::Theme;
use crate::view::Range;

/// Longest allowed gap between samples.
pub const MAX_SAMPLE_INTERVAL_MS: u32 = 5000;
/// Sample budget given to new plots.
pub const DEFAULT_MAX_POINTS: usize = 2000;
/// Smallest allowed sample budget.
pub const MIN_MAX_POINTS: usize = 2;
/// Largest allowed sample budget.
pub const MAX_MAX_POINTS: usize = 200_000;

/// Errors raised when loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON could not be parsed or produced.
    #[error("malformed scope settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// What one axis shows and how its window is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AxisRecord", into = "AxisRecord")]
pub struct AxisSettings {
    /// Element the quantity is read from.
    pub source_id: String,
    /// Quantity of the element.
    pub quantity_id: String,
    /// Transform applied before storage.
    pub transform: ValueTransform,
    /// Whether the window follows the data.
    pub auto_range: bool,
    /// Manual lower bound. Ignored while `auto_range` is set.
    pub min: Option<f64>,
    /// Manual upper bound. Ignored while `auto_range` is set.
    pub max: Option<f64>,
}

impl AxisSettings {
    /// Auto-ranged axis for a quantity of an element.
    pub fn new(source_id: impl Into<String>, quantity_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            quantity_id: quantity_id.into(),
            transform: ValueTransform::Identity,
            auto_range: true,
            min: None,
            max: None,
        }
    }

    /// Auto-ranged axis showing simulation time.
    pub fn time() -> Self {
        Self::new(TIME_SOURCE, TIME_SOURCE)
    }

    /// Builder-style transform selection.
    pub fn with_transform(mut self, transform: ValueTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder-style manual window.
    pub fn with_manual_range(mut self, min: f64, max: f64) -> Self {
        self.auto_range = false;
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Manual window, when auto-range is off and both bounds are usable.
    pub fn manual_range(&self) -> Option<Range> {
        if self.auto_range {
            return None;
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => {
                Some(Range::new(min, max))
            }
            _ => None,
        }
    }

    fn sanitize(&mut self, label: &str) {
        for bound in [&mut self.min, &mut self.max] {
            if bound.is_some_and(|value| !value.is_finite()) {
                tracing::warn!(axis = label, "dropping non-finite manual bound");
                *bound = None;
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            tracing::warn!(axis = label, min, max, "swapping inverted manual bounds");
            self.min = Some(max);
            self.max = Some(min);
        }
    }
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self::time()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AxisRecord {
    #[serde(default)]
    source_id: String,
    #[serde(default)]
    quantity_id: String,
    #[serde(default)]
    transform_id: Option<String>,
    #[serde(default = "default_true")]
    auto_range: bool,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

impl From<AxisRecord> for AxisSettings {
    fn from(record: AxisRecord) -> Self {
        Self {
            source_id: record.source_id,
            quantity_id: record.quantity_id,
            transform: record
                .transform_id
                .as_deref()
                .map(ValueTransform::from_id)
                .unwrap_or_default(),
            auto_range: record.auto_range,
            min: record.min,
            max: record.max,
        }
    }
}

impl From<AxisSettings> for AxisRecord {
    fn from(settings: AxisSettings) -> Self {
        let (min, max) = if settings.auto_range {
            (None, None)
        } else {
            (settings.min, settings.max)
        };
        Self {
            source_id: settings.source_id,
            quantity_id: settings.quantity_id,
            transform_id: Some(settings.transform.id().to_string()),
            auto_range: settings.auto_range,
            min,
            max,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Settings for one plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotSettings {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Sample budget (store capacity).
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    /// Sign handling for Y values.
    #[serde(default)]
    pub y_display_mode: YDisplayMode,
    /// X axis.
    #[serde(default)]
    pub x: AxisSettings,
    /// Y axis.
    pub y: AxisSettings,
}

impl PlotSettings {
    /// Plot of a quantity against simulation time.
    pub fn new(name: impl Into<String>, y: AxisSettings) -> Self {
        Self {
            name: name.into(),
            max_points: DEFAULT_MAX_POINTS,
            y_display_mode: YDisplayMode::Signed,
            x: AxisSettings::time(),
            y,
        }
    }

    /// Clamp out-of-range values, logging each change.
    pub fn sanitize(&mut self) {
        let clamped = self.max_points.clamp(MIN_MAX_POINTS, MAX_MAX_POINTS);
        if clamped != self.max_points {
            tracing::warn!(
                plot = %self.name,
                requested = self.max_points,
                clamped,
                "clamping plot sample budget"
            );
            self.max_points = clamped;
        }
        self.x.sanitize("x");
        self.y.sanitize("y");
    }
}

fn default_max_points() -> usize {
    DEFAULT_MAX_POINTS
}

/// Everything a scope persists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSettings {
    /// Minimum simulated time between samples, in milliseconds. `0` samples every tick.
    #[serde(default, deserialize_with = "clamped_interval")]
    pub sample_interval_ms: u32,
    /// Plots, in display order.
    #[serde(default)]
    pub plots: Vec<PlotSettings>,
}

impl ScopeSettings {
    /// Parse and sanitize settings.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Serialize settings.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp out-of-range values, logging each change.
    pub fn sanitize(&mut self) {
        if self.sample_interval_ms > MAX_SAMPLE_INTERVAL_MS {
            tracing::warn!(
                requested = self.sample_interval_ms,
                "clamping sample interval"
            );
            self.sample_interval_ms = MAX_SAMPLE_INTERVAL_MS;
        }
        for plot in &mut self.plots {
            plot.sanitize();
        }
    }
}

fn clamped_interval<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    let clamped = if raw.is_finite() {
        raw.round().clamp(0.0, f64::from(MAX_SAMPLE_INTERVAL_MS))
    } else {
        0.0
    };
    if clamped != raw {
        tracing::warn!(requested = raw, clamped, "clamping sample interval");
    }
    Ok(clamped as u32)
}

/// Runtime tunables for a chart. Not persisted.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Press duration that freezes a touch or pen cursor.
    pub hold_ms: f64,
    /// Insets around the plot rectangle.
    pub padding: Padding,
    /// Colors and sizes.
    pub theme: Theme,
    /// Auto-range tuning for X.
    pub x_auto_range: AutoRangeParams,
    /// Auto-range tuning for Y.
    pub y_auto_range: AutoRangeParams,
    /// X tick and readout formatting.
    pub x_formatter: AxisFormatter,
    /// Y tick and readout formatting.
    pub y_formatter: AxisFormatter,
    /// Draw the value readout next to the cursor.
    pub show_readout: bool,
    /// Upper bound on drawn segments; longer series are stride-sampled.
    pub max_drawn_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            hold_ms: DEFAULT_HOLD_MS,
            padding: Padding::DEFAULT,
            theme: Theme::default(),
            x_auto_range: AutoRangeParams::X_AXIS,
            y_auto_range: AutoRangeParams::Y_AXIS,
            x_formatter: AxisFormatter::Default,
            y_formatter: AxisFormatter::Default,
            show_readout: true,
            max_drawn_points: 4096,
        }
    }
}
