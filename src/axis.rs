//! Axis tick placement and label formatting.

use std::sync::Arc;

/// Upper bound on emitted ticks, guarding against pathological windows.
const MAX_TICKS: usize = 512;
/// Horizontal pixels per X tick when deriving a target count.
pub const X_TICK_SPACING_PX: f32 = 90.0;
/// Vertical pixels per Y tick when deriving a target count.
pub const Y_TICK_SPACING_PX: f32 = 48.0;

/// Round a raw step to the nearest of `{1, 2, 5, 10} × 10^k`.
pub fn nice_step(raw_step: f64) -> Option<f64> {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return None;
    }
    let magnitude = 10_f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    Some(nice * magnitude)
}

/// Evenly spaced "nice" ticks covering `[lo, hi]`.
///
/// The first tick is `<= lo` and the last is `>= hi`. Fewer than two requested
/// ticks, or an empty span, returns the bounds as-is; non-finite bounds return
/// no ticks.
pub fn nice_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    if count < 2 || hi <= lo {
        return if lo == hi { vec![lo] } else { vec![lo, hi] };
    }
    let Some(step) = nice_step((hi - lo) / count as f64) else {
        return vec![lo, hi];
    };

    let mut first = (lo / step).floor() as i64;
    let mut last = (hi / step).ceil() as i64;
    if first as f64 * step > lo {
        first -= 1;
    }
    if (last as f64 * step) < hi {
        last += 1;
    }
    if (last - first) as usize >= MAX_TICKS {
        return vec![lo, hi];
    }
    (first..=last).map(|index| index as f64 * step).collect()
}

/// Target tick count for an axis of the given pixel length.
pub fn tick_count_for(length_px: f32, spacing_px: f32) -> usize {
    if !(length_px > 0.0) || !(spacing_px > 0.0) {
        return 2;
    }
    ((length_px / spacing_px).round() as usize).clamp(2, 10)
}

/// Decimal places needed to tell ticks `step` apart.
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10() - 1e-9).ceil().clamp(0.0, 12.0) as usize
}

/// Formatter for tick labels and readouts.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Default numeric formatter.
    #[default]
    Default,
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Format a value for a cursor readout.
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Default => format_compact(value),
            Self::Custom(formatter) => formatter(value),
        }
    }

    /// Format a tick value, using the tick step to pick a precision.
    pub fn format_tick(&self, value: f64, step: f64) -> String {
        match self {
            Self::Default => {
                let magnitude = value.abs().max(step.abs());
                if magnitude >= 1e6 || (magnitude > 0.0 && magnitude < 1e-4) {
                    return format!("{value:.2e}");
                }
                // Snap values like 0.30000000000000004 and -0.0.
                let decimals = decimals_for_step(step);
                let text = format!("{value:.decimals$}");
                if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
                    text.trim_start_matches('-').to_string()
                } else {
                    text
                }
            }
            Self::Custom(formatter) => formatter(value),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "AxisFormatter::Default"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e6).contains(&magnitude) {
        return format!("{value:.3e}");
    }
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
