//! Sampled quantities and the scalar transforms applied before storage.

use serde::{Deserialize, Serialize};

/// Reserved source id that resolves to the simulation clock.
pub const TIME_SOURCE: &str = "time";

/// Magnitudes below this are treated as zero by the reciprocal transforms.
pub const RECIPROCAL_EPSILON: f64 = 1e-12;

/// Supplies raw values for `(source, quantity)` pairs on every simulation tick.
///
/// Implemented by the host simulator. `None` means the quantity has no value
/// this tick and the sample is skipped.
pub trait QuantitySource {
    /// Evaluate a quantity of a source element.
    fn evaluate(&self, source_id: &str, quantity_id: &str) -> Option<f64>;
}

impl<F> QuantitySource for F
where
    F: Fn(&str, &str) -> Option<f64>,
{
    fn evaluate(&self, source_id: &str, quantity_id: &str) -> Option<f64> {
        self(source_id, quantity_id)
    }
}

/// Pure scalar transform selected per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTransform {
    /// Value unchanged.
    #[default]
    Identity,
    /// Absolute value.
    Abs,
    /// Negated value.
    Negate,
    /// `1 / x`.
    Reciprocal,
    /// `1 / |x|`.
    ReciprocalAbs,
}

impl ValueTransform {
    /// Every transform, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Identity,
        Self::Abs,
        Self::Negate,
        Self::Reciprocal,
        Self::ReciprocalAbs,
    ];

    /// Stable identifier used in saved settings.
    pub fn id(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Abs => "abs",
            Self::Negate => "negate",
            Self::Reciprocal => "reciprocal",
            Self::ReciprocalAbs => "reciprocal_abs",
        }
    }

    /// Look up a transform by id. Unknown ids fall back to identity.
    pub fn from_id(id: &str) -> Self {
        match Self::ALL.into_iter().find(|transform| transform.id() == id) {
            Some(transform) => transform,
            None => {
                tracing::warn!(id, "unknown value transform, using identity");
                Self::Identity
            }
        }
    }

    /// Apply the transform.
    ///
    /// Returns `None` for non-finite input, for reciprocals of values within
    /// [`RECIPROCAL_EPSILON`] of zero, and for non-finite results.
    pub fn apply(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let result = match self {
            Self::Identity => value,
            Self::Abs => value.abs(),
            Self::Negate => -value,
            Self::Reciprocal | Self::ReciprocalAbs => {
                if value.abs() < RECIPROCAL_EPSILON {
                    return None;
                }
                let base = if self == Self::ReciprocalAbs {
                    value.abs()
                } else {
                    value
                };
                1.0 / base
            }
        };
        result.is_finite().then_some(result)
    }
}

/// How Y values are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YDisplayMode {
    /// Values keep their sign.
    #[default]
    Signed,
    /// Values are shown as magnitudes.
    Magnitude,
}

impl YDisplayMode {
    /// Apply the display mode to a post-transform value.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Signed => value,
            Self::Magnitude => value.abs(),
        }
    }
}
