//! Threshold evaluation of readings.
//!
//! [`evaluate`] compares every quantity of a [`Reading`] against a room's
//! [`ThresholdSet`] and returns a [`Verdict`]. It is a pure function: the same
//! inputs always give the same verdict.
//!
//! # Bound rules
//!
//! | Quantity | In bounds when |
//! |----------|----------------|
//! | Temperature, humidity | `min <= value <= max` |
//! | CO₂, VOC | `value <= max` |
//! | Illuminance | `value >= min` |
//!
//! # Example
//!
//! ```
//! use roomwatch_core::thresholds::{evaluate, Check};
//! use roomwatch_types::{Quantity, Reading, ThresholdSet};
//! use time::OffsetDateTime;
//!
//! let reading = Reading {
//!     timestamp: OffsetDateTime::UNIX_EPOCH,
//!     temperature: 25.0,
//!     humidity: 50.0,
//!     co2: 800.0,
//!     voc: 300.0,
//!     lux: 400.0,
//! };
//! let verdict = evaluate(&reading, &ThresholdSet::default());
//! assert_eq!(verdict.check(Quantity::Temperature), Check::Above);
//! assert!(verdict.in_bounds(Quantity::Co2));
//! ```

use serde::{Deserialize, Serialize};

use roomwatch_types::{Bounds, Quantity, Reading, ThresholdSet};

/// Result of comparing one value against its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    /// Value is within the configured bounds.
    Within,
    /// Value is below the lower bound.
    Below,
    /// Value is above the upper bound.
    Above,
}

impl Check {
    /// Classify a value against a pair of optional bounds.
    ///
    /// The lower bound is checked first, so an inverted range reports
    /// [`Check::Below`] for values under `min`.
    #[must_use]
    pub fn classify(value: f64, bounds: Bounds) -> Self {
        if bounds.min.is_some_and(|min| value < min) {
            Check::Below
        } else if bounds.max.is_some_and(|max| value > max) {
            Check::Above
        } else {
            Check::Within
        }
    }

    /// Whether the value is within bounds.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Check::Within)
    }
}

/// Per-quantity verdicts for one reading. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Temperature against `temp_min`/`temp_max`.
    pub temperature: Check,
    /// Humidity against `humidity_min`/`humidity_max`.
    pub humidity: Check,
    /// CO₂ against `co2_max`.
    pub co2: Check,
    /// VOC against `voc_max`.
    pub voc: Check,
    /// Illuminance against `lux_min`.
    pub lux: Check,
}

impl Verdict {
    /// The check result for a quantity.
    #[must_use]
    pub fn check(&self, quantity: Quantity) -> Check {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
            Quantity::Co2 => self.co2,
            Quantity::Voc => self.voc,
            Quantity::Illuminance => self.lux,
        }
    }

    /// Whether a quantity is within its configured bounds.
    #[must_use]
    pub fn in_bounds(&self, quantity: Quantity) -> bool {
        self.check(quantity).is_ok()
    }

    /// Whether every quantity is within bounds.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        Quantity::ALL.iter().all(|q| self.in_bounds(*q))
    }

    /// Quantities that are out of bounds, in dashboard order.
    pub fn violations(&self) -> impl Iterator<Item = (Quantity, Check)> + '_ {
        Quantity::ALL
            .into_iter()
            .map(|q| (q, self.check(q)))
            .filter(|(_, check)| !check.is_ok())
    }
}

/// Evaluate a reading against a threshold set.
#[must_use]
pub fn evaluate(reading: &Reading, thresholds: &ThresholdSet) -> Verdict {
    let check = |q: Quantity| Check::classify(reading.value(q), thresholds.bounds(q));
    Verdict {
        temperature: check(Quantity::Temperature),
        humidity: check(Quantity::Humidity),
        co2: check(Quantity::Co2),
        voc: check(Quantity::Voc),
        lux: check(Quantity::Illuminance),
    }
}

/// Human-readable description of the acceptable range for a quantity.
///
/// ```
/// use roomwatch_core::thresholds::describe_bounds;
/// use roomwatch_types::{Quantity, ThresholdSet};
///
/// let t = ThresholdSet::default();
/// assert_eq!(describe_bounds(Quantity::Temperature, &t), "Norma: 20–24°C");
/// assert_eq!(describe_bounds(Quantity::Co2, &t), "Norma: poniżej 1000 ppm");
/// assert_eq!(describe_bounds(Quantity::Illuminance, &t), "Norma: powyżej 300 lx");
/// ```
#[must_use]
pub fn describe_bounds(quantity: Quantity, thresholds: &ThresholdSet) -> String {
    let unit = quantity.unit();
    match thresholds.bounds(quantity) {
        Bounds {
            min: Some(min),
            max: Some(max),
        } => format!("Norma: {min}–{max}{unit}"),
        Bounds {
            min: None,
            max: Some(max),
        } => format!("Norma: poniżej {max} {unit}"),
        Bounds {
            min: Some(min),
            max: None,
        } => format!("Norma: powyżej {min} {unit}"),
        Bounds {
            min: None,
            max: None,
        } => "Norma: bez ograniczeń".to_string(),
    }
}
