//! Core types for room environment data.

use core::fmt;
use std::borrow::Borrow;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ParseError, ParseResult};

/// Identifier of a monitored room (e.g. `sala-101`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoomId(String);

impl RoomId {
    /// Create a room identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RoomId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A monitored room and the sensors installed in it.
///
/// Rooms are immutable once the catalog has been loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Room {
    /// Stable identifier used by every trigger and query.
    pub id: RoomId,
    /// Display name used in alert messages (e.g. "Sala 101").
    pub name: String,
    /// Human-readable sensor labels.
    pub sensors: Vec<String>,
}

/// A measured environmental quantity.
///
/// # Display vs Serialization
///
/// `Display` returns the dashboard label ("Temperatura", "CO₂", ...), while
/// serde uses the lowercase key (`temperature`, `co2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Quantity {
    /// Air temperature in °C.
    Temperature,
    /// Relative humidity in %.
    Humidity,
    /// Carbon dioxide concentration in ppm.
    Co2,
    /// Volatile organic compounds in ppb.
    Voc,
    /// Illuminance in lx.
    #[cfg_attr(feature = "serde", serde(rename = "lux"))]
    Illuminance,
}

impl Quantity {
    /// All quantities in dashboard order.
    pub const ALL: [Quantity; 5] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Co2,
        Quantity::Voc,
        Quantity::Illuminance,
    ];

    /// Dashboard label for the quantity.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Quantity::Temperature => "Temperatura",
            Quantity::Humidity => "Wilgotność",
            Quantity::Co2 => "CO₂",
            Quantity::Voc => "VOC",
            Quantity::Illuminance => "Oświetlenie",
        }
    }

    /// Unit symbol for the quantity.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::Temperature => "°C",
            Quantity::Humidity => "%",
            Quantity::Co2 => "ppm",
            Quantity::Voc => "ppb",
            Quantity::Illuminance => "lx",
        }
    }

    /// Machine key, matching the serde representation.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
            Quantity::Co2 => "co2",
            Quantity::Voc => "voc",
            Quantity::Illuminance => "lux",
        }
    }

    /// Whether values of this quantity are shown with one decimal place.
    ///
    /// Concentrations and illuminance are shown as rounded integers.
    #[must_use]
    pub fn is_fractional(&self) -> bool {
        matches!(self, Quantity::Temperature | Quantity::Humidity)
    }

    /// Round a value to its display precision, with ties away from zero.
    ///
    /// ```
    /// use roomwatch_types::Quantity;
    ///
    /// assert_eq!(Quantity::Temperature.round(24.25), 24.3);
    /// assert_eq!(Quantity::Co2.round(1200.5), 1201.0);
    /// ```
    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        if self.is_fractional() {
            (value * 10.0).round() / 10.0
        } else {
            value.round()
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quantity {
    type Err = ParseError;

    /// Parse a quantity from its key or a common alias.
    ///
    /// ```
    /// use roomwatch_types::Quantity;
    ///
    /// assert_eq!("temp".parse::<Quantity>(), Ok(Quantity::Temperature));
    /// assert_eq!("CO2".parse::<Quantity>(), Ok(Quantity::Co2));
    /// assert_eq!("light".parse::<Quantity>(), Ok(Quantity::Illuminance));
    /// assert!("pressure".parse::<Quantity>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" | "temp" => Ok(Quantity::Temperature),
            "humidity" => Ok(Quantity::Humidity),
            "co2" | "co₂" => Ok(Quantity::Co2),
            "voc" => Ok(Quantity::Voc),
            "lux" | "illuminance" | "light" => Ok(Quantity::Illuminance),
            other => Err(ParseError::UnknownQuantity(other.to_string())),
        }
    }
}

/// One timestamped set of measurements for a room.
///
/// Readings are immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the measurement was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// CO₂ concentration in ppm.
    pub co2: f64,
    /// VOC concentration in ppb.
    pub voc: f64,
    /// Illuminance in lx.
    pub lux: f64,
}

impl Reading {
    /// Get the value of a single quantity.
    #[must_use]
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
            Quantity::Co2 => self.co2,
            Quantity::Voc => self.voc,
            Quantity::Illuminance => self.lux,
        }
    }
}

/// Acceptable range for one quantity.
///
/// A missing side means the quantity is unbounded in that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lowest acceptable value, if bounded below.
    pub min: Option<f64>,
    /// Highest acceptable value, if bounded above.
    pub max: Option<f64>,
}

/// Per-room acceptable bounds for each measured quantity.
///
/// Temperature and humidity are two-sided, CO₂ and VOC have an upper bound
/// only, and illuminance has a lower bound only.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdSet {
    #[cfg_attr(feature = "serde", serde(alias = "tempMin"))]
    pub temp_min: f64,
    #[cfg_attr(feature = "serde", serde(alias = "tempMax"))]
    pub temp_max: f64,
    #[cfg_attr(feature = "serde", serde(alias = "humidityMin"))]
    pub humidity_min: f64,
    #[cfg_attr(feature = "serde", serde(alias = "humidityMax"))]
    pub humidity_max: f64,
    #[cfg_attr(feature = "serde", serde(alias = "co2Max"))]
    pub co2_max: f64,
    #[cfg_attr(feature = "serde", serde(alias = "vocMax"))]
    pub voc_max: f64,
    #[cfg_attr(feature = "serde", serde(alias = "luxMin"))]
    pub lux_min: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            temp_min: 20.0,
            temp_max: 24.0,
            humidity_min: 40.0,
            humidity_max: 60.0,
            co2_max: 1000.0,
            voc_max: 500.0,
            lux_min: 300.0,
        }
    }
}

impl ThresholdSet {
    /// Names of every field, in settings-form order.
    pub const FIELDS: [&'static str; 7] = [
        "temp_min",
        "temp_max",
        "humidity_min",
        "humidity_max",
        "co2_max",
        "voc_max",
        "lux_min",
    ];

    /// Bounds that apply to a quantity.
    #[must_use]
    pub fn bounds(&self, quantity: Quantity) -> Bounds {
        match quantity {
            Quantity::Temperature => Bounds {
                min: Some(self.temp_min),
                max: Some(self.temp_max),
            },
            Quantity::Humidity => Bounds {
                min: Some(self.humidity_min),
                max: Some(self.humidity_max),
            },
            Quantity::Co2 => Bounds {
                min: None,
                max: Some(self.co2_max),
            },
            Quantity::Voc => Bounds {
                min: None,
                max: Some(self.voc_max),
            },
            Quantity::Illuminance => Bounds {
                min: Some(self.lux_min),
                max: None,
            },
        }
    }

    /// Parse a complete threshold set from settings-form fields.
    ///
    /// Every field in [`ThresholdSet::FIELDS`] must be present (camelCase
    /// names such as `tempMin` are accepted too) and must parse to a finite
    /// number.
    ///
    /// ```
    /// use roomwatch_types::ThresholdSet;
    ///
    /// let fields = [
    ///     ("tempMin", "19"), ("tempMax", "25"),
    ///     ("humidityMin", "35"), ("humidityMax", "65"),
    ///     ("co2Max", "1200"), ("vocMax", "400"), ("luxMin", "250"),
    /// ];
    /// let set = ThresholdSet::from_fields(fields).unwrap();
    /// assert_eq!(set.co2_max, 1200.0);
    ///
    /// let bad = [("tempMin", "abc")];
    /// assert!(ThresholdSet::from_fields(bad).is_err());
    /// ```
    pub fn from_fields<'a, I>(fields: I) -> ParseResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values: [Option<f64>; 7] = [None; 7];
        for (name, raw) in fields {
            let idx = field_index(name)?;
            values[idx] = Some(parse_number(Self::FIELDS[idx], raw)?);
        }

        let mut set = Self::default();
        for (idx, value) in values.into_iter().enumerate() {
            let value = value.ok_or(ParseError::MissingField(Self::FIELDS[idx]))?;
            set.set_by_index(idx, value);
        }
        Ok(set)
    }

    /// Apply a partial edit on top of this set.
    ///
    /// Fields not named keep their current value. If any named field is
    /// unknown or not a finite number the whole edit is rejected.
    pub fn apply_fields<'a, I>(&self, fields: I) -> ParseResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut updated = *self;
        for (name, raw) in fields {
            let idx = field_index(name)?;
            updated.set_by_index(idx, parse_number(Self::FIELDS[idx], raw)?);
        }
        Ok(updated)
    }

    /// Check that every bound is a finite number.
    pub fn check_finite(&self) -> ParseResult<()> {
        for (idx, name) in Self::FIELDS.iter().enumerate() {
            let value = self.get_by_index(idx);
            if !value.is_finite() {
                return Err(ParseError::InvalidNumber {
                    field: (*name).to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Fields whose minimum exceeds their maximum.
    #[must_use]
    pub fn inverted_ranges(&self) -> Vec<&'static str> {
        let mut inverted = Vec::new();
        if self.temp_min > self.temp_max {
            inverted.push("temp");
        }
        if self.humidity_min > self.humidity_max {
            inverted.push("humidity");
        }
        inverted
    }

    fn get_by_index(&self, idx: usize) -> f64 {
        match idx {
            0 => self.temp_min,
            1 => self.temp_max,
            2 => self.humidity_min,
            3 => self.humidity_max,
            4 => self.co2_max,
            5 => self.voc_max,
            _ => self.lux_min,
        }
    }

    fn set_by_index(&mut self, idx: usize, value: f64) {
        match idx {
            0 => self.temp_min = value,
            1 => self.temp_max = value,
            2 => self.humidity_min = value,
            3 => self.humidity_max = value,
            4 => self.co2_max = value,
            5 => self.voc_max = value,
            _ => self.lux_min = value,
        }
    }
}

/// Resolve a field name (snake_case or camelCase) to its index in `FIELDS`.
fn field_index(name: &str) -> ParseResult<usize> {
    let normalized: String = name
        .trim()
        .chars()
        .flat_map(|c| {
            if c.is_ascii_uppercase() {
                vec!['_', c.to_ascii_lowercase()]
            } else {
                vec![c]
            }
        })
        .collect();
    ThresholdSet::FIELDS
        .iter()
        .position(|f| *f == normalized)
        .ok_or_else(|| ParseError::UnknownField(name.to_string()))
}

fn parse_number(field: &str, raw: &str) -> ParseResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}
