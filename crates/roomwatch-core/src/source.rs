//! Reading sources.
//!
//! The [`ReadingSource`] trait is the seam between the monitoring pipeline
//! and wherever measurements come from. [`SimulatedSource`] synthesizes
//! readings from a per-room baseline plus bounded uniform noise; a real
//! sensor integration implements the same trait without touching evaluation,
//! history or alerts.
//!
//! # Noise model
//!
//! | Quantity | Value |
//! |----------|-------|
//! | Temperature | baseline ± 2 °C |
//! | Humidity | baseline ± 10 % |
//! | CO₂ | baseline ± 200 ppm |
//! | VOC | 200–500 ppb |
//! | Illuminance | 350–550 lx |

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use roomwatch_types::{Reading, RoomId};

use crate::error::Result;
use crate::history::HISTORY_POINTS;

/// Spacing between backfilled history points.
pub const BACKFILL_SPACING: Duration = Duration::hours(1);

/// Trait abstracting where readings come from.
///
/// # Example
///
/// ```
/// use roomwatch_core::source::{ReadingSource, SimulatedSource};
/// use roomwatch_types::RoomId;
/// use time::OffsetDateTime;
///
/// let mut source = SimulatedSource::with_seed(7);
/// let room = RoomId::from("sala-101");
/// let reading = source.read(&room, OffsetDateTime::UNIX_EPOCH).unwrap();
/// assert!((20.0..24.0).contains(&reading.temperature));
/// ```
pub trait ReadingSource {
    /// Produce one reading for a room, timestamped `at`.
    fn read(&mut self, room: &RoomId, at: OffsetDateTime) -> Result<Reading>;

    /// Produce the seed history for a room: one reading per hour for the
    /// past week plus one at `now`, oldest first.
    ///
    /// The default implementation calls [`ReadingSource::read`] once per
    /// point.
    fn backfill(&mut self, room: &RoomId, now: OffsetDateTime) -> Result<Vec<Reading>> {
        (0..=HISTORY_POINTS as i32)
            .rev()
            .map(|i| self.read(room, now - BACKFILL_SPACING * i))
            .collect()
    }
}

/// Per-room baseline around which simulated values are generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Centre temperature in °C.
    pub temperature: f64,
    /// Centre relative humidity in %.
    pub humidity: f64,
    /// Centre CO₂ concentration in ppm.
    pub co2: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            temperature: 21.0,
            humidity: 45.0,
            co2: 700.0,
        }
    }
}

impl Baseline {
    /// Built-in baseline for a room id.
    ///
    /// `sala-101` and `sala-102` have their own centres; every other room
    /// uses [`Baseline::default`].
    pub fn for_room(room: &RoomId) -> Self {
        match room.as_str() {
            "sala-101" => Self {
                temperature: 22.0,
                humidity: 50.0,
                co2: 800.0,
            },
            "sala-102" => Self {
                temperature: 23.0,
                humidity: 55.0,
                co2: 950.0,
            },
            _ => Self::default(),
        }
    }
}

/// Synthetic reading source for demos and tests.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    baselines: HashMap<RoomId, Baseline>,
    rng: StdRng,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSource {
    /// Create an entropy-seeded source using built-in baselines.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Create a source with reproducible noise.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            baselines: HashMap::new(),
            rng,
        }
    }

    /// Override the baseline for a room.
    #[must_use]
    pub fn baseline(mut self, room: RoomId, baseline: Baseline) -> Self {
        self.baselines.insert(room, baseline);
        self
    }

    /// Baseline used for a room.
    pub fn baseline_for(&self, room: &RoomId) -> Baseline {
        self.baselines
            .get(room)
            .copied()
            .unwrap_or_else(|| Baseline::for_room(room))
    }
}

impl ReadingSource for SimulatedSource {
    fn read(&mut self, room: &RoomId, at: OffsetDateTime) -> Result<Reading> {
        let base = self.baseline_for(room);
        Ok(Reading {
            timestamp: at,
            temperature: base.temperature + self.rng.random_range(-2.0..2.0),
            humidity: base.humidity + self.rng.random_range(-10.0..10.0),
            co2: base.co2 + self.rng.random_range(-200.0..200.0),
            voc: self.rng.random_range(200.0..500.0),
            lux: self.rng.random_range(350.0..550.0),
        })
    }
}
