//! The monitoring controller.
//!
//! [`Monitor`] owns all application state: the room catalog, the threshold
//! store, one history buffer per visited room, the alert log and the current
//! room selector. Every trigger takes `&mut self` and an explicit `now`, so
//! a host only has to serialize calls (a single owner or one mutex) to get
//! the single-writer behavior the pipeline relies on.
//!
//! # Tick pipeline
//!
//! ```text
//! ReadingSource -> evaluate (ThresholdStore) -> AlertLog::record_all
//!                                            -> HistoryBuffer::push
//! ```
//!
//! # Example
//!
//! ```
//! use roomwatch_core::{Monitor, RoomCatalog, SimulatedSource};
//! use roomwatch_types::{Quantity, RoomId};
//! use time::OffsetDateTime;
//!
//! let mut monitor = Monitor::new(RoomCatalog::default(), SimulatedSource::with_seed(1))?;
//! let now = OffsetDateTime::now_utc();
//!
//! monitor.select_room(&RoomId::from("sala-102"), now)?;
//! let report = monitor.tick(now)?;
//! assert_eq!(report.room.as_str(), "sala-102");
//!
//! let series = monitor.history_series(&RoomId::from("sala-102"), Quantity::Co2)?;
//! assert_eq!(series.len(), 169);
//! # Ok::<(), roomwatch_core::Error>(())
//! ```

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use roomwatch_types::{Quantity, Reading, Room, RoomId, ThresholdSet};

use crate::alerts::{Alert, AlertLog};
use crate::catalog::RoomCatalog;
use crate::error::{Error, Result};
use crate::history::HistoryBuffer;
use crate::source::ReadingSource;
use crate::store::ThresholdStore;
use crate::thresholds::{Check, Verdict, describe_bounds, evaluate};

/// Outcome of one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// Room the tick ran for.
    pub room: RoomId,
    /// The reading that was produced and appended.
    pub reading: Reading,
    /// Verdict of the reading against the room's thresholds.
    pub verdict: Verdict,
    /// Alerts added by this tick (duplicates excluded).
    pub new_alerts: Vec<Alert>,
}

/// Current value and status of one quantity, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Measured quantity.
    pub quantity: Quantity,
    /// Latest value, in the quantity's unit.
    pub value: f64,
    /// Whether the value is within the room's thresholds.
    pub in_bounds: bool,
    /// Which side of the range the value falls on.
    pub check: Check,
    /// Description of the acceptable range, e.g. `Norma: 20–24°C`.
    pub threshold: String,
}

/// Owner of all monitoring state.
#[derive(Debug)]
pub struct Monitor<S> {
    catalog: RoomCatalog,
    thresholds: ThresholdStore,
    histories: HashMap<RoomId, HistoryBuffer>,
    alerts: AlertLog,
    current: Room,
    source: S,
    last_refresh: Option<OffsetDateTime>,
}

impl<S: ReadingSource> Monitor<S> {
    /// Create a monitor whose current room is the first catalog entry.
    ///
    /// No history exists until a room is selected or ticked.
    pub fn new(catalog: RoomCatalog, source: S) -> Result<Self> {
        let current = catalog.iter().next().cloned().ok_or(Error::EmptyCatalog)?;
        let thresholds = ThresholdStore::new(catalog.ids());
        Ok(Self {
            catalog,
            thresholds,
            histories: HashMap::new(),
            alerts: AlertLog::new(),
            current,
            source,
            last_refresh: None,
        })
    }

    /// Like [`Monitor::new`], starting on a given room.
    pub fn with_room(catalog: RoomCatalog, source: S, room: &RoomId) -> Result<Self> {
        let current = catalog.get(room)?.clone();
        let mut monitor = Self::new(catalog, source)?;
        monitor.current = current;
        Ok(monitor)
    }

    // --- Triggers ---

    /// Switch the current room, seeding its history on first visit.
    ///
    /// Other rooms keep their histories and thresholds.
    pub fn select_room(&mut self, room: &RoomId, now: OffsetDateTime) -> Result<()> {
        let target = self.catalog.get(room)?.clone();
        self.ensure_history(room, now)?;
        if self.current.id != target.id {
            info!("Switched room {} -> {}", self.current.id, target.id);
            self.current = target;
        }
        Ok(())
    }

    /// Run the pipeline once for the current room.
    ///
    /// On error nothing is recorded and the state is unchanged apart from a
    /// possible lazy seeding of the room's history.
    pub fn tick(&mut self, now: OffsetDateTime) -> Result<TickReport> {
        let room_id = self.current.id.clone();
        self.ensure_history(&room_id, now)?;

        let reading = self.source.read(&room_id, now)?;
        let thresholds = self.thresholds.get(&room_id)?;

        let verdict = evaluate(&reading, thresholds);
        let new_alerts = self
            .alerts
            .record_all(&self.current.name, &reading, thresholds, now);

        if let Some(history) = self.histories.get_mut(&room_id) {
            history.push(reading);
        }
        self.last_refresh = Some(now);

        debug!(
            "Tick for {}: {} violation(s), {} new alert(s)",
            room_id,
            verdict.violations().count(),
            new_alerts.len()
        );

        Ok(TickReport {
            room: room_id,
            reading,
            verdict,
            new_alerts,
        })
    }

    /// Replace a room's threshold set. Returns the previous set.
    pub fn update_thresholds(
        &mut self,
        room: &RoomId,
        thresholds: ThresholdSet,
    ) -> Result<ThresholdSet> {
        self.thresholds.set(room, thresholds)
    }

    /// Replace a room's threshold set from settings-form fields.
    ///
    /// All seven fields are required. Any missing or non-numeric field
    /// rejects the update and leaves the previous set in place.
    pub fn update_thresholds_from_fields<'a, I>(
        &mut self,
        room: &RoomId,
        fields: I,
    ) -> Result<ThresholdSet>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.catalog.get(room)?;
        let parsed = ThresholdSet::from_fields(fields)?;
        self.update_thresholds(room, parsed)
    }

    /// Apply a partial threshold edit to a room.
    ///
    /// Returns the resulting set. The edit is all-or-nothing.
    pub fn edit_thresholds<'a, I>(&mut self, room: &RoomId, fields: I) -> Result<ThresholdSet>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let edited = self.thresholds.get(room)?.apply_fields(fields)?;
        self.update_thresholds(room, edited)?;
        Ok(edited)
    }

    // --- Queries ---

    /// Current value, verdict and range description of every quantity.
    ///
    /// Uses the room's latest reading and its thresholds as they are now.
    /// Returns an empty list if the room has no readings yet.
    pub fn current_metrics(&self, room: &RoomId) -> Result<Vec<Metric>> {
        let thresholds = self.thresholds.get(room)?;
        let Some(reading) = self.histories.get(room).and_then(|h| h.latest()) else {
            return Ok(Vec::new());
        };
        let verdict = evaluate(reading, thresholds);
        Ok(Quantity::ALL
            .into_iter()
            .map(|q| Metric {
                quantity: q,
                value: reading.value(q),
                in_bounds: verdict.in_bounds(q),
                check: verdict.check(q),
                threshold: describe_bounds(q, thresholds),
            })
            .collect())
    }

    /// `(timestamp, value)` series of one quantity for a room, oldest first.
    pub fn history_series(
        &self,
        room: &RoomId,
        quantity: Quantity,
    ) -> Result<Vec<(OffsetDateTime, f64)>> {
        Ok(self
            .history(room)?
            .map(|h| h.series(quantity))
            .unwrap_or_default())
    }

    /// History buffer of a room, if it has been created.
    pub fn history(&self, room: &RoomId) -> Result<Option<&HistoryBuffer>> {
        self.catalog.get(room)?;
        Ok(self.histories.get(room))
    }

    /// Alerts, newest first.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.to_vec()
    }

    /// The alert log.
    pub fn alert_log(&self) -> &AlertLog {
        &self.alerts
    }

    /// All rooms in catalog order.
    pub fn room_catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    /// Threshold set for a room.
    pub fn thresholds(&self, room: &RoomId) -> Result<&ThresholdSet> {
        self.thresholds.get(room)
    }

    /// The currently selected room.
    pub fn current_room(&self) -> &Room {
        &self.current
    }

    /// When the last tick completed.
    pub fn last_refresh(&self) -> Option<OffsetDateTime> {
        self.last_refresh
    }

    fn ensure_history(&mut self, room: &RoomId, now: OffsetDateTime) -> Result<()> {
        if self.histories.contains_key(room) {
            return Ok(());
        }
        let seed = self.source.backfill(room, now)?;
        debug!("Seeded {} readings for {}", seed.len(), room);
        self.histories
            .insert(room.clone(), HistoryBuffer::seeded(seed));
        Ok(())
    }
}
