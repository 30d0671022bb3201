//! Application state shared between the collector and the command loop.
//!
//! The [`Monitor`] sits behind a single async mutex. Every trigger (timer
//! tick, manual refresh, room switch, threshold save) takes that mutex, so
//! all mutations run one after another on one logical path.
//!
//! # Tick events
//!
//! Each completed tick is published on a broadcast channel as a
//! [`TickReport`]. Subscribers that fall behind lose the oldest events;
//! senders never block.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::warn;

use roomwatch_core::{
    Alert, Metric, Monitor, ReadingSource, Result, SimulatedSource, TickReport,
};
use roomwatch_types::{Quantity, Room, RoomId, ThresholdSet};

use crate::config::Config;

/// Buffer size of the tick event channel.
pub const EVENT_BUFFER: usize = 64;

/// Shared application state.
pub struct AppState<S = SimulatedSource> {
    monitor: Mutex<Monitor<S>>,
    /// Configuration the state was built from.
    pub config: Config,
    /// Broadcast channel for completed ticks.
    pub events_tx: broadcast::Sender<TickReport>,
    /// Collector control state.
    pub collector: CollectorState,
}

impl AppState<SimulatedSource> {
    /// Build state from configuration.
    pub fn from_config(config: Config) -> Result<Arc<Self>> {
        let monitor = config.build_monitor()?;
        Ok(Self::new(monitor, config))
    }
}

impl<S: ReadingSource> AppState<S> {
    /// Create new application state around a monitor.
    pub fn new(monitor: Monitor<S>, config: Config) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        Arc::new(Self {
            monitor: Mutex::new(monitor),
            config,
            events_tx,
            collector: CollectorState::new(),
        })
    }

    /// Subscribe to tick events.
    pub fn subscribe(&self) -> broadcast::Receiver<TickReport> {
        self.events_tx.subscribe()
    }

    /// Run one tick for the current room.
    pub async fn refresh(&self) -> Result<TickReport> {
        let mut monitor = self.monitor.lock().await;
        self.tick_locked(&mut monitor)
    }

    /// Switch rooms, then refresh the new room.
    pub async fn select_room(&self, room: &RoomId) -> Result<TickReport> {
        let mut monitor = self.monitor.lock().await;
        monitor.select_room(room, OffsetDateTime::now_utc())?;
        self.tick_locked(&mut monitor)
    }

    /// Apply a threshold edit to the current room, then refresh it.
    ///
    /// Rejected input leaves the previous thresholds in place and runs no
    /// tick. Once the edit is stored it stays stored: a failing follow-up
    /// tick is logged and the saved set is still returned.
    pub async fn update_thresholds(&self, fields: &[(String, String)]) -> Result<ThresholdSet> {
        let mut monitor = self.monitor.lock().await;
        let room = monitor.current_room().id.clone();
        let pairs = fields.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let updated = monitor.edit_thresholds(&room, pairs).inspect_err(|e| {
            warn!("Rejected threshold input for {}: {}", room, e);
        })?;
        if let Err(e) = self.tick_locked(&mut monitor) {
            warn!("Refresh after threshold update failed for {}: {}", room, e);
        }
        Ok(updated)
    }

    /// Everything the dashboard shows for the current room.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let monitor = self.monitor.lock().await;
        let room = monitor.current_room().clone();
        Ok(Snapshot {
            thresholds: *monitor.thresholds(&room.id)?,
            metrics: monitor.current_metrics(&room.id)?,
            rooms: monitor.room_catalog().iter().cloned().collect(),
            alerts: monitor.active_alerts(),
            last_refresh: monitor.last_refresh(),
            room,
        })
    }

    /// History series of one quantity for a room.
    pub async fn history_series(
        &self,
        room: &RoomId,
        quantity: Quantity,
    ) -> Result<Vec<(OffsetDateTime, f64)>> {
        self.monitor.lock().await.history_series(room, quantity)
    }

    /// All rooms in catalog order.
    pub async fn rooms(&self) -> Vec<Room> {
        self.monitor.lock().await.room_catalog().iter().cloned().collect()
    }

    fn tick_locked(&self, monitor: &mut Monitor<S>) -> Result<TickReport> {
        let report = monitor.tick(OffsetDateTime::now_utc())?;
        // No subscribers is fine.
        let _ = self.events_tx.send(report.clone());
        Ok(report)
    }
}

/// Dashboard view of the current room.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// The selected room.
    pub room: Room,
    /// All rooms, for the room selector.
    pub rooms: Vec<Room>,
    /// Thresholds of the selected room.
    pub thresholds: ThresholdSet,
    /// Latest value and verdict per quantity.
    pub metrics: Vec<Metric>,
    /// Alerts, newest first.
    pub alerts: Vec<Alert>,
    /// When the last tick completed.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_refresh: Option<OffsetDateTime>,
}

/// State for tracking and controlling the collector.
pub struct CollectorState {
    running: AtomicBool,
    ticks: AtomicU64,
    failures: AtomicU64,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl CollectorState {
    /// Create a new collector state.
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            ticks: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            stop_tx,
            stop_rx,
        }
    }

    /// Check if the collector is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the collector as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Record the outcome of one timer tick.
    pub fn record(&self, ok: bool) {
        if ok {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Successful timer ticks so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Failed timer ticks so far.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Get a receiver for the stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal the collector to stop.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

impl Default for CollectorState {
    fn default() -> Self {
        Self::new()
    }
}
