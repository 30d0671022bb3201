//! Monitoring pipeline for room environmental sensors.
//!
//! This crate turns periodic sensor readings into dashboard state: a verdict
//! per quantity, a rolling week of history per room, and a deduplicated log
//! of threshold violations.
//!
//! # Features
//!
//! - **Evaluation**: Classify temperature, humidity, CO₂, VOC and illuminance
//!   against per-room bounds
//! - **History**: Fixed-capacity FIFO of 169 readings per room, seeded on
//!   first visit
//! - **Alerts**: Newest-first log capped at 20 entries, suppressing a repeated
//!   message for five minutes
//! - **Threshold store**: One editable set per room, rejecting non-numeric
//!   input without losing the previous set
//! - **Reading sources**: A trait seam with a seeded simulator
//!
//! # Quick Start
//!
//! ```
//! use roomwatch_core::{Monitor, RoomCatalog, SimulatedSource};
//! use time::OffsetDateTime;
//!
//! let mut monitor = Monitor::new(RoomCatalog::default(), SimulatedSource::with_seed(3))?;
//! let report = monitor.tick(OffsetDateTime::now_utc())?;
//!
//! for (quantity, check) in report.verdict.violations() {
//!     println!("{quantity}: {check:?}");
//! }
//! for alert in monitor.active_alerts() {
//!     println!("{}", alert.message);
//! }
//! # Ok::<(), roomwatch_core::Error>(())
//! ```

pub mod alerts;
pub mod catalog;
pub mod error;
pub mod history;
pub mod monitor;
pub mod source;
pub mod store;
pub mod thresholds;

pub use alerts::{ALERT_CAPACITY, Alert, AlertLog, DEDUP_WINDOW, alert_message};
pub use catalog::RoomCatalog;
pub use error::{Error, Result};
pub use history::{HISTORY_CAPACITY, HISTORY_POINTS, HistoryBuffer};
pub use monitor::{Metric, Monitor, TickReport};
pub use source::{BACKFILL_SPACING, Baseline, ReadingSource, SimulatedSource};
pub use store::ThresholdStore;
pub use thresholds::{Check, Verdict, describe_bounds, evaluate};

// Re-export from roomwatch-types
pub use roomwatch_types::{Bounds, ParseError, Quantity, Reading, Room, RoomId, ThresholdSet};
