//! Background tick collector and terminal dashboard for room monitoring.
//!
//! This crate hosts the monitoring pipeline from `roomwatch-core`:
//! - Loads rooms, baselines and thresholds from a TOML file
//! - Ticks the current room on a fixed interval (10 s by default)
//! - Serializes every trigger through one shared [`AppState`]
//! - Renders the dashboard as text, JSON or CSV
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/roomwatch/config.toml`:
//!
//! ```toml
//! [monitor]
//! tick_interval = 10
//! default_room = "sala-101"
//!
//! [[rooms]]
//! id = "sala-101"
//! name = "Sala 101"
//! sensors = ["Czujnik CO₂ C-01"]
//!
//! [rooms.thresholds]
//! temp_min = 20.0
//! temp_max = 24.0
//! humidity_min = 40.0
//! humidity_max = 60.0
//! co2_max = 1000.0
//! voc_max = 500.0
//! lux_min = 300.0
//! ```

pub mod cli;
pub mod collector;
pub mod config;
pub mod format;
pub mod interactive;
pub mod state;

pub use collector::Collector;
pub use config::{Config, ConfigError, MonitorConfig, RoomConfig, ValidationError};
pub use state::{AppState, Snapshot};
