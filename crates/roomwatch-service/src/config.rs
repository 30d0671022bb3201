//! Monitor configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use roomwatch_core::{Baseline, Monitor, RoomCatalog, SimulatedSource};
use roomwatch_types::{Room, RoomId, ThresholdSet};

/// Monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tick and startup settings.
    pub monitor: MonitorConfig,
    /// Monitored rooms. An empty list means the built-in rooms.
    pub rooms: Vec<RoomConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            rooms: default_rooms(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or the built-in defaults if no file
    /// exists there.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Tick interval is within bounds (1 s - 1 hour)
    /// - Room ids are non-empty and unique (case-insensitive)
    /// - Room names are non-empty
    /// - `default_room` names a configured room
    /// - Configured thresholds and baselines are finite, with `min <= max`
    ///
    /// # Example
    ///
    /// ```
    /// use roomwatch_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.monitor.validate();

        let rooms = self.room_configs();
        let mut seen_ids = HashSet::new();
        for (i, room) in rooms.iter().enumerate() {
            let prefix = format!("rooms[{}]", i);
            errors.extend(room.validate(&prefix));

            let id_lower = room.id.as_str().to_lowercase();
            if !id_lower.is_empty() && !seen_ids.insert(id_lower) {
                errors.push(ValidationError {
                    field: format!("{}.id", prefix),
                    message: format!("duplicate room id '{}'", room.id),
                });
            }
        }

        if !rooms.iter().any(|r| r.id == self.monitor.default_room) {
            errors.push(ValidationError {
                field: "monitor.default_room".to_string(),
                message: format!(
                    "default room '{}' is not a configured room",
                    self.monitor.default_room
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Rooms to monitor, falling back to the built-in rooms when none are
    /// configured.
    pub fn room_configs(&self) -> Vec<RoomConfig> {
        if self.rooms.is_empty() {
            default_rooms()
        } else {
            self.rooms.clone()
        }
    }

    /// Room catalog built from the configured rooms.
    pub fn catalog(&self) -> RoomCatalog {
        RoomCatalog::new(self.room_configs().into_iter().map(|r| r.room()))
    }

    /// Simulated reading source with the configured seed and baselines.
    pub fn source(&self) -> SimulatedSource {
        let source = match self.monitor.seed {
            Some(seed) => SimulatedSource::with_seed(seed),
            None => SimulatedSource::new(),
        };
        self.room_configs()
            .into_iter()
            .fold(source, |source, room| match room.baseline {
                Some(baseline) => source.baseline(room.id, baseline),
                None => source,
            })
    }

    /// Build a monitor starting on `default_room`, with configured
    /// thresholds applied.
    pub fn build_monitor(&self) -> roomwatch_core::Result<Monitor<SimulatedSource>> {
        let mut monitor =
            Monitor::with_room(self.catalog(), self.source(), &self.monitor.default_room)?;
        for room in self.room_configs() {
            if let Some(thresholds) = room.thresholds {
                monitor.update_thresholds(&room.id, thresholds)?;
            }
        }
        Ok(monitor)
    }
}

/// Tick and startup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between ticks.
    pub tick_interval: u64,
    /// Room selected at startup.
    pub default_room: RoomId,
    /// Seed for reproducible simulated readings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Minimum tick interval in seconds.
pub const MIN_TICK_INTERVAL: u64 = 1;
/// Maximum tick interval in seconds (1 hour).
pub const MAX_TICK_INTERVAL: u64 = 3600;

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: 10,
            default_room: RoomId::from("sala-101"),
            seed: None,
        }
    }
}

impl MonitorConfig {
    /// Validate monitor settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.tick_interval < MIN_TICK_INTERVAL {
            errors.push(ValidationError {
                field: "monitor.tick_interval".to_string(),
                message: format!(
                    "tick interval {} is too short (minimum {} second)",
                    self.tick_interval, MIN_TICK_INTERVAL
                ),
            });
        } else if self.tick_interval > MAX_TICK_INTERVAL {
            errors.push(ValidationError {
                field: "monitor.tick_interval".to_string(),
                message: format!(
                    "tick interval {} is too long (maximum {} seconds / 1 hour)",
                    self.tick_interval, MAX_TICK_INTERVAL
                ),
            });
        }

        errors
    }
}

/// Configuration for one monitored room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Room identifier.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Sensor labels.
    #[serde(default)]
    pub sensors: Vec<String>,
    /// Centre values for the simulated source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Baseline>,
    /// Initial thresholds; defaults apply when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdSet>,
}

impl RoomConfig {
    /// The catalog entry for this room.
    pub fn room(&self) -> Room {
        Room {
            id: self.id.clone(),
            name: self.name.clone(),
            sensors: self.sensors.clone(),
        }
    }

    /// Validate room configuration.
    pub fn validate(&self, prefix: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.id.as_str().trim().is_empty() {
            errors.push(ValidationError {
                field: format!("{}.id", prefix),
                message: "room id cannot be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            errors.push(ValidationError {
                field: format!("{}.name", prefix),
                message: "room name cannot be empty".to_string(),
            });
        }

        if let Some(thresholds) = &self.thresholds {
            if let Err(e) = thresholds.check_finite() {
                errors.push(ValidationError {
                    field: format!("{}.thresholds", prefix),
                    message: e.to_string(),
                });
            }
            for range in thresholds.inverted_ranges() {
                errors.push(ValidationError {
                    field: format!("{}.thresholds.{}", prefix, range),
                    message: format!("{range}_min is greater than {range}_max"),
                });
            }
        }

        if let Some(baseline) = &self.baseline
            && ![baseline.temperature, baseline.humidity, baseline.co2]
                .iter()
                .all(|v| v.is_finite())
        {
            errors.push(ValidationError {
                field: format!("{}.baseline", prefix),
                message: "baseline values must be finite numbers".to_string(),
            });
        }

        errors
    }
}

/// The three rooms monitored out of the box.
fn default_rooms() -> Vec<RoomConfig> {
    RoomCatalog::default()
        .iter()
        .map(|room| RoomConfig {
            id: room.id.clone(),
            name: room.name.clone(),
            sensors: room.sensors.clone(),
            baseline: Some(Baseline::for_room(&room.id)),
            thresholds: None,
        })
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `monitor.tick_interval` or `rooms[0].id`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roomwatch")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, name: &str) -> RoomConfig {
        RoomConfig {
            id: RoomId::from(id),
            name: name.to_string(),
            sensors: Vec::new(),
            baseline: None,
            thresholds: None,
        }
    }

    fn validation_fields(config: &Config) -> Vec<String> {
        match config.validate() {
            Err(ConfigError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.monitor.tick_interval, 10);
        assert_eq!(config.monitor.default_room.as_str(), "sala-101");
        assert_eq!(config.monitor.seed, None);
        assert_eq!(config.rooms.len(), 3);
        assert_eq!(config.rooms[1].baseline.unwrap().co2, 950.0);
    }

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_room_config_minimal() {
        let toml = r#"
            id = "lab"
            name = "Laboratorium"
        "#;
        let config: RoomConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.id.as_str(), "lab");
        assert!(config.sensors.is_empty());
        assert!(config.baseline.is_none());
        assert!(config.thresholds.is_none());
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [monitor]
            tick_interval = 5
            default_room = "lab"
            seed = 42

            [[rooms]]
            id = "lab"
            name = "Laboratorium"
            sensors = ["Czujnik CO₂ C-09"]

            [rooms.baseline]
            temperature = 19.0
            humidity = 35.0
            co2 = 600.0

            [rooms.thresholds]
            temp_min = 18.0
            temp_max = 22.0
            humidity_min = 30.0
            humidity_max = 50.0
            co2_max = 800.0
            voc_max = 400.0
            lux_min = 500.0
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.monitor.tick_interval, 5);
        assert_eq!(config.monitor.seed, Some(42));
        assert_eq!(config.rooms.len(), 1);
        assert_eq!(config.rooms[0].baseline.unwrap().temperature, 19.0);
        assert_eq!(config.rooms[0].thresholds.unwrap().lux_min, 500.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[monitor]\nseed = 7\n").unwrap();
        assert_eq!(config.monitor.tick_interval, 10);
        assert_eq!(config.rooms.len(), 3);
    }

    #[test]
    fn test_empty_rooms_fall_back_to_defaults() {
        let config: Config = toml::from_str("rooms = []\n").unwrap();
        assert!(config.rooms.is_empty());
        assert_eq!(config.room_configs().len(), 3);
        assert_eq!(config.catalog().len(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.monitor.tick_interval = 30;
        config.monitor.seed = Some(9);
        config.rooms[0].thresholds = Some(ThresholdSet {
            co2_max: 1200.0,
            ..ThresholdSet::default()
        });

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.monitor.tick_interval, 30);
        assert_eq!(loaded.monitor.seed, Some(9));
        assert_eq!(loaded.rooms.len(), 3);
        assert_eq!(loaded.rooms[0].thresholds.unwrap().co2_max, 1200.0);
        assert_eq!(loaded.rooms[2].name, "Sala 103");
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = Config::load_or_default(&config_path).unwrap();
        assert_eq!(config.monitor.tick_interval, 10);
        assert_eq!(config.rooms.len(), 3);

        std::fs::write(&config_path, "[monitor]\ntick_interval = 45\n").unwrap();
        let config = Config::load_or_default(&config_path).unwrap();
        assert_eq!(config.monitor.tick_interval, 45);

        std::fs::write(&config_path, "not { toml").unwrap();
        let result = Config::load_or_default(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_validated_rejects_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[monitor]\ntick_interval = 0\n").unwrap();

        let result = Config::load_validated(&config_path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("roomwatch/config.toml"));
    }

    #[test]
    fn test_tick_interval_validation() {
        let mut config = Config::default();
        config.monitor.tick_interval = 0;
        assert_eq!(validation_fields(&config), vec!["monitor.tick_interval"]);

        config.monitor.tick_interval = 3601;
        assert_eq!(validation_fields(&config), vec!["monitor.tick_interval"]);

        config.monitor.tick_interval = 3600;
        config.validate().unwrap();
    }

    #[test]
    fn test_room_validation() {
        let config = Config {
            monitor: MonitorConfig {
                default_room: RoomId::from("a"),
                ..MonitorConfig::default()
            },
            rooms: vec![room("a", "A"), room("", ""), room("A", "Other")],
        };
        assert_eq!(
            validation_fields(&config),
            vec!["rooms[1].id", "rooms[1].name", "rooms[2].id"]
        );
    }

    #[test]
    fn test_unknown_default_room() {
        let mut config = Config::default();
        config.monitor.default_room = RoomId::from("aula");
        assert_eq!(validation_fields(&config), vec!["monitor.default_room"]);
    }

    #[test]
    fn test_threshold_validation() {
        let mut config = Config::default();
        config.rooms[0].thresholds = Some(ThresholdSet {
            temp_min: 25.0,
            temp_max: 20.0,
            humidity_min: 70.0,
            humidity_max: 30.0,
            ..ThresholdSet::default()
        });
        config.rooms[1].thresholds = Some(ThresholdSet {
            co2_max: f64::INFINITY,
            ..ThresholdSet::default()
        });
        assert_eq!(
            validation_fields(&config),
            vec![
                "rooms[0].thresholds.temp",
                "rooms[0].thresholds.humidity",
                "rooms[1].thresholds"
            ]
        );
    }

    #[test]
    fn test_build_monitor_applies_config() {
        let mut config = Config::default();
        config.monitor.default_room = RoomId::from("sala-103");
        config.monitor.seed = Some(1);
        config.rooms[2].thresholds = Some(ThresholdSet {
            lux_min: 100.0,
            ..ThresholdSet::default()
        });

        let monitor = config.build_monitor().unwrap();
        assert_eq!(monitor.current_room().id.as_str(), "sala-103");
        assert_eq!(
            monitor.thresholds(&RoomId::from("sala-103")).unwrap().lux_min,
            100.0
        );
        assert_eq!(
            monitor.thresholds(&RoomId::from("sala-101")).unwrap(),
            &ThresholdSet::default()
        );
    }

    #[test]
    fn test_build_monitor_unknown_default_room() {
        let mut config = Config::default();
        config.monitor.default_room = RoomId::from("aula");
        assert!(matches!(
            config.build_monitor(),
            Err(roomwatch_core::Error::RoomNotFound(_))
        ));
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "rooms[0].id".to_string(),
            message: "room id cannot be empty".to_string(),
        };
        assert_eq!(error.to_string(), "rooms[0].id: room id cannot be empty");
    }

    #[test]
    fn test_config_validation_error_display() {
        let error = ConfigError::Validation(vec![
            ValidationError {
                field: "monitor.tick_interval".to_string(),
                message: "too short".to_string(),
            },
            ValidationError {
                field: "monitor.default_room".to_string(),
                message: "unknown".to_string(),
            },
        ]);
        let display = error.to_string();
        assert!(display.contains("Configuration validation failed"));
        assert!(display.contains("  - monitor.tick_interval: too short"));
        assert!(display.contains("  - monitor.default_room: unknown"));
    }
}
