//! Shared data model for the roomwatch environmental monitor.
//!
//! This crate holds the plain data types exchanged between the monitoring
//! core (roomwatch-core) and the host service (roomwatch-service):
//!
//! - Rooms and their identifiers
//! - Measured quantities with their labels and units
//! - Timestamped readings
//! - Per-room threshold sets and settings-form parsing
//!
//! # Example
//!
//! ```
//! use roomwatch_types::{Quantity, ThresholdSet};
//!
//! let thresholds = ThresholdSet::default();
//! let bounds = thresholds.bounds(Quantity::Co2);
//! assert_eq!(bounds.max, Some(1000.0));
//! assert_eq!(bounds.min, None);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{Bounds, Quantity, Reading, Room, RoomId, ThresholdSet};


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing arbitrary form input never panics.
        #[test]
        fn from_fields_never_panics(raw in ".*") {
            let _ = ThresholdSet::from_fields([("temp_min", raw.as_str())]);
        }

        /// A successful partial edit never produces a non-finite bound.
        #[test]
        fn apply_fields_yields_finite(raw in ".*") {
            if let Ok(t) = ThresholdSet::default().apply_fields([("co2_max", raw.as_str())]) {
                prop_assert!(t.check_finite().is_ok());
            }
        }
    }
}
