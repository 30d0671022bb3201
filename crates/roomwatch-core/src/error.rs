//! Error types for roomwatch-core.
//!
//! The monitoring pipeline has no I/O of its own, so the error surface is
//! small:
//!
//! | Error | Cause | Effect on state |
//! |-------|-------|-----------------|
//! | [`Error::RoomNotFound`] | Trigger or query named a room outside the catalog | None |
//! | [`Error::InvalidThreshold`] | Settings input missing a field or not a finite number | Previous threshold set kept |
//! | [`Error::Source`] | The reading source failed to produce a reading | Tick skipped, nothing recorded |
//! | [`Error::EmptyCatalog`] | A monitor was built over a catalog with no rooms | Monitor not created |
//!
//! Apart from `EmptyCatalog`, none of these are fatal. A host that drives ticks from a timer should log
//! the error at the tick boundary and keep the timer running.

use thiserror::Error;

use roomwatch_types::{ParseError, RoomId};

/// Errors that can occur in the monitoring pipeline.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The room id is not part of the catalog.
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Threshold input was rejected; the stored set is unchanged.
    #[error("Invalid threshold input: {0}")]
    InvalidThreshold(#[from] ParseError),

    /// The reading source could not produce a reading.
    #[error("Reading source failed for {room}: {message}")]
    Source { room: RoomId, message: String },

    /// A monitor needs at least one room.
    #[error("Room catalog is empty")]
    EmptyCatalog,
}

/// Result type alias using roomwatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
