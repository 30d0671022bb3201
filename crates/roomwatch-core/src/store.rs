//! Per-room threshold storage.

use std::collections::HashMap;

use tracing::info;

use roomwatch_types::{RoomId, ThresholdSet};

use crate::error::{Error, Result};

/// Holds exactly one [`ThresholdSet`] for every known room.
///
/// Sets are replaced wholesale. The store rejects non-finite bounds but does
/// not check `min <= max`; that is left to the caller.
#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    sets: HashMap<RoomId, ThresholdSet>,
}

impl ThresholdStore {
    /// Create a store with the default set for every room.
    pub fn new<'a>(rooms: impl IntoIterator<Item = &'a RoomId>) -> Self {
        Self {
            sets: rooms
                .into_iter()
                .map(|id| (id.clone(), ThresholdSet::default()))
                .collect(),
        }
    }

    /// Threshold set for a room.
    pub fn get(&self, room: &RoomId) -> Result<&ThresholdSet> {
        self.sets
            .get(room)
            .ok_or_else(|| Error::RoomNotFound(room.clone()))
    }

    /// Replace the threshold set for a room, returning the previous set.
    ///
    /// On error the previous set is kept.
    pub fn set(&mut self, room: &RoomId, thresholds: ThresholdSet) -> Result<ThresholdSet> {
        thresholds.check_finite()?;
        let slot = self
            .sets
            .get_mut(room)
            .ok_or_else(|| Error::RoomNotFound(room.clone()))?;
        let previous = std::mem::replace(slot, thresholds);
        info!("Updated thresholds for {}", room);
        Ok(previous)
    }
}
