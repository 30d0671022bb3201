//! Room catalog.

use roomwatch_types::{Room, RoomId};

use crate::error::{Error, Result};

/// Ordered, immutable list of monitored rooms.
#[derive(Debug, Clone)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    /// Create a catalog from a list of rooms.
    ///
    /// Later entries with an id already present are ignored.
    pub fn new(rooms: impl IntoIterator<Item = Room>) -> Self {
        let mut unique: Vec<Room> = Vec::new();
        for room in rooms {
            if !unique.iter().any(|r| r.id == room.id) {
                unique.push(room);
            }
        }
        Self { rooms: unique }
    }

    /// Look up a room by id.
    pub fn get(&self, id: &RoomId) -> Result<&Room> {
        self.rooms
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::RoomNotFound(id.clone()))
    }

    /// Whether the catalog contains a room.
    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.iter().any(|r| &r.id == id)
    }

    /// Rooms in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Room ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.iter().map(|r| &r.id)
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the catalog has no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomCatalog {
    /// The three lecture rooms monitored out of the box.
    fn default() -> Self {
        Self::new((1..=3).map(default_room))
    }
}

fn default_room(n: u8) -> Room {
    Room {
        id: RoomId::new(format!("sala-10{n}")),
        name: format!("Sala 10{n}"),
        sensors: vec![
            format!("Czujnik temperatury TH-0{n}"),
            format!("Czujnik wilgotności TH-0{n}"),
            format!("Czujnik CO₂ C-0{n}"),
            format!("Czujnik VOC V-0{n}"),
            format!("Czujnik światła L-0{n}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = RoomCatalog::default();
        assert_eq!(catalog.len(), 3);
        let ids: Vec<_> = catalog.ids().map(|id| id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["sala-101", "sala-102", "sala-103"]);

        let room = catalog.get(&RoomId::from("sala-102")).unwrap();
        assert_eq!(room.name, "Sala 102");
        assert_eq!(room.sensors.len(), 5);
        assert_eq!(room.sensors[2], "Czujnik CO₂ C-02");
    }

    #[test]
    fn test_unknown_room() {
        let catalog = RoomCatalog::default();
        let err = catalog.get(&RoomId::from("sala-404")).unwrap_err();
        assert!(matches!(err, Error::RoomNotFound(id) if id.as_str() == "sala-404"));
        assert!(!catalog.contains(&RoomId::from("sala-404")));
    }

    #[test]
    fn test_duplicate_ids_ignored() {
        let room = |name: &str| Room {
            id: RoomId::from("lab"),
            name: name.to_string(),
            sensors: Vec::new(),
        };
        let catalog = RoomCatalog::new([room("First"), room("Second")]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&RoomId::from("lab")).unwrap().name, "First");
    }
}
