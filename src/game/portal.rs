//! # Portal Module
//!
//! Named links from a cell in one room to a named portal in another.

use crate::Position;
use serde::{Deserialize, Serialize};

/// An immutable link from a room cell to a portal in a destination room.
///
/// The destination is a (room, portal name) pair rather than coordinates,
/// so moving a portal in one room never breaks the rooms that lead to it.
///
/// # Examples
///
/// ```
/// use wayfarer::{Portal, Position};
///
/// let door = Portal::new("front_door", Position::new(4, 9), "street", "house_door");
/// assert_eq!(door.position, Position::new(4, 9));
/// assert!(door.leads_to("street"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    /// Name used for return-path lookup
    pub name: String,
    /// Cell within the owning room
    pub position: Position,
    /// Name of the room this portal leads to
    pub dest_room: String,
    /// Name of the portal the traveller arrives at
    pub dest_portal: String,
}

impl Portal {
    pub fn new(
        name: impl Into<String>,
        position: Position,
        dest_room: impl Into<String>,
        dest_portal: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            dest_room: dest_room.into(),
            dest_portal: dest_portal.into(),
        }
    }

    /// Whether this portal leads into `room`.
    pub fn leads_to(&self, room: &str) -> bool {
        self.dest_room == room
    }

    /// Whether this portal is the return path for `other`, which lives in `other_room`.
    pub fn returns_from(&self, other_room: &str, other: &Portal) -> bool {
        self.dest_room == other_room && self.dest_portal == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_portal_matching() {
        let out = Portal::new("out", Position::new(2, 2), "B", "in");
        let back = Portal::new("in", Position::new(0, 0), "A", "out");
        let elsewhere = Portal::new("in", Position::new(0, 0), "C", "out");

        assert!(back.returns_from("A", &out));
        assert!(!elsewhere.returns_from("A", &out));
        assert!(!back.returns_from("B", &out));
    }
}
