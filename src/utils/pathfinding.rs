//! # Pathfinding
//!
//! Shortest walkable routes across a single room.

use crate::{EntityId, Position, Room};
use pathfinding::prelude::bfs;

/// Finds a shortest cardinal path for an occupant of `room` to `target`.
///
/// Every step of the path is a cell the entity could move into: in bounds,
/// walkable, and inside its tether range. The returned path starts at the
/// entity's current cell and ends at `target`. Returns None if the entity
/// is not in the room or no such path exists.
pub fn find_path(room: &Room, id: EntityId, target: Position) -> Option<Vec<Position>> {
    let entity = room.entity(id)?;
    let start = room.get_coords(id)?.position();

    bfs(
        &start,
        |pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| room.is_walkable(*next) && entity.is_in_range(*next))
                .collect::<Vec<_>>()
        },
        |pos| *pos == target,
    )
}

impl Room {
    /// Shortest walkable path for an occupant; see [`find_path`].
    pub fn find_path(&self, id: EntityId, target: Position) -> Option<Vec<Position>> {
        find_path(self, id, target)
    }
}
