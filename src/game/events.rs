//! # World Events
//!
//! Notifications queued by the world for the renderer and control layer.

use crate::{Direction, EntityId, Position};
use serde::{Deserialize, Serialize};

/// Something that changed in the world during a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// An entity moved one cell within a room
    EntityMoved {
        entity: EntityId,
        room: String,
        from: Position,
        to: Position,
    },
    /// An entity tried to move but the destination refused it
    EntityBlocked {
        entity: EntityId,
        room: String,
        at: Position,
        facing: Direction,
    },
    /// An entity went through a portal into another room
    EntityPortaled {
        entity: EntityId,
        from_room: String,
        to_room: String,
        portal: String,
        arrival: Position,
    },
    /// The focused room changed
    FocusChanged { from: String, to: String },
}

impl WorldEvent {
    /// The entity the event concerns, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            WorldEvent::EntityMoved { entity, .. }
            | WorldEvent::EntityBlocked { entity, .. }
            | WorldEvent::EntityPortaled { entity, .. } => Some(*entity),
            WorldEvent::FocusChanged { .. } => None,
        }
    }
}
