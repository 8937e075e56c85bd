//! # Wayfarer
//!
//! The spatial core of a small tile-based exploration RPG.
//!
//! ## Architecture Overview
//!
//! Wayfarer models the game world as a set of layered 2D grids. The core
//! concepts are:
//!
//! - **Entity**: a tangible occupant of a grid cell (terrain, characters, items)
//! - **Portal**: a named link from a cell in one room to a named portal in another
//! - **Room**: a bounded, layered grid that owns placement, movement and camera state
//! - **World**: the set of rooms plus the focused room, routing movement and portal crossings
//!
//! Rendering, input mapping and the game loop live outside this crate. The
//! room exposes pixel positions and z-order for every occupant, and the world
//! queues [`WorldEvent`]s describing what changed.

pub mod game;
pub mod loader;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use loader::*;
pub use utils::*;

pub use game::{
    // From entities
    ActionHandle,
    AxisRange,
    Category,
    Direction,
    Entity,
    EntityId,
    MoveRange,
    // From portal
    Portal,
    Position,
    // From room
    BlockReason,
    Coords,
    Refusal,
    Room,
    Sprite,
    // From turns
    TurnRotation,
    // From world
    StepOutcome,
    World,
    WorldEvent,
};

pub use loader::{Archetype, ArchetypeDef, ArchetypeRegistry, RoomConfig, WorldConfig};

/// Core error type for the Wayfarer world model.
///
/// Expected gameplay outcomes (bumping into a wall, stepping out of bounds)
/// are never reported through this type. Every variant here describes a
/// caller or loader bug.
#[derive(thiserror::Error, Debug)]
pub enum WayfarerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// No room with this name exists in the world
    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    /// Two rooms share a name
    #[error("Duplicate room: {0}")]
    DuplicateRoom(String),

    /// The entity is not present in the room
    #[error("Entity {entity} not found in room {room}")]
    EntityNotFound { entity: EntityId, room: String },

    /// The entity is not present at the claimed cell
    #[error("Entity {entity} is not at ({x}, {y}) in room {room}")]
    EntityNotAt {
        entity: EntityId,
        room: String,
        x: i32,
        y: i32,
    },

    /// The entity already occupies a cell in the room
    #[error("Entity {entity} is already placed in room {room}")]
    DuplicateEntity { entity: EntityId, room: String },

    /// Coordinates outside the room grid
    #[error("({x}, {y}) is out of bounds in room {room}")]
    OutOfBounds { room: String, x: i32, y: i32 },

    /// A portal's destination does not resolve to exactly one portal
    #[error("Portal {portal} in room {room} does not resolve to {dest_portal} in {dest_room}")]
    UnresolvedPortal {
        room: String,
        portal: String,
        dest_room: String,
        dest_portal: String,
    },

    /// Two portals in one room share a name or a cell
    #[error("Duplicate portal {portal} in room {room}")]
    DuplicatePortal { room: String, portal: String },

    /// The archetype table has no entry with this name
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    /// World state is invalid
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

/// Result type used throughout the Wayfarer codebase.
pub type WayfarerResult<T> = Result<T, WayfarerError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// World and camera configuration constants.
pub mod config {
    /// Edge length of one grid tile in pixels
    pub const TILE_SIZE: i32 = 32;

    /// Viewport width in tiles, shared by every room
    pub const VIEWPORT_WIDTH: i32 = 16;

    /// Viewport height in tiles, shared by every room
    pub const VIEWPORT_HEIGHT: i32 = 16;

    /// Pixel x of the viewport's top-left corner on screen
    pub const VIEWPORT_OFFSET_X: i32 = 16;

    /// Pixel y of the viewport's top-left corner on screen
    pub const VIEWPORT_OFFSET_Y: i32 = 48;

    /// Upper bound on the number of z-layers a room may grow to
    pub const MAX_LAYERS: usize = 64;

    /// Largest width or height, in tiles, a loaded room may have
    pub const MAX_ROOM_SIDE: u32 = 1024;
}
