//! # Camera Mathematics
//!
//! Conversions between room grid coordinates and on-screen pixel positions.
//!
//! The camera is described by a pan offset: the grid coordinate shown in
//! the viewport's top-left tile. A tile at grid `(x, y)` is drawn at
//!
//! ```text
//! px = (x - pan_x) * TILE_SIZE + VIEWPORT_OFFSET_X
//! py = (y - pan_y) * TILE_SIZE + VIEWPORT_OFFSET_Y
//! ```

use crate::config::{
    TILE_SIZE, VIEWPORT_HEIGHT, VIEWPORT_OFFSET_X, VIEWPORT_OFFSET_Y, VIEWPORT_WIDTH,
};
use crate::Position;
use serde::{Deserialize, Serialize};

/// A pixel position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub x: i32,
    pub y: i32,
}

impl ScreenPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Converts a grid position to the pixel position of its tile's top-left corner.
///
/// # Examples
///
/// ```
/// use wayfarer::{grid_to_screen, screen_to_grid, Position};
///
/// let pan = Position::new(3, -2);
/// let tile = Position::new(7, 4);
/// let screen = grid_to_screen(tile, pan);
/// assert_eq!(screen_to_grid(screen, pan), tile);
/// ```
pub fn grid_to_screen(pos: Position, pan: Position) -> ScreenPosition {
    ScreenPosition::new(
        (pos.x - pan.x) * TILE_SIZE + VIEWPORT_OFFSET_X,
        (pos.y - pan.y) * TILE_SIZE + VIEWPORT_OFFSET_Y,
    )
}

/// Converts a pixel position back to the grid tile containing it.
///
/// Pixels anywhere inside a tile map to that tile, including tiles left of
/// or above the viewport origin.
pub fn screen_to_grid(screen: ScreenPosition, pan: Position) -> Position {
    Position::new(
        (screen.x - VIEWPORT_OFFSET_X).div_euclid(TILE_SIZE) + pan.x,
        (screen.y - VIEWPORT_OFFSET_Y).div_euclid(TILE_SIZE) + pan.y,
    )
}

/// The viewport tile at which a centered entity is drawn.
pub fn viewport_center() -> Position {
    Position::new(VIEWPORT_WIDTH / 2, VIEWPORT_HEIGHT / 2)
}

/// Returns the pan offset that draws `pos` on the viewport's center tile.
pub fn centering_pan(pos: Position) -> Position {
    pos - viewport_center()
}

/// Whether the tile at `pos` is inside the viewport for the given pan.
pub fn in_viewport(pos: Position, pan: Position) -> bool {
    let relative = pos - pan;
    (0..VIEWPORT_WIDTH).contains(&relative.x) && (0..VIEWPORT_HEIGHT).contains(&relative.y)
}
