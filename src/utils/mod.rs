//! # Utilities Module
//!
//! Camera coordinate mathematics and pathfinding over room grids.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
