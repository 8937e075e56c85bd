//! # Entity Module
//!
//! Tangible occupants of room cells: terrain, characters and items.
//!
//! Entities carry no behavior of their own. They expose identity,
//! walkability, the direction they face and an optional movement tether
//! that limits how far a character may wander from where it was placed.

use crate::{new_entity_id, Direction, EntityId, Position};
use serde::{Deserialize, Serialize};

/// What kind of occupant an entity is.
///
/// Rooms keep a per-category index so each kind can be iterated without
/// scanning the whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Terrain,
    Character,
    Item,
}

impl Category {
    /// Returns all categories in index order.
    pub fn all() -> [Category; 3] {
        [Category::Terrain, Category::Character, Category::Item]
    }

    /// Default walkability for entities of this category.
    ///
    /// Terrain and items can be stood on unless stated otherwise.
    /// Characters block the cell they stand in.
    pub fn default_walkable(self) -> bool {
        match self {
            Category::Terrain | Category::Item => true,
            Category::Character => false,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Terrain => "terrain",
            Category::Character => "character",
            Category::Item => "item",
        };
        f.write_str(name)
    }
}

/// Permitted distance from the tether origin along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisRange {
    /// Movement anywhere along the axis
    #[default]
    Unbounded,
    /// At most this many tiles either side of the origin
    Within(u32),
}

impl AxisRange {
    fn contains(self, origin: i32, value: i32) -> bool {
        match self {
            AxisRange::Unbounded => true,
            AxisRange::Within(range) => (value - origin).unsigned_abs() <= range,
        }
    }
}

/// Per-axis movement range around an entity's tether origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveRange {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl MoveRange {
    /// A range that permits movement anywhere.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A box of `x_range` by `y_range` tiles either side of the origin.
    pub fn within(x_range: u32, y_range: u32) -> Self {
        Self {
            x: AxisRange::Within(x_range),
            y: AxisRange::Within(y_range),
        }
    }
}

/// Opaque handle to a behavior the control layer invokes on interaction.
///
/// The world never interprets these; they are carried with the entity so
/// that a plot or dialogue system can look them up by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionHandle(pub String);

impl ActionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A tangible occupant of a single grid cell.
///
/// # Examples
///
/// ```
/// use wayfarer::{Category, Entity, MoveRange, Position};
///
/// let guard = Entity::new("Guard", Category::Character).with_range(MoveRange::within(2, 0));
/// assert!(!guard.walkable);
/// // Until the guard is placed somewhere it has no tether to be held to.
/// assert!(guard.is_in_range(Position::new(40, 40)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Kind of occupant
    pub category: Category,
    /// Whether other entities may enter a cell holding this one
    pub walkable: bool,
    /// Opaque image key for the renderer
    pub sprite: String,
    /// Direction the entity currently faces
    pub facing: Direction,
    /// Movement range around the tether origin
    pub range: MoveRange,
    /// Attached behaviors, in invocation order
    pub actions: Vec<ActionHandle>,
    tether: Option<Position>,
}

impl Entity {
    /// Creates an entity with the category's default walkability and no tether.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        let name = name.into();
        Self {
            id: new_entity_id(),
            sprite: name.to_lowercase(),
            name,
            category,
            walkable: category.default_walkable(),
            facing: Direction::default(),
            range: MoveRange::unbounded(),
            actions: Vec::new(),
            tether: None,
        }
    }

    /// Convenience constructor for terrain.
    pub fn terrain(name: impl Into<String>, walkable: bool) -> Self {
        Self::new(name, Category::Terrain).with_walkable(walkable)
    }

    /// Convenience constructor for characters.
    pub fn character(name: impl Into<String>) -> Self {
        Self::new(name, Category::Character)
    }

    /// Convenience constructor for items.
    pub fn item(name: impl Into<String>) -> Self {
        Self::new(name, Category::Item)
    }

    pub fn with_walkable(mut self, walkable: bool) -> Self {
        self.walkable = walkable;
        self
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = sprite.into();
        self
    }

    pub fn with_range(mut self, range: MoveRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_action(mut self, action: ActionHandle) -> Self {
        self.actions.push(action);
        self
    }

    /// The tether origin, if the entity has been placed into a room.
    pub fn tether(&self) -> Option<Position> {
        self.tether
    }

    /// Checks whether `pos` lies inside the entity's movement range.
    ///
    /// Each axis is tested independently: an unbounded axis always passes,
    /// a bounded one passes when the coordinate is within `range` of the
    /// tether origin. An entity that has never been placed is in range
    /// everywhere.
    pub fn is_in_range(&self, pos: Position) -> bool {
        match self.tether {
            None => true,
            Some(origin) => {
                self.range.x.contains(origin.x, pos.x) && self.range.y.contains(origin.y, pos.y)
            }
        }
    }

    /// Sets the tether origin unless one is already set.
    pub(crate) fn anchor(&mut self, pos: Position) {
        if self.tether.is_none() {
            self.tether = Some(pos);
        }
    }

    /// Moves the tether origin; used when the entity arrives in a new room.
    pub(crate) fn reanchor(&mut self, pos: Position) {
        self.tether = Some(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults() {
        assert!(Entity::terrain("Grass", true).walkable);
        assert!(!Entity::terrain("Wall", false).walkable);
        assert!(!Entity::character("Villager").walkable);
        assert!(Entity::item("Apple").walkable);
    }

    #[test]
    fn test_unplaced_entity_is_in_range_everywhere() {
        let entity = Entity::character("Cat").with_range(MoveRange::within(0, 0));
        assert!(entity.tether().is_none());
        assert!(entity.is_in_range(Position::new(-100, 100)));
    }

    #[test]
    fn test_tether_range_per_axis() {
        let mut entity = Entity::character("Guard").with_range(MoveRange {
            x: AxisRange::Within(2),
            y: AxisRange::Unbounded,
        });
        entity.anchor(Position::new(5, 5));

        assert!(entity.is_in_range(Position::new(3, 5)));
        assert!(entity.is_in_range(Position::new(7, 5)));
        assert!(!entity.is_in_range(Position::new(8, 5)));
        assert!(!entity.is_in_range(Position::new(2, 5)));
        // The y axis is unbounded
        assert!(entity.is_in_range(Position::new(5, 500)));
        assert!(entity.is_in_range(Position::new(7, -500)));
    }

    #[test]
    fn test_anchor_is_set_once() {
        let mut entity = Entity::character("Guard").with_range(MoveRange::within(1, 1));
        entity.anchor(Position::new(2, 2));
        entity.anchor(Position::new(9, 9));
        assert_eq!(entity.tether(), Some(Position::new(2, 2)));

        entity.reanchor(Position::new(9, 9));
        assert_eq!(entity.tether(), Some(Position::new(9, 9)));
    }

    #[test]
    fn test_actions_keep_order() {
        let entity = Entity::character("Elder")
            .with_action(ActionHandle::new("greet"))
            .with_action(ActionHandle::new("give_quest"));
        let names: Vec<&str> = entity.actions.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["greet", "give_quest"]);
    }

    #[test]
    fn test_entity_serialization() {
        let entity = Entity::item("Key").with_sprite("key_gold");
        let json = serde_json::to_string(&entity).unwrap();
        let loaded: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, entity);
    }
}
