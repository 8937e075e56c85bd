//! # Loader Module
//!
//! Builds a [`World`] from a static world document.
//!
//! A world document lists the archetype table, then each room as a stack of
//! glyph layers plus a legend mapping glyphs to archetypes. A space is
//! always an empty slot. Everything is checked while building: unknown
//! glyphs, ragged rows, duplicate names and unresolvable portals are
//! rejected before a world is handed out.
//!
//! ```
//! use wayfarer::WorldConfig;
//!
//! let json = r#"{
//!     "start_room": "hut",
//!     "archetypes": [
//!         { "name": "wall", "category": "terrain", "walkable": false },
//!         { "name": "floor", "category": "terrain" },
//!         { "name": "hero", "category": "character" }
//!     ],
//!     "rooms": [{
//!         "name": "hut", "width": 3, "height": 3,
//!         "legend": { "x": "wall", ".": "floor" },
//!         "layers": [["xxx", "x.x", "xxx"]]
//!     }],
//!     "hero": { "archetype": "hero", "x": 1, "y": 1 }
//! }"#;
//!
//! let world = WorldConfig::from_json(json).unwrap().build().unwrap();
//! assert_eq!(world.focus(), "hut");
//! assert!(world.hero().is_some());
//! ```

pub mod archetypes;

pub use archetypes::*;

use crate::{Entity, Portal, Position, Room, WayfarerError, WayfarerResult, World};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An entity placed on top of the map after the layers are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub archetype: String,
    /// Overrides the archetype's display name
    #[serde(default)]
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    /// Explicit layer; when absent the entity goes on top of the column
    /// and must pass the usual walkability check
    #[serde(default)]
    pub z: Option<usize>,
}

/// Where the hero starts, in the starting room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroConfig {
    pub archetype: String,
    #[serde(default)]
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
}

/// One room of a world document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Glyph (a one-character string) to archetype name
    #[serde(default)]
    pub legend: BTreeMap<String, String>,
    /// Layers bottom first; each layer is `height` rows of `width` glyphs
    #[serde(default)]
    pub layers: Vec<Vec<String>>,
    #[serde(default)]
    pub portals: Vec<Portal>,
    #[serde(default)]
    pub spawns: Vec<SpawnConfig>,
}

impl RoomConfig {
    /// Builds the room, spawning every glyph and spawn entry from `registry`.
    pub fn build(&self, registry: &ArchetypeRegistry) -> WayfarerResult<Room> {
        let mut grid = Vec::with_capacity(self.layers.len());
        for (z, layer) in self.layers.iter().enumerate() {
            let mut rows = Vec::with_capacity(layer.len());
            for (y, row) in layer.iter().enumerate() {
                let mut cells = Vec::with_capacity(self.width as usize);
                for glyph in row.chars() {
                    cells.push(self.spawn_glyph(registry, glyph, z, y)?);
                }
                rows.push(cells);
            }
            grid.push(rows);
        }
        let mut room = Room::from_layers(self.name.clone(), self.width, self.height, grid)?;

        for spawn in &self.spawns {
            let mut entity = registry.spawn(&spawn.archetype)?;
            if let Some(name) = &spawn.name {
                entity.name = name.clone();
            }
            let pos = Position::new(spawn.x, spawn.y);
            match spawn.z {
                Some(z) => {
                    room.add_entity(entity, pos, z)?;
                }
                None => {
                    if let Err(refusal) = room.place_entity(entity, pos) {
                        return Err(WayfarerError::InvalidState(format!(
                            "cannot spawn {} at {} in room {}: {:?}",
                            spawn.archetype, pos, self.name, refusal.reason
                        )));
                    }
                }
            }
        }

        for portal in &self.portals {
            room.add_portal(portal.clone())?;
        }
        Ok(room)
    }

    fn spawn_glyph(
        &self,
        registry: &ArchetypeRegistry,
        glyph: char,
        z: usize,
        y: usize,
    ) -> WayfarerResult<Option<Entity>> {
        if glyph == ' ' {
            return Ok(None);
        }
        let archetype = self.legend.get(&glyph.to_string()).ok_or_else(|| {
            WayfarerError::InvalidState(format!(
                "room {}: glyph '{}' in layer {} row {} is not in the legend",
                self.name, glyph, z, y
            ))
        })?;
        registry.spawn(archetype).map(Some)
    }
}

/// A complete world document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub start_room: String,
    #[serde(default)]
    pub hero: Option<HeroConfig>,
    #[serde(default)]
    pub archetypes: Vec<ArchetypeDef>,
    pub rooms: Vec<RoomConfig>,
}

impl WorldConfig {
    pub fn from_json(json: &str) -> WayfarerResult<Self> {
        serde_json::from_str(json).map_err(WayfarerError::from)
    }

    pub fn from_path(path: &Path) -> WayfarerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> WayfarerResult<String> {
        serde_json::to_string_pretty(self).map_err(WayfarerError::from)
    }

    /// Resolves the archetype table and builds every room into a world.
    ///
    /// Every portal must resolve, and the hero, if configured, is placed in
    /// the starting room with the camera centered on it.
    pub fn build(&self) -> WayfarerResult<World> {
        let registry = ArchetypeRegistry::from_defs(self.archetypes.clone())?;
        let rooms = self
            .rooms
            .iter()
            .map(|room| room.build(&registry))
            .collect::<WayfarerResult<Vec<Room>>>()?;

        let mut world = World::new(rooms, &self.start_room)?;
        world.validate_portals()?;

        if let Some(hero) = &self.hero {
            let mut entity = registry.spawn(&hero.archetype)?;
            if let Some(name) = &hero.name {
                entity.name = name.clone();
            }
            world.place_hero(entity, Position::new(hero.x, hero.y))?;
        }

        info!(
            "Loaded world with {} rooms and {} archetypes",
            self.rooms.len(),
            registry.len()
        );
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn archetypes() -> Vec<ArchetypeDef> {
        vec![
            ArchetypeDef::new("wall", Category::Terrain).walkable(false),
            ArchetypeDef::new("floor", Category::Terrain),
            ArchetypeDef::new("hero", Category::Character),
            ArchetypeDef::new("coin", Category::Item),
        ]
    }

    fn room(name: &str, portals: Vec<Portal>) -> RoomConfig {
        RoomConfig {
            name: name.to_string(),
            width: 3,
            height: 3,
            legend: [("#", "wall"), (".", "floor"), ("$", "coin")]
                .into_iter()
                .map(|(glyph, name)| (glyph.to_string(), name.to_string()))
                .collect(),
            layers: vec![
                vec!["###".to_string(), "#..".to_string(), "#..".to_string()],
                vec!["   ".to_string(), "  $".to_string(), "   ".to_string()],
            ],
            portals,
            spawns: Vec::new(),
        }
    }

    fn config() -> WorldConfig {
        WorldConfig {
            start_room: "A".to_string(),
            hero: Some(HeroConfig {
                archetype: "hero".to_string(),
                name: Some("Ada".to_string()),
                x: 1,
                y: 1,
            }),
            archetypes: archetypes(),
            rooms: vec![
                room("A", vec![Portal::new("out", Position::new(2, 2), "B", "in")]),
                room("B", vec![Portal::new("in", Position::new(2, 2), "A", "out")]),
            ],
        }
    }

    #[test]
    fn test_build_world() {
        let world = config().build().unwrap();
        assert_eq!(world.focus(), "A");

        let room = world.room("A").unwrap();
        assert_eq!(room.depth(), 2);
        assert!(!room.is_walkable(Position::new(0, 0)));
        assert_eq!(room.entities_of(Category::Item).count(), 1);
        room.check_invariants().unwrap();

        let hero = world.hero().unwrap();
        assert_eq!(room.entity(hero).unwrap().name, "Ada");
        assert_eq!(room.get_coords(hero).unwrap().position(), Position::new(1, 1));
    }

    #[test]
    fn test_unknown_glyph_rejected() {
        let mut config = config();
        config.rooms[0].layers[0][1] = "#?.".to_string();
        assert!(matches!(config.build(), Err(WayfarerError::InvalidState(_))));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut config = config();
        config.rooms[0].layers[0][2] = "#.".to_string();
        assert!(config.build().is_err());
    }

    #[test]
    fn test_oversized_room_rejected() {
        let json = r#"{
            "start_room": "vast",
            "rooms": [{ "name": "vast", "width": 70000, "height": 70000 }]
        }"#;
        let config = WorldConfig::from_json(json).unwrap();
        assert!(matches!(config.build(), Err(WayfarerError::InvalidState(_))));
    }

    #[test]
    fn test_unresolved_portal_rejected() {
        let mut config = config();
        config.rooms[1].portals[0].dest_portal = "nowhere".to_string();
        assert!(matches!(
            config.build(),
            Err(WayfarerError::UnresolvedPortal { .. })
        ));
    }

    #[test]
    fn test_duplicate_room_rejected() {
        let mut config = config();
        config.rooms[1].name = "A".to_string();
        assert!(matches!(config.build(), Err(WayfarerError::DuplicateRoom(_))));
    }

    #[test]
    fn test_spawns() {
        let mut config = config();
        config.rooms[0].spawns = vec![
            SpawnConfig {
                archetype: "coin".to_string(),
                name: Some("Old Coin".to_string()),
                x: 2,
                y: 1,
                z: None,
            },
            SpawnConfig {
                archetype: "coin".to_string(),
                name: None,
                x: 0,
                y: 0,
                z: Some(0),
            },
        ];
        let world = config.build().unwrap();
        let room = world.room("A").unwrap();
        let names: Vec<&str> = room
            .get_entities(Position::new(2, 1))
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["floor", "coin", "Old Coin"]);
        // Explicit layer on an occupied slot stacks above the wall
        assert_eq!(room.get_entities(Position::new(0, 0)).len(), 2);
        room.check_invariants().unwrap();

        let mut blocked = self::config();
        blocked.rooms[0].spawns = vec![SpawnConfig {
            archetype: "coin".to_string(),
            name: None,
            x: 0,
            y: 0,
            z: None,
        }];
        assert!(blocked.build().is_err());
    }

    #[test]
    fn test_hero_on_wall_rejected() {
        let mut config = config();
        if let Some(hero) = config.hero.as_mut() {
            hero.x = 0;
            hero.y = 0;
        }
        assert!(matches!(config.build(), Err(WayfarerError::InvalidState(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = config();
        let json = config.to_json().unwrap();
        assert_eq!(WorldConfig::from_json(&json).unwrap(), config);
        assert!(matches!(
            WorldConfig::from_json("{ not json"),
            Err(WayfarerError::Serde(_))
        ));
    }
}
