//! # World Module
//!
//! The set of rooms, the focused room, and movement routing between them.
//!
//! All movement of the hero goes through [`World::step`], which is the only
//! place a portal crossing is triggered automatically. Every operation runs
//! to completion before returning; there is no partial state for a reader
//! to observe.

use crate::{
    Coords, Direction, Entity, EntityId, Portal, Position, Room, WayfarerError, WayfarerResult,
    WorldEvent,
};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Result of a single step request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The destination refused the entity; only its facing changed
    Blocked,
    /// The entity moved to this cell of the focused room
    Moved(Position),
    /// The entity stepped onto a portal and arrived in another room
    Portaled { room: String, position: Position },
}

impl StepOutcome {
    /// Whether the entity left its cell.
    pub fn moved(&self) -> bool {
        !matches!(self, StepOutcome::Blocked)
    }
}

/// A collection of named rooms with exactly one focused room.
#[derive(Debug, Clone)]
pub struct World {
    rooms: HashMap<String, Room>,
    focus: String,
    hero: Option<EntityId>,
    events: Vec<WorldEvent>,
}

impl World {
    /// Creates a world focused on `start`.
    ///
    /// Room names must be unique and `start` must be one of them. Portal
    /// destinations are not checked here; see [`World::validate_portals`].
    pub fn new(rooms: Vec<Room>, start: &str) -> WayfarerResult<Self> {
        let mut by_name = HashMap::new();
        for room in rooms {
            let name = room.name().to_string();
            if by_name.contains_key(&name) {
                return Err(WayfarerError::DuplicateRoom(name));
            }
            by_name.insert(name, room);
        }
        if !by_name.contains_key(start) {
            return Err(WayfarerError::UnknownRoom(start.to_string()));
        }

        info!("World created with {} rooms, focused on {}", by_name.len(), start);
        Ok(Self {
            rooms: by_name,
            focus: start.to_string(),
            hero: None,
            events: Vec::new(),
        })
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn room_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.get_mut(name)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Name of the focused room.
    pub fn focus(&self) -> &str {
        &self.focus
    }

    pub fn focused_room(&self) -> WayfarerResult<&Room> {
        self.rooms
            .get(&self.focus)
            .ok_or_else(|| WayfarerError::UnknownRoom(self.focus.clone()))
    }

    pub fn focused_room_mut(&mut self) -> WayfarerResult<&mut Room> {
        self.rooms
            .get_mut(&self.focus)
            .ok_or_else(|| WayfarerError::UnknownRoom(self.focus.clone()))
    }

    /// Switches the focused room.
    pub fn set_focus(&mut self, name: &str) -> WayfarerResult<()> {
        if !self.rooms.contains_key(name) {
            warn!("Cannot focus unknown room {}", name);
            return Err(WayfarerError::UnknownRoom(name.to_string()));
        }
        if self.focus != name {
            info!("Focus {} -> {}", self.focus, name);
            self.events.push(WorldEvent::FocusChanged {
                from: self.focus.clone(),
                to: name.to_string(),
            });
            self.focus = name.to_string();
        }
        Ok(())
    }

    /// The entity the camera follows.
    pub fn hero(&self) -> Option<EntityId> {
        self.hero
    }

    pub fn set_hero(&mut self, id: EntityId) {
        self.hero = Some(id);
    }

    /// Places the hero into the focused room and centers the camera on it.
    pub fn place_hero(&mut self, hero: Entity, pos: Position) -> WayfarerResult<EntityId> {
        let id = hero.id;
        let room = self.focused_room_mut()?;
        if let Err(refusal) = room.place_entity(hero, pos) {
            return Err(WayfarerError::InvalidState(format!(
                "cannot place hero at {} in room {}: {:?}",
                pos,
                room.name(),
                refusal.reason
            )));
        }
        room.center_camera(id)?;
        self.hero = Some(id);
        info!("Hero {} placed at {} in {}", id, pos, self.focus);
        Ok(id)
    }

    /// Finds the room and coordinates of an entity anywhere in the world.
    pub fn locate(&self, id: EntityId) -> Option<(&str, Coords)> {
        self.rooms
            .values()
            .find_map(|room| room.get_coords(id).map(|coords| (room.name(), coords)))
    }

    /// Steps an entity of the focused room by a unit delta.
    ///
    /// Exactly one of `dx`, `dy` must be ±1; anything else is a caller bug.
    pub fn step_entity(&mut self, id: EntityId, dx: i32, dy: i32) -> WayfarerResult<StepOutcome> {
        let direction = Direction::from_delta(Position::new(dx, dy)).ok_or_else(|| {
            WayfarerError::InvalidAction(format!("({}, {}) is not a single cardinal step", dx, dy))
        })?;
        self.step(id, direction)
    }

    /// Steps an entity of the focused room one tile in `direction`.
    ///
    /// The entity turns to face `direction` even when the move is refused.
    /// When the hero moves, the camera pans with it, and if the hero lands on
    /// a portal it is carried through in the same step. A portal that does
    /// not resolve is reported before anything moves.
    pub fn step(&mut self, id: EntityId, direction: Direction) -> WayfarerResult<StepOutcome> {
        let focus = self.focus.clone();
        let is_hero = self.hero == Some(id);
        let room = self.focused_room()?;

        let from = room
            .get_coords(id)
            .ok_or_else(|| WayfarerError::EntityNotFound {
                entity: id,
                room: focus.clone(),
            })?
            .position();
        let delta = direction.to_delta();
        let to = from + delta;

        let portal = if is_hero {
            room.get_portal(to).cloned()
        } else {
            None
        };
        if let Some(portal) = &portal {
            self.resolve_arrival(id, portal)?;
        }

        let room = self
            .rooms
            .get_mut(&focus)
            .ok_or_else(|| WayfarerError::UnknownRoom(focus.clone()))?;
        room.set_facing(id, direction)?;
        if !room.move_entity(id, to)? {
            self.events.push(WorldEvent::EntityBlocked {
                entity: id,
                room: focus,
                at: from,
                facing: direction,
            });
            return Ok(StepOutcome::Blocked);
        }

        if is_hero {
            room.pan_camera(delta.x, delta.y);
        }
        self.events.push(WorldEvent::EntityMoved {
            entity: id,
            room: focus,
            from,
            to,
        });

        match portal {
            Some(portal) => {
                let arrival = self.portal_entity(id, &portal)?;
                Ok(StepOutcome::Portaled {
                    room: portal.dest_room,
                    position: arrival,
                })
            }
            None => Ok(StepOutcome::Moved(to)),
        }
    }

    /// Carries an entity of the focused room through `portal`.
    ///
    /// The entity is removed from its cell, dropped on top of the return
    /// portal's cell in the destination room, the destination becomes the
    /// focused room and its camera centers on the entity. Everything is
    /// resolved before anything is changed, so on error the world is as it
    /// was. Returns the arrival cell.
    pub fn portal_entity(&mut self, id: EntityId, portal: &Portal) -> WayfarerResult<Position> {
        let source_name = self.focus.clone();
        let arrival = self.resolve_arrival(id, portal)?;

        let coords = self
            .focused_room()?
            .get_coords(id)
            .ok_or_else(|| WayfarerError::EntityNotFound {
                entity: id,
                room: source_name.clone(),
            })?;

        let entity = self.focused_room_mut()?.remove_entity(id, coords.position())?;
        let dest = self
            .rooms
            .get_mut(&portal.dest_room)
            .ok_or_else(|| WayfarerError::UnknownRoom(portal.dest_room.clone()))?;
        dest.receive_entity(entity, arrival)?;
        dest.center_camera(id)?;

        info!(
            "{} went through {}/{} to {}/{} at {}",
            id, source_name, portal.name, portal.dest_room, portal.dest_portal, arrival
        );
        self.events.push(WorldEvent::EntityPortaled {
            entity: id,
            from_room: source_name,
            to_room: portal.dest_room.clone(),
            portal: portal.name.clone(),
            arrival,
        });
        self.set_focus(&portal.dest_room)?;
        Ok(arrival)
    }

    /// Checks that `portal` leads somewhere `id` can land, without touching the world.
    ///
    /// Returns the arrival cell. Within the same room the entity's own slot
    /// does not count, since it is vacated before arrival.
    fn resolve_arrival(&self, id: EntityId, portal: &Portal) -> WayfarerResult<Position> {
        let unresolved = || WayfarerError::UnresolvedPortal {
            room: self.focus.clone(),
            portal: portal.name.clone(),
            dest_room: portal.dest_room.clone(),
            dest_portal: portal.dest_portal.clone(),
        };

        let dest = self.rooms.get(&portal.dest_room).ok_or_else(|| {
            warn!("Portal {} leads to missing room {}", portal.name, portal.dest_room);
            unresolved()
        })?;
        let arrival = dest
            .portal_named(&portal.dest_portal)
            .ok_or_else(|| {
                warn!(
                    "Room {} has no portal named {}",
                    portal.dest_room, portal.dest_portal
                );
                unresolved()
            })?
            .position;

        if portal.dest_room == self.focus {
            dest.relocation_layer(id, arrival)?;
        } else {
            dest.arrival_layer(id, arrival)?;
        }
        Ok(arrival)
    }

    /// The cell directly in front of an entity of the focused room.
    pub fn facing_cell(&self, id: EntityId) -> WayfarerResult<Position> {
        let room = self.focused_room()?;
        match (room.get_coords(id), room.entity(id)) {
            (Some(coords), Some(entity)) => Ok(coords.position() + entity.facing.to_delta()),
            _ => Err(WayfarerError::EntityNotFound {
                entity: id,
                room: self.focus.clone(),
            }),
        }
    }

    /// What an entity would interact with: the occupants of the cell it faces.
    pub fn entities_in_front(&self, id: EntityId) -> WayfarerResult<Vec<&Entity>> {
        let cell = self.facing_cell(id)?;
        Ok(self.focused_room()?.get_entities(cell))
    }

    /// Walks an entity of the focused room along a shortest path to `target`.
    ///
    /// Stops early if a step is refused or carries the entity into another
    /// room. Returns the number of steps taken, or None if no path exists.
    pub fn walk_to(&mut self, id: EntityId, target: Position) -> WayfarerResult<Option<usize>> {
        let Some(path) = self.focused_room()?.find_path(id, target) else {
            debug!("No path for {} to {} in {}", id, target, self.focus);
            return Ok(None);
        };

        let mut steps = 0;
        for pair in path.windows(2) {
            let Some(direction) = Direction::from_delta(pair[1] - pair[0]) else {
                break;
            };
            match self.step(id, direction)? {
                StepOutcome::Moved(_) => steps += 1,
                StepOutcome::Portaled { .. } => {
                    steps += 1;
                    break;
                }
                StepOutcome::Blocked => break,
            }
        }
        Ok(Some(steps))
    }

    /// Checks that every portal resolves to a portal in an existing room.
    pub fn validate_portals(&self) -> WayfarerResult<()> {
        for room in self.rooms.values() {
            for portal in room.portals() {
                let resolved = self
                    .rooms
                    .get(&portal.dest_room)
                    .and_then(|dest| dest.portal_named(&portal.dest_portal))
                    .is_some();
                if !resolved {
                    return Err(WayfarerError::UnresolvedPortal {
                        room: room.name().to_string(),
                        portal: portal.name.clone(),
                        dest_room: portal.dest_room.clone(),
                        dest_portal: portal.dest_portal.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Portals whose destination exists but does not lead back to them,
    /// as `(room, portal)` pairs sorted by name.
    pub fn asymmetric_portals(&self) -> Vec<(String, String)> {
        let mut found: Vec<(String, String)> = self
            .rooms
            .values()
            .flat_map(|room| {
                room.portals().iter().filter_map(move |portal| {
                    let back = self
                        .rooms
                        .get(&portal.dest_room)
                        .and_then(|dest| dest.portal_named(&portal.dest_portal))?;
                    if back.returns_from(room.name(), portal) {
                        None
                    } else {
                        Some((room.name().to_string(), portal.name.clone()))
                    }
                })
            })
            .collect();
        found.sort();
        found
    }

    /// Takes every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}
