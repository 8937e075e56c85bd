//! # Room Module
//!
//! A bounded, layered grid of entity slots with camera state and portals.
//!
//! Each room owns the entities placed in it. The grid is authoritative:
//! the per-category index and the render positions handed to the renderer
//! are derived from it and refreshed after every mutation, so a reader never
//! observes a half-applied move.
//!
//! Layers only ever grow. When an entity has to go into a column whose top
//! slot is taken, a new layer is added rather than overwriting anything.

use crate::config::{MAX_LAYERS, MAX_ROOM_SIDE};
use crate::utils::math::{centering_pan, grid_to_screen, in_viewport, screen_to_grid, ScreenPosition};
use crate::{Category, Direction, Entity, EntityId, Portal, Position, WayfarerError, WayfarerResult};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Grid coordinates of an occupant, including its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
    pub z: usize,
}

impl Coords {
    pub fn new(x: i32, y: i32, z: usize) -> Self {
        Self { x, y, z }
    }

    /// The cell, without the layer.
    pub fn position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Why an entity could not be placed into a cell.
///
/// These are ordinary gameplay outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The entity is already somewhere in this room
    AlreadyPlaced,
    /// The cell lies outside the room
    OutOfBounds,
    /// An existing occupant of the cell is not walkable
    Blocked,
    /// The cell lies outside the entity's tether range
    OutOfRange,
    /// The column would need more than `MAX_LAYERS` layers
    LayerLimit,
}

/// A rejected placement. Hands the entity back to the caller.
#[derive(Debug, Clone)]
pub struct Refusal {
    pub entity: Entity,
    pub reason: BlockReason,
}

impl Refusal {
    pub fn into_entity(self) -> Entity {
        self.entity
    }
}

/// Renderer-facing view of one occupant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub entity: EntityId,
    /// Opaque image key
    pub sprite: String,
    /// Pixel position of the tile's top-left corner
    pub screen: ScreenPosition,
    /// Draw order; higher layers draw on top
    pub z: usize,
}

type Layer = Vec<Option<EntityId>>;

/// A named, bounded, layered grid of entities.
///
/// # Examples
///
/// ```
/// use wayfarer::{Entity, Position, Room};
///
/// let mut room = Room::new("cellar", 4, 4);
/// room.add_entity(Entity::terrain("Wall", false), Position::new(0, 0), 0).unwrap();
///
/// assert!(!room.is_walkable(Position::new(0, 0)));
/// assert!(room.is_walkable(Position::new(1, 0)));
/// assert!(!room.is_walkable(Position::new(4, 0))); // out of bounds
///
/// let cat = Entity::character("Cat");
/// let id = cat.id;
/// room.place_entity(cat, Position::new(1, 1)).unwrap();
/// assert!(room.move_entity(id, Position::new(2, 1)).unwrap());
/// assert!(!room.move_entity(id, Position::new(9, 9)).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Room {
    name: String,
    width: u32,
    height: u32,
    /// z-major, then row-major cells: `layers[z][y * width + x]`
    layers: Vec<Layer>,
    entities: HashMap<EntityId, Entity>,
    index: HashMap<Category, Vec<EntityId>>,
    /// Pixel position and draw order per occupant, derived from `layers`
    render: HashMap<EntityId, (ScreenPosition, usize)>,
    pan: Position,
    portals: Vec<Portal>,
}

impl Room {
    /// Creates an empty room with a single layer.
    ///
    /// Untrusted dimensions go through [`Room::check_dimensions`] first;
    /// [`Room::from_layers`] does this itself.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let mut room = Self {
            name: name.into(),
            width,
            height,
            layers: Vec::new(),
            entities: HashMap::new(),
            index: HashMap::new(),
            render: HashMap::new(),
            pan: Position::origin(),
            portals: Vec::new(),
        };
        room.grow_to(1);
        room
    }

    /// Checks room dimensions against `config::MAX_ROOM_SIDE`.
    pub fn check_dimensions(name: &str, width: u32, height: u32) -> WayfarerResult<()> {
        if width == 0 || height == 0 || width > MAX_ROOM_SIDE || height > MAX_ROOM_SIDE {
            warn!("Room {} has unusable size {}x{}", name, width, height);
            return Err(WayfarerError::InvalidState(format!(
                "room {}: size {}x{} must be between 1x1 and {}x{}",
                name, width, height, MAX_ROOM_SIDE, MAX_ROOM_SIDE
            )));
        }
        Ok(())
    }

    /// Builds a room from a layered map (layer × row × column).
    ///
    /// The dimensions must pass [`Room::check_dimensions`], and every layer
    /// must be exactly `height` rows of `width` cells. An entity id appearing
    /// twice is rejected rather than silently collapsed.
    pub fn from_layers(
        name: impl Into<String>,
        width: u32,
        height: u32,
        layers: Vec<Vec<Vec<Option<Entity>>>>,
    ) -> WayfarerResult<Self> {
        let name = name.into();
        Self::check_dimensions(&name, width, height)?;
        let mut room = Self::new(name, width, height);

        for (z, layer) in layers.into_iter().enumerate() {
            if layer.len() != height as usize {
                return Err(WayfarerError::InvalidState(format!(
                    "Layer {} of room {} has {} rows, expected {}",
                    z,
                    room.name,
                    layer.len(),
                    height
                )));
            }
            for (y, row) in layer.into_iter().enumerate() {
                if row.len() != width as usize {
                    return Err(WayfarerError::InvalidState(format!(
                        "Row {} of layer {} in room {} has {} cells, expected {}",
                        y,
                        z,
                        room.name,
                        row.len(),
                        width
                    )));
                }
                for (x, slot) in row.into_iter().enumerate() {
                    if let Some(entity) = slot {
                        room.add_entity(entity, Position::new(x as i32, y as i32), z)?;
                    }
                }
            }
        }

        debug!(
            "Built room {} ({}x{}, {} layers, {} entities)",
            room.name,
            width,
            height,
            room.depth(),
            room.entities.len()
        );
        Ok(room)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Current camera pan offset (the grid tile in the viewport's top-left corner).
    pub fn pan(&self) -> Position {
        self.pan
    }

    /// Checks whether `pos` lies within `[0, width) × [0, height)`.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Whether the entity is placed in this room.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// All occupants, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Occupants of one category, in the order they entered the room.
    pub fn entities_of(&self, category: Category) -> impl Iterator<Item = &Entity> {
        self.index
            .get(&category)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entities.get(id))
    }

    /// Checks whether every occupant of the cell is walkable.
    ///
    /// Out-of-bounds cells are never walkable. Empty cells always are.
    pub fn is_walkable(&self, pos: Position) -> bool {
        match self.cell_index(pos) {
            Some(cell) => !self.column_blocked(cell),
            None => false,
        }
    }

    /// The occupants of a cell, bottom layer first.
    pub fn get_entities(&self, pos: Position) -> Vec<&Entity> {
        let Some(cell) = self.cell_index(pos) else {
            return Vec::new();
        };
        self.layers
            .iter()
            .filter_map(|layer| layer[cell])
            .filter_map(|id| self.entities.get(&id))
            .collect()
    }

    /// Grid coordinates of an occupant, recovered from its render position.
    pub fn get_coords(&self, id: EntityId) -> Option<Coords> {
        self.render.get(&id).map(|&(screen, z)| {
            let pos = screen_to_grid(screen, self.pan);
            Coords::new(pos.x, pos.y, z)
        })
    }

    /// Checks whether `entity` could be placed at `pos` right now.
    pub fn can_place(&self, entity: &Entity, pos: Position) -> Result<(), BlockReason> {
        if self.contains(entity.id) {
            return Err(BlockReason::AlreadyPlaced);
        }
        self.check_placement(entity, pos).map(|_| ())
    }

    /// Places an entity on top of the column at `pos`.
    ///
    /// Refused when the cell is out of bounds, when an existing occupant is
    /// not walkable, or when the cell is outside the entity's tether range.
    /// The new entity's own walkability is not considered. On refusal the
    /// room is untouched and the entity is handed back.
    pub fn place_entity(&mut self, mut entity: Entity, pos: Position) -> Result<Coords, Refusal> {
        if self.contains(entity.id) {
            warn!("Entity {} is already placed in room {}", entity.id, self.name);
            return Err(Refusal {
                entity,
                reason: BlockReason::AlreadyPlaced,
            });
        }

        let (cell, z) = match self.check_placement(&entity, pos) {
            Ok(slot) => slot,
            Err(reason) => {
                debug!(
                    "Refused {} at {} in room {}: {:?}",
                    entity.name, pos, self.name, reason
                );
                return Err(Refusal { entity, reason });
            }
        };

        entity.anchor(pos);
        let coords = Coords::new(pos.x, pos.y, z);
        self.grow_to(z + 1);
        self.attach(entity, cell, coords);
        Ok(coords)
    }

    /// Writes an entity into an explicit layer.
    ///
    /// An empty slot is written directly, growing the room to `z + 1` layers
    /// if needed. An occupied slot is never overwritten: a new layer is
    /// inserted directly above `z`, every higher layer moves up by one, and
    /// the entity goes into the new layer. No walkability or tether checks
    /// apply.
    pub fn add_entity(&mut self, mut entity: Entity, pos: Position, z: usize) -> WayfarerResult<Coords> {
        if self.contains(entity.id) {
            warn!("Entity {} is already placed in room {}", entity.id, self.name);
            return Err(WayfarerError::DuplicateEntity {
                entity: entity.id,
                room: self.name.clone(),
            });
        }
        let cell = self.cell_index(pos).ok_or_else(|| self.out_of_bounds(pos))?;

        let occupied = self
            .layers
            .get(z)
            .map_or(false, |layer| layer[cell].is_some());
        let target_z = if occupied {
            self.insert_layer(z + 1)?;
            z + 1
        } else {
            self.ensure_depth(z + 1)?;
            z
        };

        entity.anchor(pos);
        let coords = Coords::new(pos.x, pos.y, target_z);
        self.attach(entity, cell, coords);
        Ok(coords)
    }

    /// Detaches an entity from the cell it occupies.
    ///
    /// Errors if the entity is not at `pos`; that is always a caller bug.
    pub fn remove_entity(&mut self, id: EntityId, pos: Position) -> WayfarerResult<Entity> {
        let coords = match self.get_coords(id) {
            Some(coords) if coords.position() == pos => coords,
            _ => {
                warn!("Entity {} is not at {} in room {}", id, pos, self.name);
                return Err(WayfarerError::EntityNotAt {
                    entity: id,
                    room: self.name.clone(),
                    x: pos.x,
                    y: pos.y,
                });
            }
        };

        self.detach(id, coords).ok_or_else(|| self.not_found(id))
    }

    /// Removes and returns whatever occupies an explicit slot, without any checks.
    pub fn pop_entity(&mut self, pos: Position, z: usize) -> Option<Entity> {
        let cell = self.cell_index(pos)?;
        let id = self.layers.get(z)?[cell]?;
        self.detach(id, Coords::new(pos.x, pos.y, z))
    }

    /// Moves an occupant to the top of another column.
    ///
    /// Returns `Ok(false)` and changes nothing if the destination is refused
    /// for any reason `place_entity` would refuse it. Errors only when the
    /// entity is not in this room.
    pub fn move_entity(&mut self, id: EntityId, pos: Position) -> WayfarerResult<bool> {
        let from = self.get_coords(id).ok_or_else(|| self.not_found(id))?;
        if from.position() == pos {
            return Ok(true);
        }

        let entity = self.entities.get(&id).ok_or_else(|| self.not_found(id))?;
        let (cell, z) = match self.check_placement(entity, pos) {
            Ok(slot) => slot,
            Err(reason) => {
                debug!(
                    "{} cannot move {} -> {} in room {}: {:?}",
                    entity.name,
                    from.position(),
                    pos,
                    self.name,
                    reason
                );
                return Ok(false);
            }
        };

        if let Some(old_cell) = self.cell_index(from.position()) {
            self.layers[from.z][old_cell] = None;
        }
        self.grow_to(z + 1);
        self.layers[z][cell] = Some(id);
        self.refresh_one(id, Coords::new(pos.x, pos.y, z));

        debug!("Moved {} {} -> {} in room {}", id, from.position(), pos, self.name);
        Ok(true)
    }

    /// Turns an occupant to face `direction`.
    pub fn set_facing(&mut self, id: EntityId, direction: Direction) -> WayfarerResult<()> {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.facing = direction;
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }

    /// Shifts the camera by whole tiles and recomputes every render position.
    pub fn pan_camera(&mut self, dx: i32, dy: i32) {
        self.set_pan(self.pan + Position::new(dx, dy));
    }

    /// Pans so that the entity is drawn on the viewport's center tile.
    pub fn center_camera(&mut self, id: EntityId) -> WayfarerResult<()> {
        let coords = self.get_coords(id).ok_or_else(|| self.not_found(id))?;
        self.set_pan(centering_pan(coords.position()));
        Ok(())
    }

    /// Sets the camera pan offset directly.
    pub fn set_pan(&mut self, pan: Position) {
        self.pan = pan;
        self.refresh_render();
    }

    /// Render data for every occupant, ordered by layer then row then column.
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut sprites: Vec<Sprite> = self
            .render
            .iter()
            .filter_map(|(id, &(screen, z))| {
                self.entities.get(id).map(|entity| Sprite {
                    entity: *id,
                    sprite: entity.sprite.clone(),
                    screen,
                    z,
                })
            })
            .collect();
        sprites.sort_by_key(|sprite| (sprite.z, sprite.screen.y, sprite.screen.x));
        sprites
    }

    /// Render data for occupants inside the viewport.
    pub fn visible_sprites(&self) -> Vec<Sprite> {
        self.sprites()
            .into_iter()
            .filter(|sprite| in_viewport(screen_to_grid(sprite.screen, self.pan), self.pan))
            .collect()
    }

    /// Registers a portal. Portals must be in bounds and unique by name and cell.
    pub fn add_portal(&mut self, portal: Portal) -> WayfarerResult<()> {
        if !self.in_bounds(portal.position) {
            return Err(self.out_of_bounds(portal.position));
        }
        if self
            .portals
            .iter()
            .any(|p| p.name == portal.name || p.position == portal.position)
        {
            return Err(WayfarerError::DuplicatePortal {
                room: self.name.clone(),
                portal: portal.name,
            });
        }
        debug!(
            "Room {} portal {} at {} -> {}/{}",
            self.name, portal.name, portal.position, portal.dest_room, portal.dest_portal
        );
        self.portals.push(portal);
        Ok(())
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// The portal at a cell, if any.
    pub fn get_portal(&self, pos: Position) -> Option<&Portal> {
        self.portals.iter().find(|p| p.position == pos)
    }

    /// The portal leading back to `from_room`, if any.
    pub fn get_portal_for(&self, from_room: &str) -> Option<&Portal> {
        self.portals.iter().find(|p| p.leads_to(from_room))
    }

    pub fn portal_named(&self, name: &str) -> Option<&Portal> {
        self.portals.iter().find(|p| p.name == name)
    }

    /// Verifies that grid, category index and render positions agree.
    pub fn check_invariants(&self) -> WayfarerResult<()> {
        let mut seen = HashSet::new();
        for (z, layer) in self.layers.iter().enumerate() {
            if layer.len() != self.cell_count() {
                return Err(self.invalid(format!("layer {} has {} cells", z, layer.len())));
            }
            for (cell, slot) in layer.iter().enumerate() {
                let Some(id) = slot else { continue };
                if !seen.insert(*id) {
                    return Err(self.invalid(format!("entity {} occupies two slots", id)));
                }
                if !self.entities.contains_key(id) {
                    return Err(self.invalid(format!("slot holds unknown entity {}", id)));
                }
                let expected = Coords::new(
                    (cell % self.width as usize) as i32,
                    (cell / self.width as usize) as i32,
                    z,
                );
                if self.get_coords(*id) != Some(expected) {
                    return Err(self.invalid(format!(
                        "render position of {} disagrees with slot {:?}",
                        id, expected
                    )));
                }
            }
        }
        if seen.len() != self.entities.len() || self.render.len() != self.entities.len() {
            return Err(self.invalid("occupant count mismatch".to_string()));
        }

        let mut indexed = 0;
        for (category, ids) in &self.index {
            for id in ids {
                match self.entities.get(id) {
                    Some(entity) if entity.category == *category => indexed += 1,
                    _ => {
                        return Err(self.invalid(format!(
                            "index entry {} under {} is stale",
                            id, category
                        )))
                    }
                }
            }
        }
        if indexed != self.entities.len() {
            return Err(self.invalid("category index does not cover every occupant".to_string()));
        }
        Ok(())
    }

    /// Checks an arrival slot without touching the room; returns the layer it would use.
    pub(crate) fn arrival_layer(&self, id: EntityId, pos: Position) -> WayfarerResult<usize> {
        if self.contains(id) {
            return Err(WayfarerError::DuplicateEntity {
                entity: id,
                room: self.name.clone(),
            });
        }
        let cell = self.cell_index(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        let z = self.next_free_layer(cell);
        if z >= MAX_LAYERS {
            return Err(self.invalid(format!("column at {} is full", pos)));
        }
        Ok(z)
    }

    /// Like `arrival_layer`, for an occupant of this room about to move to `pos`.
    ///
    /// The occupant's own slot does not count towards the column's height.
    pub(crate) fn relocation_layer(&self, id: EntityId, pos: Position) -> WayfarerResult<usize> {
        if !self.contains(id) {
            return Err(self.not_found(id));
        }
        let cell = self.cell_index(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        let z = self
            .layers
            .iter()
            .rposition(|layer| layer[cell].map_or(false, |other| other != id))
            .map_or(0, |z| z + 1);
        if z >= MAX_LAYERS {
            return Err(self.invalid(format!("column at {} is full", pos)));
        }
        Ok(z)
    }

    /// Drops an arriving entity on top of a column, ignoring walkability.
    ///
    /// Arrival counts as first placement in this room, so the tether moves here.
    pub(crate) fn receive_entity(&mut self, mut entity: Entity, pos: Position) -> WayfarerResult<Coords> {
        let z = self.arrival_layer(entity.id, pos)?;
        let cell = self.cell_index(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        entity.reanchor(pos);
        let coords = Coords::new(pos.x, pos.y, z);
        self.grow_to(z + 1);
        self.attach(entity, cell, coords);
        Ok(coords)
    }

    fn cell_index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    fn column_blocked(&self, cell: usize) -> bool {
        self.layers
            .iter()
            .filter_map(|layer| layer[cell])
            .any(|id| self.entities.get(&id).map_or(false, |e| !e.walkable))
    }

    /// One above the highest occupied slot in the column.
    fn next_free_layer(&self, cell: usize) -> usize {
        self.layers
            .iter()
            .rposition(|layer| layer[cell].is_some())
            .map_or(0, |z| z + 1)
    }

    fn check_placement(&self, entity: &Entity, pos: Position) -> Result<(usize, usize), BlockReason> {
        let cell = self.cell_index(pos).ok_or(BlockReason::OutOfBounds)?;
        if self.column_blocked(cell) {
            return Err(BlockReason::Blocked);
        }
        if !entity.is_in_range(pos) {
            return Err(BlockReason::OutOfRange);
        }
        let z = self.next_free_layer(cell);
        if z >= MAX_LAYERS {
            return Err(BlockReason::LayerLimit);
        }
        Ok((cell, z))
    }

    fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn empty_layer(&self) -> Layer {
        vec![None; self.cell_count()]
    }

    fn grow_to(&mut self, depth: usize) {
        while self.layers.len() < depth {
            let layer = self.empty_layer();
            self.layers.push(layer);
        }
    }

    fn ensure_depth(&mut self, depth: usize) -> WayfarerResult<()> {
        if depth > MAX_LAYERS {
            return Err(self.invalid(format!("{} layers exceeds the limit of {}", depth, MAX_LAYERS)));
        }
        self.grow_to(depth);
        Ok(())
    }

    /// Inserts an empty layer at `z`, moving every layer at or above it up by one.
    fn insert_layer(&mut self, z: usize) -> WayfarerResult<()> {
        if self.layers.len() >= MAX_LAYERS {
            return Err(self.invalid(format!("cannot grow past {} layers", MAX_LAYERS)));
        }
        let layer = self.empty_layer();
        self.layers.insert(z.min(self.layers.len()), layer);
        self.refresh_render();
        debug!("Room {} grew to {} layers", self.name, self.layers.len());
        Ok(())
    }

    fn attach(&mut self, entity: Entity, cell: usize, coords: Coords) {
        let id = entity.id;
        debug!(
            "Placed {} ({}) at {:?} in room {}",
            entity.name, entity.category, coords, self.name
        );
        self.layers[coords.z][cell] = Some(id);
        self.index.entry(entity.category).or_default().push(id);
        self.entities.insert(id, entity);
        self.refresh_one(id, coords);
    }

    fn detach(&mut self, id: EntityId, coords: Coords) -> Option<Entity> {
        let cell = self.cell_index(coords.position())?;
        if self.layers.get(coords.z)?[cell] != Some(id) {
            return None;
        }
        let entity = self.entities.remove(&id)?;
        self.layers[coords.z][cell] = None;
        if let Some(ids) = self.index.get_mut(&entity.category) {
            ids.retain(|other| *other != id);
        }
        self.render.remove(&id);
        debug!("Removed {} from {:?} in room {}", entity.name, coords, self.name);
        Some(entity)
    }

    fn refresh_one(&mut self, id: EntityId, coords: Coords) {
        self.render
            .insert(id, (grid_to_screen(coords.position(), self.pan), coords.z));
    }

    /// Recomputes every render position from the grid.
    fn refresh_render(&mut self) {
        let width = self.width as usize;
        let pan = self.pan;
        self.render.clear();
        for (z, layer) in self.layers.iter().enumerate() {
            for (cell, slot) in layer.iter().enumerate() {
                if let Some(id) = slot {
                    let pos = Position::new((cell % width) as i32, (cell / width) as i32);
                    self.render.insert(*id, (grid_to_screen(pos, pan), z));
                }
            }
        }
    }

    fn not_found(&self, id: EntityId) -> WayfarerError {
        warn!("Entity {} not found in room {}", id, self.name);
        WayfarerError::EntityNotFound {
            entity: id,
            room: self.name.clone(),
        }
    }

    fn out_of_bounds(&self, pos: Position) -> WayfarerError {
        WayfarerError::OutOfBounds {
            room: self.name.clone(),
            x: pos.x,
            y: pos.y,
        }
    }

    fn invalid(&self, detail: String) -> WayfarerError {
        WayfarerError::InvalidState(format!("room {}: {}", self.name, detail))
    }
}
