//! Integration tests for room movement, layering, camera and portal traversal.

use wayfarer::config::{TILE_SIZE, VIEWPORT_HEIGHT, VIEWPORT_OFFSET_X, VIEWPORT_OFFSET_Y, VIEWPORT_WIDTH};
use wayfarer::{
    Category, Coords, Direction, Entity, Portal, Position, Room, StepOutcome, WayfarerResult, World,
};

/// A room with a wall border and a floor interior on a single layer.
fn walled_room(name: &str, width: u32, height: u32) -> WayfarerResult<Room> {
    let mut room = Room::new(name, width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let border = x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1;
            let tile = if border {
                Entity::terrain("Wall", false)
            } else {
                Entity::terrain("Floor", true)
            };
            room.add_entity(tile, Position::new(x, y), 0)?;
        }
    }
    Ok(room)
}

fn open_room(name: &str, width: u32, height: u32) -> WayfarerResult<Room> {
    let mut room = Room::new(name, width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            room.add_entity(Entity::terrain("Floor", true), Position::new(x, y), 0)?;
        }
    }
    Ok(room)
}

/// Rooms A and B linked by A/out at (2,2) and B/in at (0,0).
fn linked_world() -> WayfarerResult<World> {
    let mut a = open_room("A", 3, 3)?;
    a.add_portal(Portal::new("out", Position::new(2, 2), "B", "in"))?;
    let mut b = open_room("B", 3, 3)?;
    b.add_portal(Portal::new("in", Position::new(0, 0), "A", "out"))?;
    let world = World::new(vec![a, b], "A")?;
    world.validate_portals()?;
    Ok(world)
}

#[test]
fn test_move_into_wall_is_refused() -> WayfarerResult<()> {
    let mut room = walled_room("cell", 3, 3)?;
    let pebble = Entity::item("Pebble");
    let id = pebble.id;
    room.place_entity(pebble, Position::new(1, 1))
        .map_err(|r| wayfarer::WayfarerError::InvalidAction(format!("{:?}", r.reason)))?;

    assert!(!room.move_entity(id, Position::new(0, 0))?);
    assert_eq!(room.get_coords(id).map(Coords::position), Some(Position::new(1, 1)));
    room.check_invariants()?;
    Ok(())
}

#[test]
fn test_portal_there_and_back() -> WayfarerResult<()> {
    let mut world = linked_world()?;
    let hero = world.place_hero(Entity::character("Hero"), Position::new(2, 2))?;

    let out = world.room("A").and_then(|a| a.portal_named("out")).cloned();
    let arrival = world.portal_entity(hero, out.as_ref().expect("portal out"))?;
    assert_eq!(arrival, Position::new(0, 0));
    assert_eq!(world.focus(), "B");
    assert_eq!(world.locate(hero).map(|(room, c)| (room.to_string(), c.position())),
        Some(("B".to_string(), Position::new(0, 0))));
    assert!(!world.room("A").expect("room A").contains(hero));

    let back = world.room("B").and_then(|b| b.portal_named("in")).cloned();
    let arrival = world.portal_entity(hero, back.as_ref().expect("portal in"))?;
    assert_eq!(arrival, Position::new(2, 2));
    assert_eq!(world.focus(), "A");
    assert_eq!(world.locate(hero).map(|(room, c)| (room.to_string(), c.position())),
        Some(("A".to_string(), Position::new(2, 2))));
    assert!(!world.room("B").expect("room B").contains(hero));

    for room in world.rooms() {
        room.check_invariants()?;
    }
    Ok(())
}

#[test]
fn test_stepping_through_portal_and_back() -> WayfarerResult<()> {
    let mut world = linked_world()?;
    let hero = world.place_hero(Entity::character("Hero"), Position::new(1, 2))?;

    let outcome = world.step(hero, Direction::East)?;
    assert_eq!(
        outcome,
        StepOutcome::Portaled { room: "B".to_string(), position: Position::new(0, 0) }
    );

    // Arriving on a portal does not bounce the hero back
    assert_eq!(world.focus(), "B");
    assert_eq!(world.step(hero, Direction::East)?, StepOutcome::Moved(Position::new(1, 0)));

    let outcome = world.step(hero, Direction::West)?;
    assert_eq!(
        outcome,
        StepOutcome::Portaled { room: "A".to_string(), position: Position::new(2, 2) }
    );
    assert_eq!(world.focus(), "A");
    Ok(())
}

#[test]
fn test_explicit_layer_on_occupied_cell_grows_room() -> WayfarerResult<()> {
    let mut room = Room::new("shrine", 3, 3);
    let statue = Entity::terrain("Statue", false);
    let statue_id = statue.id;
    room.add_entity(statue, Position::new(1, 1), 0)?;
    assert_eq!(room.depth(), 1);

    let offering = Entity::item("Offering");
    let offering_id = offering.id;
    let coords = room.add_entity(offering, Position::new(1, 1), 0)?;

    assert_eq!(coords, Coords::new(1, 1, 1));
    assert_eq!(room.depth(), 2);
    assert_eq!(room.get_coords(statue_id), Some(Coords::new(1, 1, 0)));
    assert_eq!(room.get_coords(offering_id), Some(Coords::new(1, 1, 1)));
    room.check_invariants()?;
    Ok(())
}

#[test]
fn test_center_camera_puts_entity_on_center_tile() -> WayfarerResult<()> {
    assert_eq!((VIEWPORT_WIDTH, VIEWPORT_HEIGHT), (16, 16));

    let mut room = open_room("meadow", 24, 24)?;
    let hero = Entity::character("Hero");
    let id = hero.id;
    room.place_entity(hero, Position::new(5, 5))
        .map_err(|r| wayfarer::WayfarerError::InvalidAction(format!("{:?}", r.reason)))?;
    room.center_camera(id)?;

    let sprite = room
        .sprites()
        .into_iter()
        .find(|s| s.entity == id)
        .expect("hero sprite");
    assert_eq!(sprite.screen.x, (VIEWPORT_WIDTH / 2) * TILE_SIZE + VIEWPORT_OFFSET_X);
    assert_eq!(sprite.screen.y, (VIEWPORT_HEIGHT / 2) * TILE_SIZE + VIEWPORT_OFFSET_Y);
    assert_eq!(room.get_coords(id), Some(Coords::new(5, 5, 1)));
    Ok(())
}

#[test]
fn test_hero_camera_follows_steps() -> WayfarerResult<()> {
    let field = open_room("field", 30, 30)?;
    let mut world = World::new(vec![field], "field")?;
    let hero = world.place_hero(Entity::character("Hero"), Position::new(10, 10))?;

    let screen_before = world.focused_room()?.sprites().into_iter().find(|s| s.entity == hero).map(|s| s.screen);
    for direction in [Direction::East, Direction::East, Direction::South] {
        assert!(world.step(hero, direction)?.moved());
    }
    let screen_after = world.focused_room()?.sprites().into_iter().find(|s| s.entity == hero).map(|s| s.screen);

    // The camera pans with the hero, so the hero stays put on screen
    assert_eq!(screen_before, screen_after);
    assert_eq!(
        world.focused_room()?.get_coords(hero).map(Coords::position),
        Some(Position::new(12, 11))
    );
    Ok(())
}

#[test]
fn test_consumed_item_leaves_index() -> WayfarerResult<()> {
    let mut world = linked_world()?;
    let hero = world.place_hero(Entity::character("Hero"), Position::new(0, 1))?;
    world
        .focused_room_mut()?
        .place_entity(Entity::item("Apple"), Position::new(1, 1))
        .map_err(|r| wayfarer::WayfarerError::InvalidAction(format!("{:?}", r.reason)))?;

    world.step(hero, Direction::East)?;
    world.step(hero, Direction::West)?;
    world.step(hero, Direction::East)?;
    assert_eq!(world.facing_cell(hero)?, Position::new(2, 1));

    let room = world.focused_room_mut()?;
    let apple = room
        .entities_of(Category::Item)
        .next()
        .map(|e| e.id)
        .expect("apple");
    room.remove_entity(apple, Position::new(1, 1))?;
    assert_eq!(room.entities_of(Category::Item).count(), 0);
    assert_eq!(room.get_entities(Position::new(1, 1)).len(), 2);
    room.check_invariants()?;
    Ok(())
}
