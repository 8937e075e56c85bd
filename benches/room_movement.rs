use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wayfarer::{Direction, Entity, Position, Room, World};

fn open_world(size: u32) -> World {
    let mut room = Room::new("plain", size, size);
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            room.add_entity(Entity::terrain("Grass", true), Position::new(x, y), 0)
                .expect("tile");
        }
    }
    World::new(vec![room], "plain").expect("world")
}

fn bench_hero_steps(c: &mut Criterion) {
    let mut world = open_world(64);
    let hero = world
        .place_hero(Entity::character("Hero"), Position::new(32, 32))
        .expect("hero");

    c.bench_function("hero_step_back_and_forth", |b| {
        b.iter(|| {
            world.step(hero, black_box(Direction::East)).expect("step");
            world.step(hero, black_box(Direction::West)).expect("step");
            world.drain_events();
        })
    });
}

fn bench_center_camera(c: &mut Criterion) {
    let mut world = open_world(64);
    let hero = world
        .place_hero(Entity::character("Hero"), Position::new(10, 50))
        .expect("hero");

    c.bench_function("center_camera_64x64", |b| {
        b.iter(|| {
            let room = world.focused_room_mut().expect("room");
            room.center_camera(black_box(hero)).expect("center");
        })
    });
}

fn bench_find_path(c: &mut Criterion) {
    let mut world = open_world(64);
    let hero = world
        .place_hero(Entity::character("Hero"), Position::new(0, 0))
        .expect("hero");
    let room = world.focused_room().expect("room");

    c.bench_function("find_path_corner_to_corner", |b| {
        b.iter(|| room.find_path(hero, black_box(Position::new(63, 63))))
    });
}

criterion_group!(benches, bench_hero_steps, bench_center_camera, bench_find_path);
criterion_main!(benches);
