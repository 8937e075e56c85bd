//! # Wayfarer Main Entry Point
//!
//! Loads a world document, drives the hero with scripted or random steps,
//! and reports what happened.

use clap::Parser;
use log::{error, info};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::path::PathBuf;
use wayfarer::{
    Direction, EntityId, Position, StepOutcome, WayfarerError, WayfarerResult, World, WorldConfig,
    WorldEvent,
};

/// The world bundled with the binary.
const DEMO_WORLD: &str = include_str!("../assets/demo_world.json");

/// Command line arguments for Wayfarer.
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "Walk a hero through a tile-based room world")]
#[command(version)]
struct Args {
    /// World document to load instead of the bundled demo
    #[arg(short, long)]
    world: Option<PathBuf>,

    /// Scripted steps, one letter per step (N, S, E, W)
    #[arg(short, long)]
    moves: Option<String>,

    /// Walk to this cell of the focused room, written as `x,y`
    #[arg(long)]
    goto: Option<String>,

    /// Number of random steps to take after the scripted ones
    #[arg(long, default_value_t = 0)]
    wander: usize,

    /// Random seed for wandering
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> WayfarerResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Wayfarer v{}", wayfarer::VERSION);

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> WayfarerResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init()
            .map_err(|e| WayfarerError::InvalidState(format!("Logging setup failed: {}", e)))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .try_init()
            .map_err(|e| WayfarerError::InvalidState(format!("Logging setup failed: {}", e)))?;
    }

    Ok(())
}

fn run(args: &Args) -> WayfarerResult<()> {
    let config = match &args.world {
        Some(path) => {
            info!("Loading world from {}", path.display());
            WorldConfig::from_path(path)?
        }
        None => WorldConfig::from_json(DEMO_WORLD)?,
    };
    let mut world = config.build()?;
    let hero = world
        .hero()
        .ok_or_else(|| WayfarerError::InvalidState("World has no hero".to_string()))?;

    if let Some(moves) = &args.moves {
        for letter in moves.chars().filter(|c| !c.is_whitespace()) {
            let direction: Direction = letter.to_string().parse()?;
            world.step(hero, direction)?;
        }
    }

    if let Some(goto) = &args.goto {
        let target = parse_cell(goto)?;
        match world.walk_to(hero, target)? {
            Some(steps) => info!("Walked {} steps towards {}", steps, target),
            None => info!("No path to {} in {}", target, world.focus()),
        }
    }

    if args.wander > 0 {
        wander(&mut world, hero, args.wander, args.seed.unwrap_or(0))?;
    }

    for event in world.drain_events() {
        report(&event);
    }
    print_summary(&world, hero)
}

/// Takes `steps` random steps with the hero.
fn wander(world: &mut World, hero: EntityId, steps: usize, seed: u64) -> WayfarerResult<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let directions = Direction::all();
    let mut blocked = 0;

    for _ in 0..steps {
        let Some(direction) = directions.choose(&mut rng) else {
            break;
        };
        if world.step(hero, *direction)? == StepOutcome::Blocked {
            blocked += 1;
        }
    }

    info!("Wandered {} steps, {} blocked", steps, blocked);
    Ok(())
}

fn parse_cell(text: &str) -> WayfarerResult<Position> {
    let invalid = || WayfarerError::InvalidAction(format!("Expected x,y but got {}", text));
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(Position::new(x, y))
}

fn report(event: &WorldEvent) {
    match event {
        WorldEvent::EntityMoved { room, from, to, .. } => {
            info!("[{}] moved {} -> {}", room, from, to)
        }
        WorldEvent::EntityBlocked { room, at, facing, .. } => {
            info!("[{}] bumped at {} facing {:?}", room, at, facing)
        }
        WorldEvent::EntityPortaled {
            from_room,
            to_room,
            portal,
            arrival,
            ..
        } => info!("[{}] took {} into {} at {}", from_room, portal, to_room, arrival),
        WorldEvent::FocusChanged { from, to } => info!("focus {} -> {}", from, to),
    }
}

fn print_summary(world: &World, hero: EntityId) -> WayfarerResult<()> {
    let room = world.focused_room()?;
    let coords = room.get_coords(hero).ok_or_else(|| WayfarerError::EntityNotFound {
        entity: hero,
        room: room.name().to_string(),
    })?;
    let facing = room.entity(hero).map(|e| e.facing).unwrap_or_default();

    println!("Room:    {} ({}x{}, {} layers)", room.name(), room.width(), room.height(), room.depth());
    println!("Hero:    ({}, {}) layer {} facing {:?}", coords.x, coords.y, coords.z, facing);
    println!("Camera:  pan {}", room.pan());
    println!("Visible: {} sprites", room.visible_sprites().len());

    let ahead: Vec<&str> = world
        .entities_in_front(hero)?
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    if !ahead.is_empty() {
        println!("Ahead:   {}", ahead.join(", "));
    }
    Ok(())
}
