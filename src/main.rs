//! Petsprite headless driver.
//!
//! Loads the frame assets, spawns a handful of pets into a `bevy_ecs` world
//! and runs the simulation for a fixed number of frames, rendering every
//! frame into a recording canvas. A summary of what happened is logged at
//! the end.
//!
//! # Main Loop
//!
//! 1. Load configuration (optional INI file) and the asset directory
//! 2. Insert resources, register observers, spawn pets
//! 3. For each frame:
//!    - advance `WorldTime`
//!    - move every pet, then run its behavior and animation
//!    - draw the arena and the pets
//! 4. Log per-pet final state and run totals
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --assets mixer/out --pets 4 --ticks 1200
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{debug, error, info};

use petsprite::components::mapposition::MapPosition;
use petsprite::components::pet::Pet;
use petsprite::error::PetError;
use petsprite::events::animation::AnimationEndedEvent;
use petsprite::events::petstate::PetStateChangedEvent;
use petsprite::resources::assetstore::AssetStore;
use petsprite::resources::canvas::RecordingCanvas;
use petsprite::resources::petconfig::PetConfig;
use petsprite::resources::worldtime::WorldTime;
use petsprite::systems::pet::{pet_behavior_system, pet_physics_system, spawn_pets};
use petsprite::systems::render::{render_background, render_pets};
use petsprite::systems::time::update_world_time;

/// Headless virtual pet simulation
#[derive(Parser)]
#[command(version, about = "Runs virtual pets headless and reports what they did.")]
struct Cli {
    /// Directory holding `bodies/*.json` and `bodyparts/*.json`.
    #[arg(long, value_name = "DIR", default_value = "assets")]
    assets: PathBuf,

    /// INI file overriding the default tunables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of pets to spawn.
    #[arg(long, default_value_t = 3)]
    pets: usize,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seed for variant choice and behavior rolls. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

/// Totals collected by the observers.
#[derive(Resource, Default, Debug)]
struct RunStats {
    transitions: usize,
    animation_ends: usize,
    draw_commands: usize,
    skipped_renders: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), PetError> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = PetConfig::with_path(path);
            config.load_from_file()?;
            config
        }
        None => PetConfig::new(),
    };
    let store = AssetStore::load_dir(&cli.assets)?;
    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    info!("Running {} pets for {} frames (seed {})", cli.pets, cli.ticks, seed);

    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(config);
    world.insert_resource(store);
    world.init_resource::<RunStats>();

    world.add_observer(
        |trigger: On<PetStateChangedEvent>, mut stats: ResMut<RunStats>| {
            let ev = trigger.event();
            debug!("{:?}: {} -> {}", ev.entity, ev.from, ev.to);
            stats.transitions += 1;
        },
    );
    world.add_observer(|_trigger: On<AnimationEndedEvent>, mut stats: ResMut<RunStats>| {
        stats.animation_ends += 1;
    });

    let pets = spawn_pets(&mut world, cli.pets, seed)?;

    let mut schedule = Schedule::default();
    schedule.add_systems((pet_physics_system, pet_behavior_system).chain());

    let dt = 1.0 / cli.fps.max(1) as f32;
    let mut canvas = RecordingCanvas::new();
    for _ in 0..cli.ticks {
        update_world_time(&mut world, dt);
        schedule.run(&mut world);

        canvas.clear();
        let arena = world.resource::<PetConfig>().physics;
        render_background(&mut canvas, &arena);
        let drawn = render_pets(&mut world, &mut canvas);

        let mut stats = world.resource_mut::<RunStats>();
        stats.draw_commands += canvas.commands().len();
        stats.skipped_renders += pets.len().saturating_sub(drawn);
    }

    for entity in &pets {
        if let (Some(pet), Some(position)) =
            (world.get::<Pet>(*entity), world.get::<MapPosition>(*entity))
        {
            let pos = position.pos;
            info!(
                "{:?}: {} at ({:.1}, {:.1}), {} rebuilds",
                entity,
                pet.state(),
                pos.x,
                pos.y,
                pet.player().rebuild_count()
            );
        }
    }
    let time = world.resource::<WorldTime>();
    let stats = world.resource::<RunStats>();
    info!(
        "Simulated {:.1}s in {} frames: {} transitions, {} animation ends, {} draw commands, {} skipped renders",
        time.elapsed,
        time.frame_count,
        stats.transitions,
        stats.animation_ends,
        stats.draw_commands,
        stats.skipped_renders
    );
    Ok(())
}
