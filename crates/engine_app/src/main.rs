//! # engine_app: demo game
//!
//! A small asteroid-shooter scene running on the core engine. Input is
//! scripted, so the demo runs headless and exits on its own.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments and install the log subscriber.
//! 2. Load archetypes (the bundled set, or `--archetypes <path>`).
//! 3. Register systems: Input, Physics, Graphics, Audio, GameState, Logic,
//!    then the entity factory.
//! 4. Initialise, run the game loop, and tear the systems down.

mod audio;
mod graphics;
mod input;
mod logic;
mod physics;
mod state;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_core::{ArchetypeSet, CoreEngine, EngineConfig};

use audio::AudioSystem;
use graphics::GraphicsSystem;
use input::InputSystem;
use logic::LogicSystem;
use physics::PhysicsSystem;
use state::GameStateSystem;

/// The archetypes shipped with the demo.
pub(crate) const DEFAULT_ARCHETYPES: &str = include_str!("../assets/archetypes.json");

#[derive(Parser)]
#[command(name = "engine_app", about = "Headless demo scene for the core engine")]
struct Args {
    /// Target frames per second (0 runs uncapped)
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Stop after this many frames (0 = until the game exits)
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Archetype document to load instead of the bundled one
    #[arg(short, long)]
    archetypes: Option<PathBuf>,

    /// Step every frame by the nominal frame time
    #[arg(long)]
    fixed: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();

    let archetypes = match &args.archetypes {
        Some(path) => {
            info!(path = %path.display(), "loading archetypes");
            ArchetypeSet::from_path(path)?
        }
        None => ArchetypeSet::from_json(DEFAULT_ARCHETYPES)?,
    };
    info!(archetypes = archetypes.archetypes.len(), "archetypes loaded");

    let config = EngineConfig::default()
        .with_frame_rate(args.fps)
        .with_max_frames(args.frames)
        .with_fixed_timestep(args.fixed);

    let mut engine = CoreEngine::new(config);
    engine.add_system(InputSystem::scripted());
    engine.add_system(PhysicsSystem::new());
    engine.add_system(GraphicsSystem::new());
    engine.add_system(AudioSystem::new());
    engine.add_system(GameStateSystem::new("play"));
    engine.add_system(LogicSystem::new(archetypes));
    engine.add_factory_system();

    engine.initialize()?;
    engine.game_loop();
    engine.destroy_systems();

    info!("engine shut down");
    Ok(())
}
