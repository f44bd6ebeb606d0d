#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tallgrass experience.

mod map;
mod profile;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tallgrass_core::{CANVAS_HEIGHT, CANVAS_WIDTH};
use tallgrass_rendering::{CanvasPresentation, Color, Presentation, RenderingBackend, Scene};
use tallgrass_rendering_macroquad::MacroquadBackend;
use tallgrass_world::{query, CollectibleSpec, World, WorldConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    profile::LocalProfile,
    simulation::{Simulation, SimulationConfig},
};

/// Command-line arguments for launching Tallgrass.
#[derive(Debug, Parser)]
#[command(name = "tallgrass", about = "Explore Pellet Town and battle in the tall grass.")]
struct Args {
    /// Seed for glowing point placement and battle rolls.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML map to load instead of the built-in town.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,
    /// JSON file the profile is loaded from and saved to.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
    /// Forces vertical sync on.
    #[arg(long, conflicts_with = "no_vsync")]
    vsync: bool,
    /// Forces vertical sync off.
    #[arg(long)]
    no_vsync: bool,
    /// Logs a frame-rate report once per second.
    #[arg(long)]
    show_fps: bool,
    /// Draws primitives instead of loading the sprite atlas.
    #[arg(long)]
    no_sprites: bool,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

impl Args {
    fn vsync(&self) -> Option<bool> {
        if self.vsync {
            Some(true)
        } else if self.no_vsync {
            Some(false)
        } else {
            None
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Entry point for the Tallgrass command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let layout = map::load(args.map.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(seed, "starting Tallgrass");

    let specs = CollectibleSpec::defaults();
    let world = World::new(&layout, specs.clone(), WorldConfig::default(), &mut rng)
        .context("failed to build the overworld")?;

    let profile = LocalProfile::open(args.save.clone());
    for item in profile.inventory() {
        info!(item = %item.name, "holding");
    }

    let canvas = CanvasPresentation::new(CANVAS_WIDTH, CANVAS_HEIGHT)?;
    let mut scene = Scene::new(query::welcome_banner(&world));
    let config = SimulationConfig {
        canvas,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(world, profile, rng, specs, config);
    simulation.hydrate(&mut scene);

    let presentation = Presentation::new(
        "Tallgrass",
        Color::from_rgb_u8(0x10, 0x18, 0x10),
        canvas,
        scene,
    );

    let mut backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_sprite_loading(!args.no_sprites);
    if let Some(enabled) = args.vsync() {
        backend = backend.with_vsync(enabled);
    }

    backend.run(presentation, move |_, input, scene| {
        simulation.step(input, scene);
    })
}
