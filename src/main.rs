//! Village Sim - Entry Point
//!
//! Builds the farming village (or loads a snapshot), runs a number of turns
//! and prints a one-line summary per turn.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use village_sim::core::config::SimulationConfig;
use village_sim::core::error::{Result, SimError};
use village_sim::persistence::Snapshot;
use village_sim::simulation::GameLoop;

#[derive(Parser, Debug)]
#[command(name = "village-sim")]
#[command(about = "Run the farming village simulation for a number of turns")]
struct Args {
    /// Turns to run
    #[arg(long, default_value_t = 12)]
    turns: u32,

    /// TOML file overriding the default limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the weather generator
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from a snapshot instead of building a fresh village
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a snapshot here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("village_sim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.weather_seed = seed;
    }

    let mut game = match &args.load {
        Some(path) => {
            let sim = Snapshot::load(path)?.restore(&config)?;
            GameLoop::from_parts(config, sim)
        }
        None => new_village(config)?,
    };

    if !game.initialize() || !game.start() {
        return Err(SimError::Config("engine failed to start".to_string()));
    }

    println!("\n=== VILLAGE SIM ===");
    println!("{}", game.sim().clock.description());
    println!();

    for _ in 0..args.turns {
        if !game.process_turn() {
            break;
        }
        println!("{}", game.summary());
    }

    let stats = game.stats();
    println!();
    println!("{}", game.sim().clock.description());
    println!(
        "{} turns, {} actions ({} succeeded, {} failed, {} invalid)",
        stats.turns_processed,
        stats.total_actions,
        stats.successful,
        stats.failed + stats.blocked,
        stats.invalid
    );
    println!(
        "{} events logged, {} decisions recorded",
        game.events().total_logged(),
        game.decisions().stats().total
    );

    if let Some(path) = &args.save {
        Snapshot::capture(game.sim()).save(path)?;
        println!("Saved to {}", path.display());
    }

    game.stop();
    Ok(())
}

/// The preset village with the player and three villagers
fn new_village(config: SimulationConfig) -> Result<GameLoop> {
    let mut game = GameLoop::village(config)?;
    let sim = game.sim_mut();
    let location = |name: &str| {
        sim.world
            .get_by_name(name)
            .map(|l| l.id)
            .ok_or_else(|| SimError::Config(format!("village has no {}", name)))
    };
    let square = location("Village Square")?;
    let store = location("General Store")?;
    let house_1 = location("House 1")?;
    let house_2 = location("House 2")?;

    sim.add_player("Player", square)?;
    sim.add_villager("Tom", "Farmer", house_1)?;
    sim.add_villager("Mary", "Merchant", store)?;
    sim.add_villager("Sam", "Baker", house_2)?;
    Ok(game)
}
