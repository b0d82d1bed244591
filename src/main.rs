use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use lenny::config::GameConfig;
use lenny::domain::entity::FrameInput;
use lenny::logging;
use lenny::sim::event::GameEvent;
use lenny::sim::level::{self, LevelError};
use lenny::sim::step;
use lenny::sim::world::{Phase, WorldState};

/// Ticks between jump presses in the `run` script.
const JUMP_INTERVAL: u64 = 45;

/// Headless runner for Lenny's Toast Run levels
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Level file to run instead of the level list
    #[arg(long)]
    level: Option<PathBuf>,

    /// Index into the level list (levels/ directory, else built-in)
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Config file to use instead of searching for config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1800)]
    ticks: u64,

    /// Scripted input fed to the player
    #[arg(long, value_enum, default_value_t = Script::Run)]
    script: Script,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Script {
    /// No input at all: the timer never starts.
    Idle,
    /// Hold right, hop periodically, confirm every tick.
    Run,
}

impl Script {
    fn input(self, tick: u64) -> FrameInput {
        match self {
            Script::Idle => FrameInput::default(),
            Script::Run => FrameInput {
                right: true,
                jump: tick % JUMP_INTERVAL == 0,
                confirm: true,
                ..FrameInput::default()
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::load(),
    };

    let def = match &cli.level {
        Some(path) => level::load_level_file(path)?,
        None => level::available_levels(&config)
            .into_iter()
            .nth(cli.index)
            .ok_or(LevelError::NoLevels)?,
    };

    let mut world = WorldState::new(&config);
    level::load_level(&mut world, &def);
    info!(
        "running '{}' for {} ticks ({} enemies, {} toasts)",
        world.level_name,
        cli.ticks,
        world.enemies.len(),
        world.toasts.len()
    );

    for tick in 0..cli.ticks {
        let events = step::step(&mut world, cli.script.input(tick));
        report(&events);
        if world.phase == Phase::Complete {
            break;
        }
    }

    match &world.result {
        Some(result) => {
            println!("{} complete", world.level_name);
            println!("  raw time    {:>8.2}s", result.raw_time);
            println!("  toasts      {:>8}", result.toast_count);
            println!("  sockroaches {:>8}", result.sockroach_kills);
            println!("  lives lost  {:>8}", result.lives_lost);
            println!("  final time  {:>8.2}s", result.final_time);
        }
        None => {
            println!("{} not completed after {} ticks", world.level_name, world.tick);
            println!("  elapsed     {:>8.2}s", world.elapsed_secs());
            println!("  toasts left {:>8}", world.toasts_left());
            println!("  sockroaches {:>8}", world.live_enemies());
            println!("  health      {:>8}", world.player.health);
        }
    }

    Ok(())
}

fn report(events: &[GameEvent]) {
    for event in events {
        match event {
            // Once per tick; too noisy for info.
            GameEvent::TimerTick { .. } => {}
            GameEvent::LevelCompleted(result) => info!("level complete in {:.2}s", result.final_time),
            other => info!("{:?}", other),
        }
    }
}
