use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use floormap::config::{ConfigError, InteractionConfig};
use floormap::replay::{self, ReplayError, Script};
use floormap::sensor::SensorRegistry;
use floormap::simulator::Simulator;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floormap", about = "Floor-plan map interaction engine tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a JSON input script through the engine and print the report.
    Replay {
        script: PathBuf,
        /// Interaction tuning JSON; defaults apply when omitted.
        #[arg(long, env = "FLOORMAP_CONFIG")]
        config: Option<PathBuf>,
        /// Print the report on one line.
        #[arg(long)]
        compact: bool,
    },
    /// Print simulated readings for the default sensors.
    Simulate {
        #[arg(long, default_value_t = 5)]
        ticks: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print the default interaction config.
    Config,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay { script, config, compact } => run_replay(&script, config.as_deref(), compact),
        Command::Simulate { ticks, seed } => run_simulate(ticks, seed),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&InteractionConfig::default())?);
            Ok(())
        }
    }
}

fn run_replay(script: &Path, config: Option<&Path>, compact: bool) -> Result<(), CliError> {
    let config = match config {
        Some(path) => InteractionConfig::from_json(&read(path)?)?,
        None => InteractionConfig::default(),
    };
    let script = Script::from_json(&read(script)?)?;
    let report = replay::run(script, config)?;
    let out = if compact { serde_json::to_string(&report)? } else { serde_json::to_string_pretty(&report)? };
    println!("{out}");
    Ok(())
}

fn run_simulate(ticks: u32, seed: u64) -> Result<(), CliError> {
    let mut sensors = SensorRegistry::with_defaults();
    let mut simulator = Simulator::seeded(seed);
    for tick in 0..ticks {
        let readings = simulator.next_readings(sensors.as_slice());
        sensors.apply_readings(&readings);
        println!("{}", serde_json::json!({ "tick": tick, "sensors": sensors.as_slice() }));
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}
