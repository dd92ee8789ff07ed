#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives headless Retro Hunter sessions.

mod arena;
mod leaderboard;
mod session;
mod summary;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use retro_hunter_core::{Leaderboard, RankTier};
use retro_hunter_world::GameConfig;
use tracing_subscriber::EnvFilter;

use crate::{
    leaderboard::OfflineLeaderboard,
    session::{Session, ShooterProfile},
};

/// Scores already present on the offline leaderboard.
const OFFLINE_SCORES: [u64; 12] = [
    250_000, 180_000, 120_000, 90_000, 60_000, 45_000, 30_000, 20_000, 12_000, 8_000, 4_000, 1_000,
];

#[derive(Parser)]
#[command(name = "retro-hunter", about = "Headless Retro Hunter simulator", version)]
struct Cli {
    /// TOML file overriding the built-in tuning.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed overriding the configured one.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted run and report how it went.
    Simulate(SimulateArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args)]
struct SimulateArgs {
    /// Simulated time budget in seconds.
    #[arg(long, default_value_t = 180.0)]
    seconds: f32,

    /// Frames simulated per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Probability that the scripted shooter hits a live enemy.
    #[arg(long, default_value_t = 0.6)]
    accuracy: f64,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.seed)?;

    match cli.command {
        Commands::Simulate(args) => simulate(config, &args),
        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>, seed: Option<u64>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            GameConfig::from_toml_str(&contents)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

fn simulate(config: GameConfig, args: &SimulateArgs) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&args.accuracy),
        "accuracy must be within [0, 1], got {}",
        args.accuracy
    );
    ensure!(args.fps > 0, "fps must be positive");
    ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "seconds must be a non-negative number"
    );

    let frame = Duration::from_secs(1) / args.fps;
    let frames = (args.seconds * args.fps as f32).round() as u32;
    tracing::info!(seed = config.seed, frames, "simulating");

    let profile = ShooterProfile {
        accuracy: args.accuracy,
    };
    let mut summary = Session::new(config, profile).run(frames, frame);

    let mut board = OfflineLeaderboard::with_scores(OFFLINE_SCORES.to_vec());
    let outcome = board.submit(summary.score);
    if let Err(error) = &outcome {
        tracing::warn!(%error, "leaderboard submission failed");
    }
    summary.leaderboard_rank = outcome.as_ref().ok().copied();
    summary.rank_tier = Some(RankTier::from_submission(&outcome));

    if args.json {
        println!("{}", summary.to_json().context("failed to encode report")?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
