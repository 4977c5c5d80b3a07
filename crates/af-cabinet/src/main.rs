//! af-cabinet: run a headless ArcadeForge session and print its summary
//!
//! Usage:
//!   af-cabinet --seconds 120 --seed 7
//!   af-cabinet --config cabinet.json --skip-intro --fps 30
//!   RUST_LOG=debug af-cabinet --idle

use std::path::PathBuf;

use af_cabinet::{Cabinet, ScriptedPlayer};
use af_core::CabinetConfig;
use anyhow::{Context, Result, bail};
use clap::Parser;

#[derive(Parser)]
#[command(name = "af-cabinet", about = "Headless ArcadeForge cabinet")]
struct Cli {
    /// JSON cabinet config (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated seconds
    #[arg(short, long, default_value_t = 120.0)]
    seconds: f32,

    /// Frames per second (config frame_rate when omitted)
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for wheels and player
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Start playing without waiting for a button
    #[arg(long)]
    skip_intro: bool,

    /// No scripted player, just step the loop
    #[arg(long)]
    idle: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CabinetConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CabinetConfig::default(),
    };

    let fps = cli.fps.unwrap_or(config.timing.frame_rate);
    if fps == 0 {
        bail!("fps must be positive");
    }

    let mut cabinet = Cabinet::new(config, cli.seed).context("building cabinet")?;
    cabinet.start(cli.skip_intro);

    let mut player = ScriptedPlayer::new(cli.seed.wrapping_add(1));
    let player = if cli.idle { None } else { Some(&mut player) };
    cabinet.run(cli.seconds, fps, player);

    let summary = cabinet.summary();
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing summary")?
    );
    Ok(())
}
