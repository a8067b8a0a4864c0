//! Neon Siege headless runner
//!
//! Seeds a session, lets the autopilot play it at a fixed timestep and
//! prints the run summary as JSON.
//!
//! Usage:
//!   cargo run --release -- --seed 42
//!   RUST_LOG=debug cargo run -- --config balance.json --progress progress.json

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use neon_siege::GameConfig;
use neon_siege::audio::{AudioBackend, AudioManager, SoundEffect, Tone};
use neon_siege::consts::FRAME_DT;
use neon_siege::progress::{JsonFileProgress, MemoryProgress, ProgressStore};
use neon_siege::sim::{Session, TickInput, tick};

#[derive(Parser)]
#[command(name = "neon-siege")]
#[command(about = "Run a Neon Siege session on autopilot and print its summary")]
struct Args {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Give up after this many frames
    #[arg(long, default_value_t = 60 * 60 * 10)]
    frames: u32,

    /// Seconds per frame
    #[arg(long, default_value_t = FRAME_DT)]
    dt: f32,

    /// Balance overrides (JSON, partial allowed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist conquered sections to this JSON file
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Write the summary here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Logs cues instead of playing them
struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32, tones: &[Tone]) {
        log::trace!("cue {effect:?} at {volume:.2} ({} tones)", tones.len());
    }
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let Some(path) = &args.config else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let progress: Box<dyn ProgressStore> = match &args.progress {
        Some(path) => Box::new(JsonFileProgress::load(path)),
        None => Box::new(MemoryProgress::new()),
    };

    let audio = Rc::new(RefCell::new(AudioManager::new(&config.audio, Box::new(LogBackend))));
    audio.borrow_mut().init();

    let mut session = Session::new(config, args.seed, progress);
    session.subscribe(Box::new(audio.clone()));
    log::info!(
        "Previously conquered: {:?}",
        session.conquered_sections()
    );

    let input = TickInput {
        idle_mode: true,
        ..TickInput::default()
    };
    let mut frames = 0;
    while frames < args.frames {
        tick(&mut session, &input, args.dt);
        frames += 1;
        if session.phase().is_terminal() {
            break;
        }
    }
    log::info!("Stopped after {frames} frames in {:?}", session.phase());

    session.teardown();
    audio.borrow_mut().teardown();

    let summary = serde_json::to_string_pretty(&session.summary()).context("failed to encode summary")?;
    match &args.output {
        Some(path) => std::fs::write(path, summary)
            .with_context(|| format!("failed to write summary {}", path.display()))?,
        None => println!("{summary}"),
    }
    Ok(())
}
