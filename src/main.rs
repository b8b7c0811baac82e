use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use plexus::error::RunError;
use plexus::{headless, window, FieldConfig, NeighborStrategy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Brute,
    Grid,
    Quadtree,
}

impl From<Strategy> for NeighborStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Brute => NeighborStrategy::BruteForce,
            Strategy::Grid => NeighborStrategy::default(),
            Strategy::Quadtree => NeighborStrategy::quad_tree(),
        }
    }
}

/// Animated particle field with distance-faded connections.
#[derive(Debug, Parser)]
#[command(name = "plexus", version, about)]
struct Args {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Neighbor search strategy. Overrides the configuration file.
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Number of particles. Overrides the area-based default.
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Connection distance in pixels.
    #[arg(short, long)]
    distance: Option<f32>,

    /// Seed for the initial particle layout.
    #[arg(long)]
    seed: Option<u64>,

    /// Cap the frame rate.
    #[arg(long)]
    max_fps: Option<f32>,

    /// Render this many frames offscreen instead of opening a window.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,

    /// PNG written in headless mode.
    #[arg(short, long, default_value = "plexus.png")]
    output: PathBuf,

    /// Headless surface width.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Headless surface height.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    fn field_config(&self) -> Result<FieldConfig, RunError> {
        let mut config = match &self.config {
            Some(path) => FieldConfig::load(path)?,
            None => FieldConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy.into());
        }
        if let Some(count) = self.count {
            config = config.with_particle_count(count);
        }
        if let Some(distance) = self.distance {
            config = config.with_connection_distance(distance);
        }
        if let Some(max_fps) = self.max_fps {
            config = config.with_max_fps(max_fps);
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> Result<(), RunError> {
    let config = args.field_config()?;
    log::info!("neighbor strategy: {}", config.strategy);

    match args.headless {
        Some(frames) => {
            let seed = args.seed.unwrap_or(0);
            let canvas = headless::render_offscreen(&config, args.width, args.height, frames, seed)?;
            canvas.save_png(&args.output)?;
            println!("wrote {}", args.output.display());
            Ok(())
        }
        None => window::run(config, args.seed),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
