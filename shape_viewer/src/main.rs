mod convert;
mod video;
mod window;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use shape_vision::config::StrategyKind;
use shape_vision::{
    ImageFileSource, PipelineConfig, RunConfig, RunSummary, ShapePipeline, ShapeVisionError,
    run_still, run_stream,
};

use crate::video::VideoFileSource;
use crate::window::HighGuiWindow;

#[derive(Parser, Debug)]
#[command(name = "shape_viewer", about = "Detect and mark geometric shapes in images and videos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate a still image and wait for any key.
    Image(InputArgs),
    /// Annotate a video frame by frame until it ends or the quit key is pressed.
    Video {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = 'q')]
        quit_key: char,
    },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Image or video file to process.
    path: PathBuf,
    #[arg(long, value_enum, default_value_t = Strategy::ColorRange)]
    strategy: Strategy,
    /// TOML file overriding the strategy preset.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, default_value = "Detected Shapes")]
    window_title: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    /// Remove a green background band in HSV space.
    ColorRange,
    /// Canny edges, for scenes without a uniform background.
    Edge,
}

impl From<Strategy> for StrategyKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::ColorRange => StrategyKind::ColorRange,
            Strategy::Edge => StrategyKind::Edge,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Image(input) => run_image(&input),
        Command::Video { input, quit_key } => run_video(&input, quit_key),
    }
}

fn run_image(input: &InputArgs) -> Result<()> {
    // --- 1. Pipeline Setup ---
    let pipeline = build_pipeline(input)?;

    // --- 2. Input & Display Initialization ---
    let Some(source) = report_open_failure(ImageFileSource::open(&input.path))? else {
        return Ok(());
    };
    let window = HighGuiWindow::open(&input.window_title).context("failed to open display window")?;

    // --- 3. Show Until Dismissed ---
    let summary = run_still(source, window, &pipeline)?;
    log_summary(&summary);
    Ok(())
}

fn run_video(input: &InputArgs, quit_key: char) -> Result<()> {
    // --- 1. Pipeline Setup ---
    let pipeline = build_pipeline(input)?;

    // --- 2. Video I/O Initialization ---
    let Some(source) = report_open_failure(VideoFileSource::open(&input.path))? else {
        return Ok(());
    };
    let window = HighGuiWindow::open(&input.window_title).context("failed to open display window")?;

    // --- 3. Main Processing Loop ---
    let run_config = RunConfig {
        quit_key,
        ..RunConfig::default()
    };
    let summary = run_stream(source, window, &pipeline, &run_config)?;
    log_summary(&summary);
    Ok(())
}

fn build_pipeline(input: &InputArgs) -> Result<ShapePipeline> {
    let kind = StrategyKind::from(input.strategy);
    let config = match &input.config {
        Some(path) => PipelineConfig::load(path, kind)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::preset(kind),
    };
    Ok(ShapePipeline::new(&config)?)
}

/// An input that cannot be opened ends the invocation with a diagnostic, not an
/// error exit. The message goes to stderr directly so it survives `RUST_LOG=off`.
fn report_open_failure<S>(opened: shape_vision::Result<S>) -> Result<Option<S>> {
    match opened {
        Ok(source) => Ok(Some(source)),
        Err(e @ ShapeVisionError::Open { .. }) => {
            eprintln!("Error: {}", e);
            debug!("open failure: {:?}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn log_summary(summary: &RunSummary) {
    info!(
        "done: {} frames, {} shapes, stopped by {:?}",
        summary.frames_processed, summary.shapes_detected, summary.stop_reason
    );
}
