// ABOUTME: Main application entry point.
// ABOUTME: Parses flags, loads config, then runs the display until the window closes.

mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use app::App;
use cli::Cli;
use vcrt_core::Config;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load_default_or_builtin()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    tracing::info!(
        "Starting vector-crt: {:?} mode, {}x{} at {} instructions per frame",
        config.mode,
        config.resolution.width,
        config.resolution.height,
        config.executor.instructions_per_frame
    );

    let mut app = App::new(config, cli.replay.as_deref())?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    app.finish()
}
