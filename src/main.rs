// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use kinect_viewer::render::DisplayMode;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "kinect-viewer")]
#[command(about = "Viewer for depth, color, infrared and skeleton streams")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: <config dir>/kinect-viewer/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Initial display mode (1-6 or a mode name)
    #[arg(short, long, global = true, value_parser = parse_mode)]
    mode: Option<DisplayMode>,

    /// Write logs to stderr even while the terminal viewer is running
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the viewer in the terminal (default)
    Run,

    /// List key bindings
    Keys,

    /// Print the effective configuration as JSON
    Config,

    /// Decode frames from the synthetic sensor without a display and print a summary
    Stats {
        /// Number of frames to decode
        #[arg(short, long, default_value = "30")]
        frames: u64,
    },
}

fn parse_mode(value: &str) -> Result<DisplayMode, String> {
    let mut chars = value.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && let Some(mode) = DisplayMode::from_key(c)
    {
        return Ok(mode);
    }

    let wanted = value.to_lowercase().replace(['-', '_', ' '], "");
    DisplayMode::ALL
        .into_iter()
        .find(|mode| mode.display_name().to_lowercase().replace(' ', "") == wanted)
        .ok_or_else(|| format!("unknown mode '{}' (expected 1-6 or a mode name)", value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=kinect_viewer=debug, RUST_LOG=info
    let terminal_mode = matches!(cli.command, None | Some(Commands::Run));
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);
    if terminal_mode && !cli.log_stderr {
        // stderr shares the screen with the viewer
        subscriber.with_writer(std::io::sink).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    let mut config = kinect_viewer::Config::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.initial_mode = mode;
    }

    match cli.command {
        None | Some(Commands::Run) => cli::run_viewer(&config),
        Some(Commands::Keys) => cli::list_keys(),
        Some(Commands::Config) => cli::print_config(&config),
        Some(Commands::Stats { frames }) => cli::run_stats(&config, frames),
    }
}
