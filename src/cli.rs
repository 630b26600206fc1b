// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the viewer
//!
//! This module provides command-line functionality for:
//! - Running the terminal viewer
//! - Listing key bindings
//! - Printing the effective configuration
//! - Headless decode statistics

use kinect_viewer::constants::{COLOR_HEIGHT, COLOR_WIDTH};
use kinect_viewer::pipeline::FrameGeometry;
use kinect_viewer::render::{Canvas, DisplayMode};
use kinect_viewer::sensor::{SensorDevice, SyntheticSensor};
use kinect_viewer::terminal::TerminalDisplay;
use kinect_viewer::{Config, Viewer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Canvas size used for headless rendering
const STATS_CANVAS_WIDTH: usize = 160;
const STATS_CANVAS_HEIGHT: usize = 90;

fn install_stop_handler() -> Result<Arc<AtomicBool>, Box<dyn std::error::Error>> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;
    Ok(stop_flag)
}

/// Open the sensor and run the viewer in the terminal
pub fn run_viewer(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let stop_flag = install_stop_handler()?;

    let session = SyntheticSensor::new(config.sensor).open()?;
    let mut viewer = Viewer::new(session, config, FrameGeometry::KINECT_V2);

    let mut display = TerminalDisplay::new(stop_flag)?;
    let result = viewer.run(&mut display, Duration::from_millis(config.poll_interval_ms));
    display.close()?;

    let stats = viewer.stats();
    info!(
        ticks = stats.ticks,
        bundles = stats.bundles,
        rendered = stats.rendered_frames,
        render_errors = stats.render_errors,
        "Viewer stopped"
    );

    result?;
    Ok(())
}

/// List the key bindings
pub fn list_keys() -> Result<(), Box<dyn std::error::Error>> {
    println!("Key bindings:");
    println!();
    for mode in DisplayMode::ALL {
        println!("  {}        {}", mode.key(), mode);
    }
    println!("  Esc, q   Quit");
    println!("  Ctrl+C   Quit");
    Ok(())
}

/// Print the effective configuration
pub fn print_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = Config::default_path() {
        eprintln!("Default config location: {}", path.display());
    }
    println!("{}", config.to_json()?);
    Ok(())
}

/// Decode `frames` bundles from the synthetic sensor and render each into an
/// off-screen canvas
pub fn run_stats(config: &Config, frames: u64) -> Result<(), Box<dyn std::error::Error>> {
    let stop_flag = install_stop_handler()?;

    // No real-time pacing without a display
    let mut settings = config.sensor;
    settings.frame_rate = 0;
    let session = SyntheticSensor::new(settings).open()?;
    let mut viewer = Viewer::new(session, config, FrameGeometry::KINECT_V2);
    let mut canvas = Canvas::new(
        STATS_CANVAS_WIDTH,
        STATS_CANVAS_HEIGHT,
        COLOR_WIDTH as u32,
        COLOR_HEIGHT as u32,
    );

    println!("Decoding {} frames in {} mode...", frames, viewer.mode());
    let start = Instant::now();
    for _ in 0..frames {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }
        viewer.tick();
        viewer.render(&mut canvas);
    }
    let elapsed = start.elapsed();

    let stats = viewer.stats();
    let buffers = viewer.buffers();
    let per_frame_ms = if stats.ticks > 0 {
        elapsed.as_secs_f64() * 1000.0 / stats.ticks as f64
    } else {
        0.0
    };

    println!();
    println!("Frames:          {}", stats.bundles);
    println!("  depth:         {}", stats.depth_frames);
    println!("  color:         {}", stats.color_frames);
    println!("  infrared:      {}", stats.infrared_frames);
    println!("  body tracked:  {}", stats.body_frames_tracked);
    println!(
        "Valid points:    {} / {}",
        buffers.valid_point_count(),
        buffers.geometry().depth_pixel_count()
    );
    match buffers.skeleton.slot {
        Some(slot) if buffers.skeleton.tracked => println!("Tracked body:    slot {}", slot),
        _ => println!("Tracked body:    none"),
    }
    match buffers.reliable_range {
        Some((min, max)) => println!("Reliable range:  {}-{} mm", min, max),
        None => println!("Reliable range:  unknown"),
    }
    println!(
        "Rendered:        {} ({} errors)",
        stats.rendered_frames, stats.render_errors
    );
    println!("Time per frame:  {:.2} ms", per_frame_ms);

    Ok(())
}
