// SPDX-License-Identifier: GPL-3.0-only

//! Kinect Viewer - depth, color, infrared and skeleton viewer
//!
//! This library provides the core functionality for the Kinect Viewer,
//! including frame decoding, depth-to-color alignment and mode rendering.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`sensor`]: Sensor, frame reader and coordinate mapper abstraction,
//!   plus a synthetic sensor
//! - [`pipeline`]: Per-frame decoders writing into pre-allocated buffers
//! - [`render`]: Display modes, the drawing backend abstraction and a
//!   software canvas
//! - [`terminal`]: Terminal display surface
//! - [`viewer`]: Viewer context and main loop
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use kinect_viewer::pipeline::FrameGeometry;
//! use kinect_viewer::sensor::{SensorDevice, SyntheticSensor};
//! use kinect_viewer::{Config, Viewer};
//!
//! let config = Config::default();
//! let session = SyntheticSensor::new(config.sensor).open()?;
//! let mut viewer = Viewer::new(session, &config, FrameGeometry::KINECT_V2);
//! let report = viewer.tick();
//! println!("depth decoded: {}", report.depth);
//! # Ok::<(), kinect_viewer::errors::SensorError>(())
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod render;
pub mod sensor;
pub mod terminal;
pub mod viewer;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use pipeline::{FrameBuffers, FrameDecoder, FrameGeometry};
pub use render::{DisplayMode, ModeSelector};
pub use viewer::{Viewer, ViewerStats};
