// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the viewer
//!
//! Startup failures (sensor, display, configuration) are fatal and bubble up to
//! `main`. Per-frame problems never surface as errors to the loop: a missing or
//! malformed sub-frame simply leaves the previous buffer contents in place.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Sensor could not be opened
    Sensor(SensorError),
    /// Display surface or render backend failure
    Render(RenderError),
    /// Configuration errors
    Config(ConfigError),
}

/// Sensor-specific errors
#[derive(Debug, Clone)]
pub enum SensorError {
    /// Sensor was found but could not be opened
    OpenFailed(String),
}

/// Errors raised while converting a single sub-frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Sub-frame dimensions do not match the destination buffer
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    /// Raw payload is shorter than the declared dimensions require
    Truncated {
        expected: usize,
        actual: usize,
    },
}

/// Display surface and render backend errors
#[derive(Debug, Clone)]
pub enum RenderError {
    /// Window or terminal could not be created
    SurfaceCreation(String),
    /// Presenting a finished frame failed
    PresentFailed(String),
    /// A draw call failed
    DrawFailed(String),
    /// Reading input events failed
    Input(String),
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Config file exists but could not be read
    Read(String),
    /// Config file could not be parsed
    Parse(String),
    /// A setting is out of its valid range
    Invalid(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sensor(e) => write!(f, "Sensor error: {}", e),
            AppError::Render(e) => write!(f, "Render error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::OpenFailed(msg) => write!(f, "Failed to open sensor: {}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::SizeMismatch { expected, actual } => write!(
                f,
                "Frame size mismatch: expected {} elements, got {}",
                expected, actual
            ),
            FrameError::Truncated { expected, actual } => write!(
                f,
                "Frame payload truncated: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceCreation(msg) => write!(f, "Failed to create surface: {}", msg),
            RenderError::PresentFailed(msg) => write!(f, "Failed to present frame: {}", msg),
            RenderError::DrawFailed(msg) => write!(f, "Draw failed: {}", msg),
            RenderError::Input(msg) => write!(f, "Input error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid setting: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SensorError {}
impl std::error::Error for FrameError {}
impl std::error::Error for RenderError {}
impl std::error::Error for ConfigError {}

impl From<SensorError> for AppError {
    fn from(err: SensorError) -> Self {
        AppError::Sensor(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// Terminal I/O is the only std::io consumer in the render path
impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::PresentFailed(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Read(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
