// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{
    BODY_COUNT, DEFAULT_POINT_SIZE, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SENSOR_FPS, INFRARED_OUTPUT_VALUE_MAXIMUM,
    INFRARED_OUTPUT_VALUE_MINIMUM, INFRARED_SCENE_STANDARD_DEVIATIONS,
    INFRARED_SCENE_VALUE_AVERAGE, INFRARED_SOURCE_VALUE_MAXIMUM, ORBIT_ANGLE_STEP, ORBIT_RADIUS,
};
use crate::errors::ConfigError;
use crate::pipeline::InfraredPolicy;
use crate::render::DisplayMode;
use crate::sensor::ColorImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the user config directory
const CONFIG_DIR_NAME: &str = "kinect-viewer";
const CONFIG_FILE_NAME: &str = "config.json";

/// Infrared normalization settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraredSettings {
    /// How the output byte is derived from a sample
    pub policy: InfraredPolicy,
    /// Samples are divided by this first
    pub source_maximum: f32,
    /// Average scene value
    pub scene_average: f32,
    /// Standard deviations above average that map to full intensity
    pub scene_standard_deviations: f32,
    /// Lower clamp of the normalized ratio
    pub output_minimum: f32,
    /// Upper clamp of the normalized ratio
    pub output_maximum: f32,
}

impl Default for InfraredSettings {
    fn default() -> Self {
        Self {
            policy: InfraredPolicy::default(),
            source_maximum: INFRARED_SOURCE_VALUE_MAXIMUM,
            scene_average: INFRARED_SCENE_VALUE_AVERAGE,
            scene_standard_deviations: INFRARED_SCENE_STANDARD_DEVIATIONS,
            output_minimum: INFRARED_OUTPUT_VALUE_MINIMUM,
            output_maximum: INFRARED_OUTPUT_VALUE_MAXIMUM,
        }
    }
}

/// Slowly orbiting point cloud camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub enabled: bool,
    /// Orbit radius in meters
    pub radius: f64,
    /// Angle advanced per rendered frame (radians)
    pub angle_step: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: ORBIT_RADIUS,
            angle_step: ORBIT_ANGLE_STEP,
        }
    }
}

/// Settings for the built-in synthetic sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSettings {
    /// Bundles produced per second (0 = a new bundle on every poll)
    pub frame_rate: u32,
    /// Raw layout of generated color sub-frames
    pub color_format: ColorImageFormat,
    /// Color sub-frame is only included in every Nth bundle
    pub color_divisor: u32,
    /// Body slot holding the tracked body (None = nobody in view)
    pub tracked_body_slot: Option<usize>,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_SENSOR_FPS,
            color_format: ColorImageFormat::Yuy2,
            color_divisor: 1,
            tracked_body_slot: Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mode shown at startup
    pub initial_mode: DisplayMode,
    /// Infrared visualization settings
    pub infrared: InfraredSettings,
    /// Point cloud orbit camera
    pub orbit: OrbitSettings,
    /// Point cloud point size in display pixels
    pub point_size: f32,
    /// Synthetic sensor settings
    pub sensor: SyntheticSettings,
    /// Input poll interval for the terminal surface (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_mode: DisplayMode::default(),
            infrared: InfraredSettings::default(),
            orbit: OrbitSettings::default(),
            point_size: DEFAULT_POINT_SIZE,
            sensor: SyntheticSettings::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Default config file location (`<config dir>/kinect-viewer/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is tried
    /// and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&contents)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check settings that would make decoding or rendering meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ir = &self.infrared;
        if !(ir.output_minimum < ir.output_maximum) {
            return Err(ConfigError::Invalid(format!(
                "infrared output range [{}, {}] is empty",
                ir.output_minimum, ir.output_maximum
            )));
        }
        if !(ir.source_maximum > 0.0 && ir.scene_average * ir.scene_standard_deviations > 0.0) {
            return Err(ConfigError::Invalid(
                "infrared normalization divisors must be positive".to_string(),
            ));
        }
        if self.sensor.color_divisor == 0 {
            return Err(ConfigError::Invalid(
                "sensor.color_divisor must be at least 1".to_string(),
            ));
        }
        if let Some(slot) = self.sensor.tracked_body_slot
            && slot >= BODY_COUNT
        {
            return Err(ConfigError::Invalid(format!(
                "sensor.tracked_body_slot {} is outside 0..{}",
                slot, BODY_COUNT
            )));
        }
        if !(self.point_size.is_finite() && self.point_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "point_size {} must be positive",
                self.point_size
            )));
        }
        if !(self.orbit.radius > 0.0) {
            return Err(ConfigError::Invalid("orbit.radius must be positive".to_string()));
        }
        Ok(())
    }
}
