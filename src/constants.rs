// SPDX-License-Identifier: GPL-3.0-only

//! Sensor geometry and processing constants
//!
//! Single source of truth for grid sizes and the infrared normalization
//! parameters. Values match the Kinect v2 sensor.

/// Depth and infrared grid width
pub const DEPTH_WIDTH: usize = 512;
/// Depth and infrared grid height
pub const DEPTH_HEIGHT: usize = 424;
/// Number of cells in the depth grid
pub const DEPTH_PIXEL_COUNT: usize = DEPTH_WIDTH * DEPTH_HEIGHT;

/// Color grid width
pub const COLOR_WIDTH: usize = 1920;
/// Color grid height
pub const COLOR_HEIGHT: usize = 1080;
/// Number of cells in the color grid
pub const COLOR_PIXEL_COUNT: usize = COLOR_WIDTH * COLOR_HEIGHT;

/// Bytes per RGBA pixel
pub const RGBA_CHANNELS: usize = 4;

/// Number of body slots reported per body frame
pub const BODY_COUNT: usize = 6;

/// Infrared samples are divided by this before normalization
pub const INFRARED_SOURCE_VALUE_MAXIMUM: f32 = u16::MAX as f32;
/// Lower clamp of the normalized infrared ratio
pub const INFRARED_OUTPUT_VALUE_MINIMUM: f32 = 0.01;
/// Upper clamp of the normalized infrared ratio
pub const INFRARED_OUTPUT_VALUE_MAXIMUM: f32 = 1.0;
/// Average infrared scene value used as normalization reference
pub const INFRARED_SCENE_VALUE_AVERAGE: f32 = 0.08;
/// Standard deviations above the average mapped to full intensity
pub const INFRARED_SCENE_STANDARD_DEVIATIONS: f32 = 3.0;

/// Window title used by display surfaces
pub const WINDOW_TITLE: &str = "Kinect Viewer";

/// Bytes reserved for the status line
pub const STATUS_CAPACITY: usize = 256;

/// Default input poll interval for the terminal surface (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

/// Default synthetic sensor frame rate
pub const DEFAULT_SENSOR_FPS: u32 = 30;

/// Point cloud point size in display pixels
pub const DEFAULT_POINT_SIZE: f32 = 1.0;

/// Orbit camera defaults (radius in meters, angle step in radians per tick)
pub const ORBIT_RADIUS: f64 = 3.0;
pub const ORBIT_ANGLE_STEP: f64 = 0.001;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_grid_is_larger_than_depth_grid() {
        assert!(COLOR_PIXEL_COUNT > DEPTH_PIXEL_COUNT);
    }

    #[test]
    fn test_infrared_clamp_range_is_ordered() {
        assert!(INFRARED_OUTPUT_VALUE_MINIMUM < INFRARED_OUTPUT_VALUE_MAXIMUM);
    }
}
