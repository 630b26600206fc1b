// SPDX-License-Identifier: GPL-3.0-only

//! Kinect v2 camera intrinsics
//!
//! Factory-typical values for the depth (IR) camera and the color camera.
//! Real devices ship per-unit calibration; these are close enough for the
//! synthetic sensor and its pinhole coordinate mapper.

use serde::{Deserialize, Serialize};

/// Pinhole parameters of one camera (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

/// Depth camera at 512x424
pub const DEPTH: CameraIntrinsics = CameraIntrinsics {
    fx: 365.456,
    fy: 365.456,
    cx: 254.878,
    cy: 205.395,
};

/// Color camera at 1920x1080
pub const COLOR: CameraIntrinsics = CameraIntrinsics {
    fx: 1081.372,
    fy: 1081.372,
    cx: 959.5,
    cy: 539.5,
};

/// Horizontal offset of the color camera from the depth camera (meters)
pub const COLOR_BASELINE_M: f32 = 0.052;

/// Depth sample units per meter
pub const DEPTH_UNITS_PER_METER: f32 = 1000.0;
