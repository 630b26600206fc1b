// SPDX-License-Identifier: GPL-3.0-only

//! Pre-allocated per-frame buffers
//!
//! Every buffer is sized once from a [`FrameGeometry`] and overwritten in
//! place by the decoders. A buffer is only touched when its sub-frame is
//! present, so stale contents stay on screen until fresh data arrives.

use crate::constants::{COLOR_HEIGHT, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH, RGBA_CHANNELS};
use crate::sensor::{CameraSpacePoint, ColorSpacePoint, JointSet};

/// Grid sizes of the depth and color streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub depth_width: usize,
    pub depth_height: usize,
    pub color_width: usize,
    pub color_height: usize,
}

impl FrameGeometry {
    /// Kinect v2 stream sizes
    pub const KINECT_V2: Self = Self {
        depth_width: DEPTH_WIDTH,
        depth_height: DEPTH_HEIGHT,
        color_width: COLOR_WIDTH,
        color_height: COLOR_HEIGHT,
    };

    pub fn depth_pixel_count(&self) -> usize {
        self.depth_width * self.depth_height
    }

    pub fn color_pixel_count(&self) -> usize {
        self.color_width * self.color_height
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::KINECT_V2
    }
}

/// One XYZ position or RGB color per depth cell, laid out as three floats
pub type Vertex = [f32; 3];

/// Retained skeleton of the first tracked body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkeletonState {
    pub tracked: bool,
    /// Body slot the joints were taken from
    pub slot: Option<usize>,
    pub joints: JointSet,
}

/// All decoded output, reused across ticks
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffers {
    geometry: FrameGeometry,
    /// Full-resolution RGBA color image
    pub color_rgba: Vec<u8>,
    /// RGBA grayscale depth visualization at depth resolution
    pub depth_rgba: Vec<u8>,
    /// RGBA grayscale infrared at depth resolution
    pub infrared_rgba: Vec<u8>,
    /// Camera-space point per depth cell
    pub camera_points: Vec<CameraSpacePoint>,
    /// Color-image coordinate per depth cell
    pub color_points: Vec<ColorSpacePoint>,
    /// Point cloud positions (one XYZ per depth cell)
    pub vertex_positions: Vec<Vertex>,
    /// Point cloud colors (one RGB in 0..=1 per depth cell)
    pub vertex_colors: Vec<Vertex>,
    /// Reliable range of the last decoded depth frame
    pub reliable_range: Option<(u16, u16)>,
    pub skeleton: SkeletonState,
}

impl FrameBuffers {
    pub fn new(geometry: FrameGeometry) -> Self {
        let depth_cells = geometry.depth_pixel_count();
        let color_cells = geometry.color_pixel_count();

        Self {
            geometry,
            color_rgba: vec![0; color_cells * RGBA_CHANNELS],
            depth_rgba: vec![0; depth_cells * RGBA_CHANNELS],
            infrared_rgba: vec![0; depth_cells * RGBA_CHANNELS],
            camera_points: vec![CameraSpacePoint::default(); depth_cells],
            color_points: vec![ColorSpacePoint::default(); depth_cells],
            vertex_positions: vec![[0.0; 3]; depth_cells],
            vertex_colors: vec![[0.0; 3]; depth_cells],
            reliable_range: None,
            skeleton: SkeletonState::default(),
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Point positions as a flat float slice (XYZ XYZ ...)
    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertex_positions)
    }

    /// Point colors as a flat float slice (RGB RGB ...)
    pub fn color_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertex_colors)
    }

    /// Number of depth cells with a finite camera-space position
    pub fn valid_point_count(&self) -> usize {
        self.camera_points.iter().filter(|p| p.is_valid()).count()
    }
}
