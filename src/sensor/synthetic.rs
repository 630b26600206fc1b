// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic sensor
//!
//! A deterministic stand-in for the physical device: a wall, a person-sized
//! blob walking left and right in front of it, an infrared image derived from
//! the depth, a color image with the same blob, and one tracked body waving
//! its arms. The coordinate mapper is a plain pinhole model built from
//! [`intrinsics`](super::intrinsics).
//!
//! Sample storage is allocated once in [`SyntheticSensor::open`]; each bundle
//! is generated into it in place.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::format_converters::rgb_to_yuv;
use super::intrinsics::{self, CameraIntrinsics};
use super::types::*;
use super::{CoordinateMapper, FrameReader, SensorDevice, SensorSession};
use crate::config::SyntheticSettings;
use crate::constants::{BODY_COUNT, COLOR_HEIGHT, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH};
use crate::errors::{FrameError, SensorError, SensorResult};

/// Reliable range reported with every synthetic depth frame (millimeters)
const MIN_RELIABLE_MM: u16 = 500;
const MAX_RELIABLE_MM: u16 = 4500;

/// Scene layout (millimeters / depth pixels)
const WALL_MM: f32 = 3000.0;
const BLOB_MM: f32 = 1500.0;
const BLOB_RADIUS_PX: f32 = 60.0;
const BLOB_SWING_PX: f32 = 120.0;
/// Left columns without depth, like the real sensor's shadow band
const SHADOW_COLUMNS: usize = 8;

/// Synthetic device description, opened like a real sensor
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSensor {
    pub settings: SyntheticSettings,
}

impl SyntheticSensor {
    pub fn new(settings: SyntheticSettings) -> Self {
        Self { settings }
    }
}

impl SensorDevice for SyntheticSensor {
    type Reader = SyntheticReader;
    type Mapper = PinholeMapper;

    fn open(self) -> SensorResult<SensorSession<SyntheticReader, PinholeMapper>> {
        if let Some(slot) = self.settings.tracked_body_slot
            && slot >= BODY_COUNT
        {
            return Err(SensorError::OpenFailed(format!(
                "body slot {} out of range",
                slot
            )));
        }

        info!(
            depth_width = DEPTH_WIDTH,
            depth_height = DEPTH_HEIGHT,
            color_width = COLOR_WIDTH,
            color_height = COLOR_HEIGHT,
            color_format = ?self.settings.color_format,
            frame_rate = self.settings.frame_rate,
            "Opened synthetic sensor"
        );

        Ok(SensorSession {
            reader: SyntheticReader::new(self.settings),
            mapper: PinholeMapper::kinect_v2(),
        })
    }
}

/// Frame reader producing a moving synthetic scene
pub struct SyntheticReader {
    settings: SyntheticSettings,
    frame_index: u64,
    frame_interval: Option<Duration>,
    last_frame: Option<Instant>,
    depth: Vec<u16>,
    infrared: Vec<u16>,
    color: Vec<u8>,
    bodies: [Body; BODY_COUNT],
}

impl SyntheticReader {
    pub fn new(settings: SyntheticSettings) -> Self {
        let frame_interval = (settings.frame_rate > 0)
            .then(|| Duration::from_secs_f64(1.0 / settings.frame_rate as f64));
        let color_len = settings.color_format.payload_len(COLOR_WIDTH, COLOR_HEIGHT);

        Self {
            settings,
            frame_index: 0,
            frame_interval,
            last_frame: None,
            depth: vec![0; DEPTH_WIDTH * DEPTH_HEIGHT],
            infrared: vec![0; DEPTH_WIDTH * DEPTH_HEIGHT],
            color: vec![0; color_len],
            bodies: [Body::default(); BODY_COUNT],
        }
    }

    /// Number of bundles produced so far
    pub fn frames_produced(&self) -> u64 {
        self.frame_index
    }

    fn frame_due(&mut self) -> bool {
        let Some(interval) = self.frame_interval else {
            return true;
        };
        let now = Instant::now();
        match self.last_frame {
            Some(last) if now.duration_since(last) < interval => false,
            _ => {
                self.last_frame = Some(now);
                true
            }
        }
    }

    /// Scene time in seconds for the current frame
    fn scene_time(&self) -> f32 {
        let fps = if self.settings.frame_rate > 0 {
            self.settings.frame_rate
        } else {
            crate::constants::DEFAULT_SENSOR_FPS
        };
        self.frame_index as f32 / fps as f32
    }

    /// Horizontal blob center in depth pixels
    fn blob_center(&self, t: f32) -> (f32, f32) {
        let u = DEPTH_WIDTH as f32 / 2.0 + BLOB_SWING_PX * (t * 0.8).sin();
        let v = DEPTH_HEIGHT as f32 / 2.0;
        (u, v)
    }

    fn generate_depth(&mut self, t: f32) {
        let (bu, bv) = self.blob_center(t);
        for (i, (depth, ir)) in self.depth.iter_mut().zip(self.infrared.iter_mut()).enumerate() {
            let u = i % DEPTH_WIDTH;
            let v = i / DEPTH_WIDTH;

            if u < SHADOW_COLUMNS {
                *depth = 0;
                *ir = 0;
                continue;
            }

            let du = u as f32 - bu;
            let dv = (v as f32 - bv) * 0.5;
            let r2 = du * du + dv * dv;
            let mm = if r2 < BLOB_RADIUS_PX * BLOB_RADIUS_PX {
                // Rounded front surface
                BLOB_MM + (r2.sqrt() / BLOB_RADIUS_PX) * 150.0
            } else {
                // Slight tilt so the wall shows distance banding
                WALL_MM + (v as f32 - DEPTH_HEIGHT as f32 / 2.0) * 2.0
            };

            *depth = mm as u16;
            // Near surfaces reflect more infrared
            *ir = (u16::MAX as f32 * 0.2 * (1000.0 / mm)).min(u16::MAX as f32) as u16;
        }
    }

    fn scene_color(&self, u: usize, v: usize, blob_u: f32, blob_v: f32) -> (u8, u8, u8) {
        let du = u as f32 - blob_u;
        let dv = (v as f32 - blob_v) * 0.5;
        let radius = BLOB_RADIUS_PX * (intrinsics::COLOR.fx / intrinsics::DEPTH.fx);
        if du * du + dv * dv < radius * radius {
            return (220, 120, 60);
        }
        let r = (u * 255 / COLOR_WIDTH) as u8;
        let b = (v * 255 / COLOR_HEIGHT) as u8;
        (r, 90, b)
    }

    fn generate_color(&mut self, t: f32) {
        let (bu, bv) = self.blob_center(t);
        // Blob center carried into color pixels
        let blob_u = (bu - intrinsics::DEPTH.cx) * (intrinsics::COLOR.fx / intrinsics::DEPTH.fx)
            + intrinsics::COLOR.cx;
        let blob_v = (bv - intrinsics::DEPTH.cy) * (intrinsics::COLOR.fy / intrinsics::DEPTH.fy)
            + intrinsics::COLOR.cy;

        let mut color = std::mem::take(&mut self.color);
        match self.settings.color_format {
            ColorImageFormat::Rgba | ColorImageFormat::Bgra => {
                let bgra = self.settings.color_format == ColorImageFormat::Bgra;
                for (i, px) in color.chunks_exact_mut(4).enumerate() {
                    let (r, g, b) = self.scene_color(i % COLOR_WIDTH, i / COLOR_WIDTH, blob_u, blob_v);
                    if bgra {
                        px.copy_from_slice(&[b, g, r, 255]);
                    } else {
                        px.copy_from_slice(&[r, g, b, 255]);
                    }
                }
            }
            ColorImageFormat::Yuy2 => {
                for (pair, px) in color.chunks_exact_mut(4).enumerate() {
                    let i = pair * 2;
                    let (u, v) = (i % COLOR_WIDTH, i / COLOR_WIDTH);
                    let (y0, u0, v0) = {
                        let (r, g, b) = self.scene_color(u, v, blob_u, blob_v);
                        rgb_to_yuv(r, g, b)
                    };
                    let (y1, u1, v1) = {
                        let (r, g, b) = self.scene_color(u + 1, v, blob_u, blob_v);
                        rgb_to_yuv(r, g, b)
                    };
                    let cu = ((u0 as u16 + u1 as u16) / 2) as u8;
                    let cv = ((v0 as u16 + v1 as u16) / 2) as u8;
                    px.copy_from_slice(&[y0, cu, y1, cv]);
                }
            }
        }
        self.color = color;
    }

    fn generate_bodies(&mut self, t: f32) {
        for body in self.bodies.iter_mut() {
            body.tracked = false;
        }
        let Some(slot) = self.settings.tracked_body_slot else {
            return;
        };

        let (bu, _) = self.blob_center(t);
        let z = BLOB_MM / intrinsics::DEPTH_UNITS_PER_METER;
        let x = (bu - intrinsics::DEPTH.cx) * z / intrinsics::DEPTH.fx;
        let wave = (t * 3.0).sin() * 0.25;

        let body = &mut self.bodies[slot];
        body.tracked = true;
        let joints = &mut body.joints;
        let mut place = |joint_type: JointType, dx: f32, dy: f32| {
            let joint = joints.joint_mut(joint_type);
            joint.position = CameraSpacePoint::new(x + dx, dy, z);
            joint.tracking_state = TrackingState::Tracked;
        };

        place(JointType::Head, 0.0, 0.55);
        place(JointType::Neck, 0.0, 0.42);
        place(JointType::SpineShoulder, 0.0, 0.38);
        place(JointType::SpineMid, 0.0, 0.1);
        place(JointType::SpineBase, 0.0, -0.15);
        place(JointType::ShoulderLeft, -0.18, 0.35);
        place(JointType::ElbowLeft, -0.35, 0.2 + wave);
        place(JointType::WristLeft, -0.45, 0.05 + 2.0 * wave);
        place(JointType::HandLeft, -0.48, 0.0 + 2.0 * wave);
        place(JointType::HandTipLeft, -0.5, -0.05 + 2.0 * wave);
        place(JointType::ThumbLeft, -0.46, 0.0 + 2.0 * wave);
        place(JointType::ShoulderRight, 0.18, 0.35);
        place(JointType::ElbowRight, 0.35, 0.2 - wave);
        place(JointType::WristRight, 0.45, 0.05 - 2.0 * wave);
        place(JointType::HandRight, 0.48, 0.0 - 2.0 * wave);
        place(JointType::HandTipRight, 0.5, -0.05 - 2.0 * wave);
        place(JointType::ThumbRight, 0.46, 0.0 - 2.0 * wave);
        place(JointType::HipLeft, -0.1, -0.18);
        place(JointType::KneeLeft, -0.1, -0.6);
        place(JointType::AnkleLeft, -0.1, -0.95);
        place(JointType::FootLeft, -0.12, -1.0);
        place(JointType::HipRight, 0.1, -0.18);
        place(JointType::KneeRight, 0.1, -0.6);
        place(JointType::AnkleRight, 0.1, -0.95);
        place(JointType::FootRight, 0.12, -1.0);
    }
}

impl FrameReader for SyntheticReader {
    fn acquire_latest_frame(&mut self) -> Option<FrameBundle<'_>> {
        if !self.frame_due() {
            return None;
        }

        let t = self.scene_time();
        let include_color = self.frame_index % self.settings.color_divisor.max(1) as u64 == 0;

        self.generate_depth(t);
        self.generate_bodies(t);
        if include_color {
            self.generate_color(t);
        }
        self.frame_index += 1;

        if self.frame_index % 300 == 0 {
            debug!(frames = self.frame_index, "Synthetic sensor running");
        }

        Some(FrameBundle {
            depth: Some(DepthFrame {
                width: DEPTH_WIDTH,
                height: DEPTH_HEIGHT,
                data: &self.depth,
                min_reliable_distance: MIN_RELIABLE_MM,
                max_reliable_distance: MAX_RELIABLE_MM,
            }),
            color: include_color.then(|| ColorFrame {
                width: COLOR_WIDTH,
                height: COLOR_HEIGHT,
                format: self.settings.color_format,
                data: &self.color,
            }),
            infrared: Some(InfraredFrame {
                width: DEPTH_WIDTH,
                height: DEPTH_HEIGHT,
                data: &self.infrared,
            }),
            body: Some(BodyFrame {
                bodies: &self.bodies,
            }),
        })
    }
}

/// Pinhole depth-to-camera and depth-to-color projection
#[derive(Debug, Clone, Copy)]
pub struct PinholeMapper {
    pub depth_width: usize,
    pub depth: CameraIntrinsics,
    pub color: CameraIntrinsics,
    /// Color camera offset along X (meters)
    pub baseline: f32,
}

impl PinholeMapper {
    pub fn kinect_v2() -> Self {
        Self {
            depth_width: DEPTH_WIDTH,
            depth: intrinsics::DEPTH,
            color: intrinsics::COLOR,
            baseline: intrinsics::COLOR_BASELINE_M,
        }
    }

    /// Unproject one depth cell; `None` for zero depth
    fn unproject(&self, index: usize, depth_mm: u16) -> Option<CameraSpacePoint> {
        if depth_mm == 0 {
            return None;
        }
        let u = (index % self.depth_width) as f32;
        let v = (index / self.depth_width) as f32;
        let z = depth_mm as f32 / intrinsics::DEPTH_UNITS_PER_METER;
        Some(CameraSpacePoint::new(
            (u - self.depth.cx) * z / self.depth.fx,
            (self.depth.cy - v) * z / self.depth.fy,
            z,
        ))
    }

    fn check_sizes(&self, depth_len: usize, out_len: usize) -> Result<(), FrameError> {
        if depth_len != out_len {
            return Err(FrameError::SizeMismatch {
                expected: depth_len,
                actual: out_len,
            });
        }
        if self.depth_width == 0 || depth_len % self.depth_width != 0 {
            return Err(FrameError::SizeMismatch {
                expected: self.depth_width,
                actual: depth_len,
            });
        }
        Ok(())
    }
}

impl CoordinateMapper for PinholeMapper {
    fn map_depth_frame_to_camera_space(
        &self,
        depth: &[u16],
        camera_points: &mut [CameraSpacePoint],
    ) -> Result<(), FrameError> {
        self.check_sizes(depth.len(), camera_points.len())?;
        for (i, (&d, out)) in depth.iter().zip(camera_points.iter_mut()).enumerate() {
            *out = self.unproject(i, d).unwrap_or(CameraSpacePoint::INVALID);
        }
        Ok(())
    }

    fn map_depth_frame_to_color_space(
        &self,
        depth: &[u16],
        color_points: &mut [ColorSpacePoint],
    ) -> Result<(), FrameError> {
        self.check_sizes(depth.len(), color_points.len())?;
        for (i, (&d, out)) in depth.iter().zip(color_points.iter_mut()).enumerate() {
            *out = match self.unproject(i, d) {
                Some(p) => ColorSpacePoint::new(
                    self.color.fx * (p.x + self.baseline) / p.z + self.color.cx,
                    self.color.cy - self.color.fy * p.y / p.z,
                ),
                None => ColorSpacePoint::INVALID,
            };
        }
        Ok(())
    }
}
