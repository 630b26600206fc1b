// SPDX-License-Identifier: GPL-3.0-only

//! Frame, point and body types shared by sensors and decoders
//!
//! Sub-frames borrow their sample storage from the reader that produced them,
//! the same way the sensor SDK hands out access to its underlying buffers.
//! Nothing here owns pixel data except [`Body`] and [`JointSet`], which are
//! small fixed-size arrays.

use serde::{Deserialize, Serialize};

use super::format_converters;
use crate::constants::RGBA_CHANNELS;
use crate::errors::FrameError;

/// 3D point in the sensor's metric camera space (meters)
///
/// X grows to the sensor's left, Y up, Z away from the sensor.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraSpacePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CameraSpacePoint {
    /// Sentinel written by mappers for cells without a valid projection
    pub const INVALID: Self = Self {
        x: f32::NEG_INFINITY,
        y: f32::NEG_INFINITY,
        z: f32::NEG_INFINITY,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// True when every component is finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// 2D pixel coordinate into the color grid
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorSpacePoint {
    pub x: f32,
    pub y: f32,
}

impl ColorSpacePoint {
    /// Sentinel written by mappers for cells without a valid projection
    pub const INVALID: Self = Self {
        x: f32::NEG_INFINITY,
        y: f32::NEG_INFINITY,
    };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Depth sub-frame: one distance sample (millimeters) per depth cell
#[derive(Debug, Clone, Copy)]
pub struct DepthFrame<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u16],
    /// Closest distance the sensor reports as reliable for this frame
    pub min_reliable_distance: u16,
    /// Farthest distance the sensor reports as reliable for this frame
    pub max_reliable_distance: u16,
}

/// Raw layout of a color sub-frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorImageFormat {
    /// 4 bytes per pixel, R G B A
    #[default]
    Rgba,
    /// 4 bytes per pixel, B G R A
    Bgra,
    /// Packed 4:2:2, Y0 U Y1 V (native Kinect v2 color output)
    Yuy2,
}

impl ColorImageFormat {
    /// Raw payload size for a frame of the given dimensions
    pub fn payload_len(&self, width: usize, height: usize) -> usize {
        match self {
            ColorImageFormat::Rgba | ColorImageFormat::Bgra => width * height * 4,
            ColorImageFormat::Yuy2 => width * height * 2,
        }
    }
}

/// Color sub-frame in its raw sensor layout
#[derive(Debug, Clone, Copy)]
pub struct ColorFrame<'a> {
    pub width: usize,
    pub height: usize,
    pub format: ColorImageFormat,
    pub data: &'a [u8],
}

impl ColorFrame<'_> {
    /// Convert the raw payload into `destination` as RGBA
    ///
    /// `destination` must hold exactly `width * height * 4` bytes. Nothing is
    /// written when the payload or destination size is wrong.
    pub fn copy_converted_to_rgba(&self, destination: &mut [u8]) -> Result<(), FrameError> {
        let expected_out = self.width * self.height * RGBA_CHANNELS;
        if destination.len() != expected_out {
            return Err(FrameError::SizeMismatch {
                expected: expected_out,
                actual: destination.len(),
            });
        }

        let expected_in = self.format.payload_len(self.width, self.height);
        if self.data.len() < expected_in {
            return Err(FrameError::Truncated {
                expected: expected_in,
                actual: self.data.len(),
            });
        }

        let source = &self.data[..expected_in];
        match self.format {
            ColorImageFormat::Rgba => destination.copy_from_slice(source),
            ColorImageFormat::Bgra => format_converters::bgra_to_rgba_into(source, destination),
            ColorImageFormat::Yuy2 => format_converters::yuy2_to_rgba_into(source, destination),
        }
        Ok(())
    }
}

/// Infrared sub-frame: one 16-bit intensity per depth cell
#[derive(Debug, Clone, Copy)]
pub struct InfraredFrame<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u16],
}

/// Body sub-frame: a fixed number of body slots, tracked or not
#[derive(Debug, Clone, Copy)]
pub struct BodyFrame<'a> {
    pub bodies: &'a [Body],
}

/// One acquisition result; each sub-frame may independently be absent
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameBundle<'a> {
    pub depth: Option<DepthFrame<'a>>,
    pub color: Option<ColorFrame<'a>>,
    pub infrared: Option<InfraredFrame<'a>>,
    pub body: Option<BodyFrame<'a>>,
}

impl FrameBundle<'_> {
    /// Bundle with every sub-frame absent
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_none() && self.color.is_none() && self.infrared.is_none() && self.body.is_none()
    }
}

/// Number of joints per tracked body
pub const JOINT_COUNT: usize = 25;

/// Skeleton joints in sensor order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JointType {
    #[default]
    SpineBase = 0,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

impl JointType {
    /// All joints, indexed by their sensor order
    pub const ALL: [JointType; JOINT_COUNT] = [
        JointType::SpineBase,
        JointType::SpineMid,
        JointType::Neck,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
        JointType::SpineShoulder,
        JointType::HandTipLeft,
        JointType::ThumbLeft,
        JointType::HandTipRight,
        JointType::ThumbRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// How confidently the sensor located a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Joint {
    pub joint_type: JointType,
    pub position: CameraSpacePoint,
    pub tracking_state: TrackingState,
}

/// Full joint array of one body, indexable by [`JointType`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSet {
    joints: [Joint; JOINT_COUNT],
}

impl Default for JointSet {
    fn default() -> Self {
        let mut joints = [Joint::default(); JOINT_COUNT];
        for (joint, joint_type) in joints.iter_mut().zip(JointType::ALL) {
            joint.joint_type = joint_type;
        }
        Self { joints }
    }
}

impl JointSet {
    pub fn new(joints: [Joint; JOINT_COUNT]) -> Self {
        Self { joints }
    }

    pub fn joint(&self, joint_type: JointType) -> &Joint {
        &self.joints[joint_type.index()]
    }

    pub fn joint_mut(&mut self, joint_type: JointType) -> &mut Joint {
        &mut self.joints[joint_type.index()]
    }

    pub fn position(&self, joint_type: JointType) -> CameraSpacePoint {
        self.joints[joint_type.index()].position
    }

    pub fn joints(&self) -> &[Joint; JOINT_COUNT] {
        &self.joints
    }
}

/// One body slot of a body frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub tracked: bool,
    pub joints: JointSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_camera_point() {
        assert!(!CameraSpacePoint::INVALID.is_valid());
        assert!(CameraSpacePoint::new(0.1, -0.2, 1.5).is_valid());
    }

    #[test]
    fn test_joint_set_default_types_follow_order() {
        let set = JointSet::default();
        for joint_type in JointType::ALL {
            assert_eq!(set.joint(joint_type).joint_type, joint_type);
        }
        assert_eq!(JointType::ThumbRight.index(), JOINT_COUNT - 1);
    }

    #[test]
    fn test_copy_converted_rejects_wrong_destination() {
        let data = [0u8; 16];
        let frame = ColorFrame {
            width: 2,
            height: 2,
            format: ColorImageFormat::Rgba,
            data: &data,
        };
        let mut dst = [7u8; 8];
        assert!(frame.copy_converted_to_rgba(&mut dst).is_err());
        assert_eq!(dst, [7u8; 8]);
    }

    #[test]
    fn test_copy_converted_rejects_truncated_payload() {
        let data = [0u8; 4];
        let frame = ColorFrame {
            width: 2,
            height: 2,
            format: ColorImageFormat::Yuy2,
            data: &data,
        };
        let mut dst = [0u8; 16];
        assert_eq!(
            frame.copy_converted_to_rgba(&mut dst),
            Err(FrameError::Truncated {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn test_copy_converted_bgra() {
        let data = [1u8, 2, 3, 4];
        let frame = ColorFrame {
            width: 1,
            height: 1,
            format: ColorImageFormat::Bgra,
            data: &data,
        };
        let mut dst = [0u8; 4];
        frame.copy_converted_to_rgba(&mut dst).unwrap();
        assert_eq!(dst, [3, 2, 1, 4]);
    }

    #[test]
    fn test_empty_bundle() {
        assert!(FrameBundle::empty().is_empty());
    }
}
