// SPDX-License-Identifier: GPL-3.0-only

//! Sensor abstraction
//!
//! The viewer consumes a sensor through two capabilities that mirror the
//! device SDK:
//!
//! ```text
//! ┌──────────────┐  open()   ┌────────────────────────────────┐
//! │ SensorDevice │ ────────▶ │ SensorSession                  │
//! └──────────────┘           │  ├─ reader: FrameReader        │ ← latest bundle
//!                            │  └─ mapper: CoordinateMapper   │ ← depth → camera/color
//!                            └────────────────────────────────┘
//! ```
//!
//! Keeping the reader and the mapper as separate objects lets a decoder hold a
//! bundle borrowed from the reader while calling into the mapper.

pub mod format_converters;
pub mod intrinsics;
pub mod synthetic;
pub mod types;

pub use synthetic::{PinholeMapper, SyntheticReader, SyntheticSensor};
pub use types::*;

use crate::errors::{FrameError, SensorResult};

/// Pull-style access to the sensor's most recent frame bundle
pub trait FrameReader {
    /// Return the latest bundle if a new one is ready
    ///
    /// Never blocks. Bundles the caller did not pick up in time are dropped by
    /// the reader; there is no queue.
    fn acquire_latest_frame(&mut self) -> Option<FrameBundle<'_>>;
}

/// Device-supplied projection between the depth grid and the other spaces
///
/// Both operations take the full depth grid and write exactly one result per
/// cell. Cells without a defined projection receive the type's `INVALID`
/// sentinel.
pub trait CoordinateMapper {
    /// Project every depth cell into 3D camera space
    fn map_depth_frame_to_camera_space(
        &self,
        depth: &[u16],
        camera_points: &mut [CameraSpacePoint],
    ) -> Result<(), FrameError>;

    /// Project every depth cell into the color image
    fn map_depth_frame_to_color_space(
        &self,
        depth: &[u16],
        color_points: &mut [ColorSpacePoint],
    ) -> Result<(), FrameError>;
}

/// An opened sensor
pub struct SensorSession<R, M> {
    pub reader: R,
    pub mapper: M,
}

/// A sensor that can be opened once at startup
pub trait SensorDevice {
    type Reader: FrameReader;
    type Mapper: CoordinateMapper;

    /// Open the device; failure is fatal for the viewer
    fn open(self) -> SensorResult<SensorSession<Self::Reader, Self::Mapper>>;
}
