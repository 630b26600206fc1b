// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame decoding
//!
//! Turns one [`FrameBundle`] into the renderable buffers:
//!
//! ```text
//! depth ──▶ grayscale RGBA
//!       ──▶ mapper ──▶ camera points ──▶ point positions
//!       ──▶ mapper ──▶ color coordinates ─┐
//! color ──▶ RGBA ─────────────────────────┴▶ point colors
//! body  ──▶ first tracked skeleton
//! infrared ──▶ grayscale RGBA
//! ```
//!
//! Depth is always decoded before color so the point colors use color
//! coordinates from the same bundle. Absent or malformed sub-frames leave
//! their buffers untouched.

mod body;
mod buffers;
mod color;
mod depth;
mod infrared;

pub use body::decode_body;
pub use buffers::{FrameBuffers, FrameGeometry, SkeletonState, Vertex};
pub use color::{align_colors, decode_color, sample_aligned_color};
pub use depth::{DepthStaging, decode_depth, depth_intensity};
pub use infrared::{InfraredPolicy, decode_infrared, infrared_intensity, infrared_ratio};

use crate::config::InfraredSettings;
use crate::sensor::{CoordinateMapper, FrameBundle};
use tracing::warn;

/// Which buffers one decode pass refreshed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub depth: bool,
    pub color: bool,
    pub infrared: bool,
    /// Slot of the tracked body, when one was found
    pub body_slot: Option<usize>,
}

impl DecodeReport {
    pub fn is_empty(&self) -> bool {
        !self.depth && !self.color && !self.infrared && self.body_slot.is_none()
    }
}

/// Decodes bundles into a [`FrameBuffers`]
///
/// Owns the staging area depth frames are mapped into before they are
/// committed, so a decoder should live as long as its buffers.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    infrared: InfraredSettings,
    staging: DepthStaging,
}

impl FrameDecoder {
    pub fn new(infrared: InfraredSettings, geometry: FrameGeometry) -> Self {
        Self {
            infrared,
            staging: DepthStaging::new(geometry.depth_pixel_count()),
        }
    }

    /// Decode every present sub-frame of `bundle`
    pub fn decode<M>(
        &mut self,
        bundle: &FrameBundle<'_>,
        mapper: &M,
        buffers: &mut FrameBuffers,
    ) -> DecodeReport
    where
        M: CoordinateMapper + ?Sized,
    {
        let mut report = DecodeReport::default();

        if let Some(frame) = &bundle.depth {
            match decode_depth(frame, mapper, &mut self.staging, buffers) {
                Ok(()) => report.depth = true,
                Err(e) => warn!(error = %e, "Dropping depth frame"),
            }
        }

        if let Some(frame) = &bundle.color {
            match decode_color(frame, buffers) {
                Ok(()) => report.color = true,
                Err(e) => warn!(error = %e, "Dropping color frame"),
            }
        }

        if let Some(frame) = &bundle.body {
            report.body_slot = decode_body(frame, &mut buffers.skeleton);
        }

        if let Some(frame) = &bundle.infrared {
            match decode_infrared(frame, &self.infrared, buffers) {
                Ok(()) => report.infrared = true,
                Err(e) => warn!(error = %e, "Dropping infrared frame"),
            }
        }

        report
    }
}
