// SPDX-License-Identifier: GPL-3.0-only

//! Infrared decoding

use serde::{Deserialize, Serialize};

use super::buffers::FrameBuffers;
use crate::config::InfraredSettings;
use crate::errors::FrameError;
use crate::sensor::InfraredFrame;

/// How an infrared sample becomes a gray byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InfraredPolicy {
    /// Normalize against the scene average and clamp, then scale to 0..=255
    #[default]
    Normalized,
    /// Keep only the low byte of the raw sample
    RawLowByte,
}

/// Normalized infrared ratio, clamped to the configured output range
#[inline]
pub fn infrared_ratio(sample: u16, settings: &InfraredSettings) -> f32 {
    let ratio = sample as f32 / settings.source_maximum;
    let ratio = ratio / (settings.scene_average * settings.scene_standard_deviations);
    ratio.clamp(settings.output_minimum, settings.output_maximum)
}

/// Gray byte for one infrared sample under the configured policy
#[inline]
pub fn infrared_intensity(sample: u16, settings: &InfraredSettings) -> u8 {
    match settings.policy {
        InfraredPolicy::Normalized => (infrared_ratio(sample, settings) * 255.0) as u8,
        InfraredPolicy::RawLowByte => sample as u8,
    }
}

/// Decode an infrared frame into the RGBA grayscale buffer
pub fn decode_infrared(
    frame: &InfraredFrame<'_>,
    settings: &InfraredSettings,
    buffers: &mut FrameBuffers,
) -> Result<(), FrameError> {
    let geometry = buffers.geometry();
    let cells = geometry.depth_pixel_count();

    if frame.width != geometry.depth_width || frame.height != geometry.depth_height {
        return Err(FrameError::SizeMismatch {
            expected: cells,
            actual: frame.width * frame.height,
        });
    }
    if frame.data.len() < cells {
        return Err(FrameError::Truncated {
            expected: cells,
            actual: frame.data.len(),
        });
    }

    for (&sample, px) in frame.data[..cells]
        .iter()
        .zip(buffers.infrared_rgba.chunks_exact_mut(4))
    {
        let intensity = infrared_intensity(sample, settings);
        px.copy_from_slice(&[intensity, intensity, intensity, 0xFF]);
    }
    Ok(())
}
