// SPDX-License-Identifier: GPL-3.0-only

//! Body tracking: keep the joints of the first tracked body

use super::buffers::SkeletonState;
use crate::sensor::BodyFrame;

/// Retain the first tracked body of `frame`
///
/// Slots are scanned in order and the first tracked one wins. When no slot is
/// tracked the previous skeleton is kept as-is, so a body leaving the field of
/// view freezes at its last known pose. Returns the winning slot.
pub fn decode_body(frame: &BodyFrame<'_>, skeleton: &mut SkeletonState) -> Option<usize> {
    let (slot, body) = frame
        .bodies
        .iter()
        .enumerate()
        .find(|(_, body)| body.tracked)?;

    skeleton.tracked = true;
    skeleton.slot = Some(slot);
    skeleton.joints = body.joints;
    Some(slot)
}
