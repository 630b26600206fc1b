// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for color sub-frames
//!
//! All conversions write into a caller-provided RGBA buffer so the per-frame
//! path never allocates.

/// Convert YUY2 (YUV 4:2:2) to RGBA in place
///
/// YUY2 format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion.
pub fn yuy2_to_rgba_into(data: &[u8], rgba: &mut [u8]) {
    // YUY2: Y0 U Y1 V - processes 2 pixels at a time
    for (chunk, out) in data.chunks_exact(4).zip(rgba.chunks_exact_mut(8)) {
        let y0 = chunk[0];
        let u = chunk[1];
        let y1 = chunk[2];
        let v = chunk[3];

        let (r, g, b) = yuv_to_rgb(y0, u, v);
        out[..4].copy_from_slice(&[r, g, b, 255]);
        let (r, g, b) = yuv_to_rgb(y1, u, v);
        out[4..].copy_from_slice(&[r, g, b, 255]);
    }
}

/// Swap the red and blue channels of BGRA data into RGBA
pub fn bgra_to_rgba_into(data: &[u8], rgba: &mut [u8]) {
    for (src, dst) in data.chunks_exact(4).zip(rgba.chunks_exact_mut(4)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
        dst[3] = src[3];
    }
}

/// Convert YUV (BT.601) to RGB
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

/// Inverse of [`yuv_to_rgb`], used by the synthetic sensor to encode YUY2
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32;
    let g = g as f32;
    let b = b as f32;

    let y = (0.299 * r + 0.587 * g + 0.114 * b).clamp(0.0, 255.0);
    let u = (128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b).clamp(0.0, 255.0);
    let v = (128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b).clamp(0.0, 255.0);

    (y.round() as u8, u.round() as u8, v.round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuy2_gray_pixels() {
        // Neutral chroma keeps luma as gray
        let data = [100u8, 128, 200, 128];
        let mut rgba = [0u8; 8];
        yuy2_to_rgba_into(&data, &mut rgba);
        assert_eq!(rgba, [100, 100, 100, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn test_bgra_swap() {
        let data = [10u8, 20, 30, 40, 50, 60, 70, 80];
        let mut rgba = [0u8; 8];
        bgra_to_rgba_into(&data, &mut rgba);
        assert_eq!(rgba, [30, 20, 10, 40, 70, 60, 50, 80]);
    }

    #[test]
    fn test_yuv_roundtrip_is_close() {
        let (y, u, v) = rgb_to_yuv(200, 40, 90);
        let (r, g, b) = yuv_to_rgb(y, u, v);
        assert!((r as i32 - 200).abs() <= 2);
        assert!((g as i32 - 40).abs() <= 2);
        assert!((b as i32 - 90).abs() <= 2);
    }
}
