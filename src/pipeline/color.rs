// SPDX-License-Identifier: GPL-3.0-only

//! Color decoding and depth-to-color alignment

use super::buffers::{FrameBuffers, Vertex};
use crate::constants::RGBA_CHANNELS;
use crate::errors::FrameError;
use crate::sensor::{ColorFrame, ColorSpacePoint};

const BLACK: Vertex = [0.0, 0.0, 0.0];

/// Color at an aligned coordinate, normalized to 0..=1
///
/// Coordinates outside the color grid, or non-finite ones, yield black.
/// A coordinate exactly on the right or bottom edge truncates to an index
/// past the grid and is black as well.
#[inline]
pub fn sample_aligned_color(
    point: ColorSpacePoint,
    rgba: &[u8],
    color_width: usize,
    color_height: usize,
) -> Vertex {
    let ColorSpacePoint { x, y } = point;
    if !x.is_finite()
        || !y.is_finite()
        || x < 0.0
        || y < 0.0
        || x > color_width as f32
        || y > color_height as f32
    {
        return BLACK;
    }

    let (column, row) = (x as usize, y as usize);
    if column >= color_width || row >= color_height {
        return BLACK;
    }

    let offset = (column + color_width * row) * RGBA_CHANNELS;
    match rgba.get(offset..offset + 3) {
        Some(px) => [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        ],
        None => BLACK,
    }
}

/// Decode a color frame and refresh the per-point colors
///
/// The per-point colors use whatever color coordinates the depth decoder
/// produced last, so the depth frame of the same bundle must be decoded first.
pub fn decode_color(frame: &ColorFrame<'_>, buffers: &mut FrameBuffers) -> Result<(), FrameError> {
    let geometry = buffers.geometry();
    if frame.width != geometry.color_width || frame.height != geometry.color_height {
        return Err(FrameError::SizeMismatch {
            expected: geometry.color_pixel_count(),
            actual: frame.width * frame.height,
        });
    }

    frame.copy_converted_to_rgba(&mut buffers.color_rgba)?;
    align_colors(buffers);
    Ok(())
}

/// Sample the color image at every depth cell's color coordinate
pub fn align_colors(buffers: &mut FrameBuffers) {
    let geometry = buffers.geometry();
    let FrameBuffers {
        color_rgba,
        color_points,
        vertex_colors,
        ..
    } = buffers;

    for (vertex, point) in vertex_colors.iter_mut().zip(color_points.iter()) {
        *vertex = sample_aligned_color(
            *point,
            color_rgba,
            geometry.color_width,
            geometry.color_height,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FrameGeometry;
    use crate::sensor::ColorImageFormat;

    fn grid() -> Vec<u8> {
        // 2x2 RGBA: red, green / blue, white
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ]
    }

    #[test]
    fn test_out_of_bounds_is_black() {
        let rgba = grid();
        for point in [
            ColorSpacePoint::new(-0.5, 0.0),
            ColorSpacePoint::new(0.0, -1.0),
            ColorSpacePoint::new(2.5, 0.0),
            ColorSpacePoint::new(0.0, 2.1),
            ColorSpacePoint::INVALID,
            ColorSpacePoint::new(f32::NAN, 0.0),
        ] {
            assert_eq!(sample_aligned_color(point, &rgba, 2, 2), BLACK, "{:?}", point);
        }
    }

    #[test]
    fn test_edge_coordinate_is_black() {
        let rgba = grid();
        assert_eq!(sample_aligned_color(ColorSpacePoint::new(2.0, 0.0), &rgba, 2, 2), BLACK);
    }

    #[test]
    fn test_valid_coordinate_truncates() {
        let rgba = grid();
        assert_eq!(
            sample_aligned_color(ColorSpacePoint::new(1.9, 0.2), &rgba, 2, 2),
            [0.0, 1.0, 0.0]
        );
        assert_eq!(
            sample_aligned_color(ColorSpacePoint::new(0.0, 1.99), &rgba, 2, 2),
            [0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_decode_color_aligns_points() {
        let geometry = FrameGeometry {
            depth_width: 2,
            depth_height: 1,
            color_width: 2,
            color_height: 2,
        };
        let mut buffers = FrameBuffers::new(geometry);
        buffers.color_points[0] = ColorSpacePoint::new(1.0, 1.0);
        buffers.color_points[1] = ColorSpacePoint::new(-1.0, 1.0);

        let data = grid();
        let frame = ColorFrame {
            width: 2,
            height: 2,
            format: ColorImageFormat::Rgba,
            data: &data,
        };
        decode_color(&frame, &mut buffers).unwrap();

        assert_eq!(buffers.color_rgba, data);
        assert_eq!(buffers.vertex_colors[0], [1.0, 1.0, 1.0]);
        assert_eq!(buffers.vertex_colors[1], BLACK);
    }

    #[test]
    fn test_decode_color_rejects_wrong_size() {
        let mut buffers = FrameBuffers::new(FrameGeometry {
            depth_width: 1,
            depth_height: 1,
            color_width: 4,
            color_height: 4,
        });
        let data = grid();
        let frame = ColorFrame {
            width: 2,
            height: 2,
            format: ColorImageFormat::Rgba,
            data: &data,
        };
        assert!(decode_color(&frame, &mut buffers).is_err());
        assert!(buffers.color_rgba.iter().all(|&b| b == 0));
    }
}
