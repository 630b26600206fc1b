// SPDX-License-Identifier: GPL-3.0-only

//! Depth decoding and spatial alignment
//!
//! One depth frame feeds three outputs: a grayscale visualization, the point
//! cloud positions, and the per-cell color coordinates that the color decoder
//! samples with.

use super::buffers::FrameBuffers;
use crate::errors::FrameError;
use crate::sensor::{CameraSpacePoint, ColorSpacePoint, CoordinateMapper, DepthFrame};

/// Grayscale intensity of one depth sample
///
/// Distances wrap every 256 units, which shows relative distance as banding
/// rather than a calibrated scale. Samples below the reliable floor are black.
#[inline]
pub fn depth_intensity(depth: u16, min_reliable: u16) -> u8 {
    // The upper bound is u16::MAX, so only the floor can reject a sample
    if depth >= min_reliable {
        (depth % 256) as u8
    } else {
        0
    }
}

/// Mapper output for one depth frame, held until the whole frame succeeds
#[derive(Debug, Clone, Default)]
pub struct DepthStaging {
    camera_points: Vec<CameraSpacePoint>,
    color_points: Vec<ColorSpacePoint>,
}

impl DepthStaging {
    pub fn new(cells: usize) -> Self {
        Self {
            camera_points: vec![CameraSpacePoint::default(); cells],
            color_points: vec![ColorSpacePoint::default(); cells],
        }
    }

    fn fit(&mut self, cells: usize) {
        self.camera_points.resize(cells, CameraSpacePoint::default());
        self.color_points.resize(cells, ColorSpacePoint::default());
    }
}

/// Decode a depth frame into `buffers`
///
/// Validates the frame and runs both mapper passes into `staging` before
/// writing anything, so a rejected frame leaves every buffer as it was.
pub fn decode_depth<M>(
    frame: &DepthFrame<'_>,
    mapper: &M,
    staging: &mut DepthStaging,
    buffers: &mut FrameBuffers,
) -> Result<(), FrameError>
where
    M: CoordinateMapper + ?Sized,
{
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
    let samples = &frame.data[..cells];

    staging.fit(cells);
    mapper.map_depth_frame_to_camera_space(samples, &mut staging.camera_points)?;
    mapper.map_depth_frame_to_color_space(samples, &mut staging.color_points)?;

    // Commit
    std::mem::swap(&mut buffers.camera_points, &mut staging.camera_points);
    std::mem::swap(&mut buffers.color_points, &mut staging.color_points);

    for (&depth, px) in samples.iter().zip(buffers.depth_rgba.chunks_exact_mut(4)) {
        let intensity = depth_intensity(depth, frame.min_reliable_distance);
        px.copy_from_slice(&[intensity, intensity, intensity, 0xFF]);
    }
    for (vertex, point) in buffers
        .vertex_positions
        .iter_mut()
        .zip(buffers.camera_points.iter())
    {
        *vertex = [point.x, point.y, point.z];
    }

    buffers.reliable_range = Some((frame.min_reliable_distance, frame.max_reliable_distance));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FrameGeometry;

    /// Mapper that encodes the cell index into its outputs
    struct IndexMapper;

    impl CoordinateMapper for IndexMapper {
        fn map_depth_frame_to_camera_space(
            &self,
            depth: &[u16],
            camera_points: &mut [CameraSpacePoint],
        ) -> Result<(), FrameError> {
            for (i, (d, p)) in depth.iter().zip(camera_points.iter_mut()).enumerate() {
                *p = CameraSpacePoint::new(i as f32, -(i as f32), *d as f32);
            }
            Ok(())
        }

        fn map_depth_frame_to_color_space(
            &self,
            _depth: &[u16],
            color_points: &mut [ColorSpacePoint],
        ) -> Result<(), FrameError> {
            for (i, p) in color_points.iter_mut().enumerate() {
                *p = ColorSpacePoint::new(i as f32 * 2.0, 1.0);
            }
            Ok(())
        }
    }

    fn geometry() -> FrameGeometry {
        FrameGeometry {
            depth_width: 2,
            depth_height: 2,
            color_width: 4,
            color_height: 4,
        }
    }

    #[test]
    fn test_depth_intensity_rule() {
        assert_eq!(depth_intensity(499, 500), 0);
        assert_eq!(depth_intensity(500, 500), (500 % 256) as u8);
        assert_eq!(depth_intensity(u16::MAX, 500), 255);
        assert_eq!(depth_intensity(0, 0), 0);
        assert_eq!(depth_intensity(256, 0), 0);
        assert_eq!(depth_intensity(257, 0), 1);
    }

    #[test]
    fn test_decode_depth_fills_all_outputs() {
        let mut buffers = FrameBuffers::new(geometry());
        let data = [100u16, 600, 1000, 4500];
        let frame = DepthFrame {
            width: 2,
            height: 2,
            data: &data,
            min_reliable_distance: 500,
            max_reliable_distance: 4500,
        };

        decode_depth(&frame, &IndexMapper, &mut DepthStaging::default(), &mut buffers).unwrap();

        assert_eq!(&buffers.depth_rgba[0..4], &[0, 0, 0, 255]);
        let b = (600 % 256) as u8;
        assert_eq!(&buffers.depth_rgba[4..8], &[b, b, b, 255]);
        assert_eq!(buffers.vertex_positions[3], [3.0, -3.0, 4500.0]);
        assert_eq!(buffers.position_floats()[3..6], [1.0, -1.0, 600.0]);
        assert_eq!(buffers.color_points[2], ColorSpacePoint::new(4.0, 1.0));
        assert_eq!(buffers.reliable_range, Some((500, 4500)));
    }

    #[test]
    fn test_wrong_size_frame_leaves_buffers_untouched() {
        let mut buffers = FrameBuffers::new(geometry());
        let before = buffers.clone();
        let data = [1000u16; 6];
        let frame = DepthFrame {
            width: 3,
            height: 2,
            data: &data,
            min_reliable_distance: 0,
            max_reliable_distance: 4500,
        };

        assert!(decode_depth(&frame, &IndexMapper, &mut DepthStaging::default(), &mut buffers).is_err());
        assert_eq!(buffers, before);
    }

    /// Camera mapping succeeds, color mapping does not
    struct NoColorMapper;

    impl CoordinateMapper for NoColorMapper {
        fn map_depth_frame_to_camera_space(
            &self,
            depth: &[u16],
            camera_points: &mut [CameraSpacePoint],
        ) -> Result<(), FrameError> {
            IndexMapper.map_depth_frame_to_camera_space(depth, camera_points)
        }

        fn map_depth_frame_to_color_space(
            &self,
            depth: &[u16],
            _color_points: &mut [ColorSpacePoint],
        ) -> Result<(), FrameError> {
            Err(FrameError::SizeMismatch {
                expected: depth.len(),
                actual: 0,
            })
        }
    }

    #[test]
    fn test_mapper_failure_leaves_buffers_untouched() {
        let mut buffers = FrameBuffers::new(geometry());
        let mut staging = DepthStaging::new(4);
        let data = [600u16, 700, 800, 900];
        let frame = DepthFrame {
            width: 2,
            height: 2,
            data: &data,
            min_reliable_distance: 500,
            max_reliable_distance: 4500,
        };

        decode_depth(&frame, &IndexMapper, &mut staging, &mut buffers).unwrap();
        let before = buffers.clone();

        let newer = [1000u16, 1100, 1200, 1300];
        let frame = DepthFrame {
            data: &newer,
            min_reliable_distance: 400,
            ..frame
        };
        assert!(decode_depth(&frame, &NoColorMapper, &mut staging, &mut buffers).is_err());
        assert_eq!(buffers, before);

        // Staging stays usable after a failure
        decode_depth(&frame, &IndexMapper, &mut staging, &mut buffers).unwrap();
        assert_eq!(buffers.vertex_positions[0], [0.0, 0.0, 1000.0]);
        assert_eq!(buffers.reliable_range, Some((400, 4500)));
    }
}
