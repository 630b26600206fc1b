// SPDX-License-Identifier: GPL-3.0-only

//! Per-mode drawing
//!
//! Image modes upload one of the pixel buffers and cover the viewport with
//! it. The point cloud and the skeleton are drawn in camera-space meters
//! through a scoped depth-grid viewport with a normalized projection; the
//! window state is put back when the scope ends.

use super::camera::{self, OrbitCamera};
use super::{
    DisplayMode, ImageView, Projection, RenderBackend, RenderState, StateScope, Viewport,
};
use crate::config::OrbitSettings;
use crate::constants::DEFAULT_POINT_SIZE;
use crate::errors::RenderError;
use crate::pipeline::{FrameBuffers, Vertex};
use crate::sensor::{CameraSpacePoint, JointType};

/// Arm bones drawn in skeleton mode
pub const ARM_SEGMENTS: [(JointType, JointType); 4] = [
    (JointType::WristLeft, JointType::ElbowLeft),
    (JointType::ElbowLeft, JointType::ShoulderLeft),
    (JointType::WristRight, JointType::ElbowRight),
    (JointType::ElbowRight, JointType::ShoulderRight),
];

const SKELETON_COLOR: Vertex = [1.0, 0.0, 0.0];

fn vertex(p: CameraSpacePoint) -> Vertex {
    [p.x, p.y, p.z]
}

#[derive(Debug, Clone)]
pub struct ModeRenderer {
    orbit: Option<OrbitCamera>,
    point_size: f32,
    segments: Vec<(Vertex, Vertex)>,
}

impl Default for ModeRenderer {
    fn default() -> Self {
        Self::new(&OrbitSettings::default())
    }
}

impl ModeRenderer {
    pub fn new(orbit: &OrbitSettings) -> Self {
        Self {
            orbit: orbit.enabled.then(|| OrbitCamera::new(orbit)),
            point_size: DEFAULT_POINT_SIZE,
            segments: Vec::with_capacity(ARM_SEGMENTS.len()),
        }
    }

    /// Size of point cloud points in display pixels
    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    pub fn orbit(&self) -> Option<&OrbitCamera> {
        self.orbit.as_ref()
    }

    /// Scoped state for drawing camera-space geometry
    fn camera_space_state(&mut self, buffers: &FrameBuffers) -> RenderState {
        let geometry = buffers.geometry();
        RenderState {
            viewport: Viewport::new(
                0,
                0,
                geometry.depth_width as u32,
                geometry.depth_height as u32,
            ),
            projection: Projection::Normalized,
            model_view: self
                .orbit
                .as_mut()
                .map_or(camera::IDENTITY, OrbitCamera::next_view),
        }
    }

    /// Clear and draw one frame of `mode`
    pub fn render<B>(
        &mut self,
        mode: DisplayMode,
        buffers: &FrameBuffers,
        backend: &mut B,
    ) -> Result<(), RenderError>
    where
        B: RenderBackend + ?Sized,
    {
        backend.clear();
        let geometry = buffers.geometry();

        match mode {
            DisplayMode::Color => {
                backend.upload_texture(ImageView {
                    width: geometry.color_width,
                    height: geometry.color_height,
                    rgba: &buffers.color_rgba,
                })?;
                backend.draw_textured_quad()
            }
            DisplayMode::Depth | DisplayMode::Infrared => {
                let rgba = if mode == DisplayMode::Depth {
                    &buffers.depth_rgba
                } else {
                    &buffers.infrared_rgba
                };
                backend.upload_texture(ImageView {
                    width: geometry.depth_width,
                    height: geometry.depth_height,
                    rgba,
                })?;
                backend.draw_textured_quad()
            }
            DisplayMode::PointCloud => {
                let state = self.camera_space_state(buffers);
                let mut scope = StateScope::enter(backend, state);
                scope.draw_points(
                    &buffers.vertex_positions,
                    &buffers.vertex_colors,
                    self.point_size,
                )
            }
            DisplayMode::Skeleton => {
                if !buffers.skeleton.tracked {
                    return Ok(());
                }
                let joints = &buffers.skeleton.joints;
                self.segments.clear();
                self.segments.extend(ARM_SEGMENTS.iter().map(|&(from, to)| {
                    (vertex(joints.position(from)), vertex(joints.position(to)))
                }));

                let state = self.camera_space_state(buffers);
                let mut scope = StateScope::enter(backend, state);
                scope.draw_lines(&self.segments, SKELETON_COLOR)
            }
            DisplayMode::Mesh => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FrameGeometry;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear,
        Upload(usize, usize),
        Quad,
        Points(usize, RenderState),
        Lines(usize, RenderState),
    }

    struct Recorder {
        state: RenderState,
        calls: Vec<Call>,
        fail_points: bool,
        point_size: Option<f32>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                state: RenderState::screen(16, 12),
                calls: Vec::new(),
                fail_points: false,
                point_size: None,
            }
        }
    }

    impl RenderBackend for Recorder {
        fn state(&self) -> RenderState {
            self.state
        }

        fn set_state(&mut self, state: RenderState) {
            self.state = state;
        }

        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn upload_texture(&mut self, image: ImageView<'_>) -> Result<(), RenderError> {
            self.calls.push(Call::Upload(image.width, image.height));
            Ok(())
        }

        fn draw_textured_quad(&mut self) -> Result<(), RenderError> {
            self.calls.push(Call::Quad);
            Ok(())
        }

        fn draw_points(
            &mut self,
            positions: &[Vertex],
            _colors: &[Vertex],
            point_size: f32,
        ) -> Result<(), RenderError> {
            self.calls.push(Call::Points(positions.len(), self.state));
            self.point_size = Some(point_size);
            if self.fail_points {
                return Err(RenderError::DrawFailed("lost device".to_string()));
            }
            Ok(())
        }

        fn draw_lines(
            &mut self,
            segments: &[(Vertex, Vertex)],
            _color: Vertex,
        ) -> Result<(), RenderError> {
            self.calls.push(Call::Lines(segments.len(), self.state));
            Ok(())
        }
    }

    fn small_buffers() -> FrameBuffers {
        FrameBuffers::new(FrameGeometry {
            depth_width: 4,
            depth_height: 3,
            color_width: 16,
            color_height: 12,
        })
    }

    #[test]
    fn test_image_modes_upload_matching_buffer() {
        let buffers = small_buffers();
        let mut renderer = ModeRenderer::default();
        let mut backend = Recorder::new();

        renderer
            .render(DisplayMode::Color, &buffers, &mut backend)
            .unwrap();
        renderer
            .render(DisplayMode::Infrared, &buffers, &mut backend)
            .unwrap();

        assert_eq!(
            backend.calls,
            vec![
                Call::Clear,
                Call::Upload(16, 12),
                Call::Quad,
                Call::Clear,
                Call::Upload(4, 3),
                Call::Quad,
            ]
        );
    }

    #[test]
    fn test_point_cloud_uses_depth_viewport_and_restores() {
        let buffers = small_buffers();
        let mut renderer = ModeRenderer::default();
        let mut backend = Recorder::new();
        let before = backend.state();

        renderer
            .render(DisplayMode::PointCloud, &buffers, &mut backend)
            .unwrap();

        let Call::Points(count, during) = backend.calls[1].clone() else {
            panic!("expected a point draw, got {:?}", backend.calls);
        };
        assert_eq!(count, 12);
        assert_eq!(during.viewport, Viewport::new(0, 0, 4, 3));
        assert_eq!(during.projection, Projection::Normalized);
        assert_eq!(backend.state(), before);
    }

    #[test]
    fn test_point_size_reaches_backend() {
        let buffers = small_buffers();
        let mut backend = Recorder::new();

        ModeRenderer::default()
            .render(DisplayMode::PointCloud, &buffers, &mut backend)
            .unwrap();
        assert_eq!(backend.point_size, Some(DEFAULT_POINT_SIZE));

        ModeRenderer::default()
            .with_point_size(3.0)
            .render(DisplayMode::PointCloud, &buffers, &mut backend)
            .unwrap();
        assert_eq!(backend.point_size, Some(3.0));
    }

    #[test]
    fn test_point_cloud_restores_state_on_failure() {
        let buffers = small_buffers();
        let mut renderer = ModeRenderer::default();
        let mut backend = Recorder::new();
        backend.fail_points = true;
        let before = backend.state();

        let result = renderer.render(DisplayMode::PointCloud, &buffers, &mut backend);

        assert!(result.is_err());
        assert_eq!(backend.state(), before);
    }

    #[test]
    fn test_skeleton_draws_four_arm_segments_when_tracked() {
        let mut buffers = small_buffers();
        let mut renderer = ModeRenderer::default();
        let mut backend = Recorder::new();

        renderer
            .render(DisplayMode::Skeleton, &buffers, &mut backend)
            .unwrap();
        assert_eq!(backend.calls, vec![Call::Clear]);

        buffers.skeleton.tracked = true;
        renderer
            .render(DisplayMode::Skeleton, &buffers, &mut backend)
            .unwrap();
        assert!(matches!(backend.calls[2], Call::Lines(4, _)));
        assert_eq!(backend.state(), RenderState::screen(16, 12));
    }

    #[test]
    fn test_mesh_draws_nothing() {
        let buffers = small_buffers();
        let mut renderer = ModeRenderer::default();
        let mut backend = Recorder::new();

        renderer
            .render(DisplayMode::Mesh, &buffers, &mut backend)
            .unwrap();
        assert_eq!(backend.calls, vec![Call::Clear]);
    }

    #[test]
    fn test_orbit_advances_per_point_cloud_frame() {
        let settings = OrbitSettings {
            enabled: true,
            ..OrbitSettings::default()
        };
        let buffers = small_buffers();
        let mut renderer = ModeRenderer::new(&settings);
        let mut backend = Recorder::new();

        renderer
            .render(DisplayMode::PointCloud, &buffers, &mut backend)
            .unwrap();
        renderer
            .render(DisplayMode::PointCloud, &buffers, &mut backend)
            .unwrap();

        let angle = renderer.orbit().map(OrbitCamera::angle).unwrap();
        assert!((angle - 2.0 * settings.angle_step).abs() < 1e-12);
    }
}
