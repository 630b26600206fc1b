// SPDX-License-Identifier: GPL-3.0-only

//! Software render target
//!
//! Rasterizes into an RGB pixel grid with a depth buffer. The canvas has a
//! logical window size (the size the viewer thinks its window is, matching
//! the color stream) and a physical pixel size (whatever the presenting
//! surface can show); viewports are given in logical pixels and scaled.

use super::camera::transform_point;
use super::{ImageView, Projection, RenderBackend, RenderState, Viewport};
use crate::errors::RenderError;
use crate::pipeline::Vertex;

/// RGB pixel
pub type Pixel = [u8; 3];

pub struct Canvas {
    width: usize,
    height: usize,
    window_width: u32,
    window_height: u32,
    pixels: Vec<Pixel>,
    depth: Vec<f32>,
    texture: Vec<u8>,
    texture_width: usize,
    texture_height: usize,
    state: RenderState,
}

impl Canvas {
    /// Create a canvas of `width`x`height` pixels showing a logical window
    pub fn new(width: usize, height: usize, window_width: u32, window_height: u32) -> Self {
        Self {
            width,
            height,
            window_width,
            window_height,
            pixels: vec![[0; 3]; width * height],
            depth: vec![f32::INFINITY; width * height],
            texture: Vec::new(),
            texture_width: 0,
            texture_height: 0,
            state: RenderState::screen(window_width, window_height),
        }
    }

    /// Reserve texture storage up front so uploads never reallocate
    pub fn with_texture_capacity(mut self, bytes: usize) -> Self {
        self.texture.reserve_exact(bytes);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Change the physical size; contents are cleared
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, [0; 3]);
        self.depth.clear();
        self.depth.resize(width * height, f32::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Viewport rectangle in physical pixels: (x0, y0, x1, y1), clipped
    fn viewport_rect(&self) -> (f32, f32, f32, f32) {
        let Viewport {
            x,
            y,
            width,
            height,
        } = self.state.viewport;
        let sx = self.width as f32 / self.window_width.max(1) as f32;
        let sy = self.height as f32 / self.window_height.max(1) as f32;
        (
            x as f32 * sx,
            y as f32 * sy,
            (x as f32 + width as f32) * sx,
            (y as f32 + height as f32) * sy,
        )
    }

    /// Project a point to physical pixel coordinates plus depth
    fn project(&self, p: Vertex) -> Option<(f32, f32, f32)> {
        if !(p[0].is_finite() && p[1].is_finite() && p[2].is_finite()) {
            return None;
        }
        let [x, y, z] = transform_point(&self.state.model_view, p);
        let (nx, ny) = match self.state.projection {
            Projection::Normalized => (x, y),
            Projection::Screen { width, height } => {
                (2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
            }
        };
        if !(-1.0..=1.0).contains(&nx) || !(-1.0..=1.0).contains(&ny) {
            return None;
        }

        let (x0, y0, x1, y1) = self.viewport_rect();
        let px = x0 + (nx + 1.0) * 0.5 * (x1 - x0);
        let py = y0 + (1.0 - ny) * 0.5 * (y1 - y0);
        Some((px, py, z))
    }

    fn plot(&mut self, x: f32, y: f32, z: f32, color: Pixel) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        if z <= self.depth[idx] {
            self.depth[idx] = z;
            self.pixels[idx] = color;
        }
    }
}

fn to_pixel(color: Vertex) -> Pixel {
    [
        (color[0].clamp(0.0, 1.0) * 255.0) as u8,
        (color[1].clamp(0.0, 1.0) * 255.0) as u8,
        (color[2].clamp(0.0, 1.0) * 255.0) as u8,
    ]
}

impl RenderBackend for Canvas {
    fn state(&self) -> RenderState {
        self.state
    }

    fn set_state(&mut self, state: RenderState) {
        self.state = state;
    }

    fn clear(&mut self) {
        self.pixels.fill([0; 3]);
        self.depth.fill(f32::INFINITY);
    }

    fn upload_texture(&mut self, image: ImageView<'_>) -> Result<(), RenderError> {
        let expected = image.width * image.height * 4;
        if image.rgba.len() != expected {
            return Err(RenderError::DrawFailed(format!(
                "texture {}x{} needs {} bytes, got {}",
                image.width,
                image.height,
                expected,
                image.rgba.len()
            )));
        }
        self.texture.clear();
        self.texture.extend_from_slice(image.rgba);
        self.texture_width = image.width;
        self.texture_height = image.height;
        Ok(())
    }

    fn draw_textured_quad(&mut self) -> Result<(), RenderError> {
        if self.texture_width == 0 || self.texture_height == 0 {
            return Err(RenderError::DrawFailed("no texture uploaded".to_string()));
        }

        let (x0, y0, x1, y1) = self.viewport_rect();
        let (vw, vh) = (x1 - x0, y1 - y0);
        if vw <= 0.0 || vh <= 0.0 {
            return Ok(());
        }

        let x_start = x0.max(0.0) as usize;
        let x_end = x1.min(self.width as f32).max(0.0) as usize;
        let y_start = y0.max(0.0) as usize;
        let y_end = y1.min(self.height as f32).max(0.0) as usize;

        for py in y_start..y_end {
            let v = ((py as f32 + 0.5 - y0) / vh * self.texture_height as f32) as usize;
            let v = v.min(self.texture_height - 1);
            for px in x_start..x_end {
                let u = ((px as f32 + 0.5 - x0) / vw * self.texture_width as f32) as usize;
                let u = u.min(self.texture_width - 1);
                let t = (v * self.texture_width + u) * 4;
                let idx = py * self.width + px;
                self.pixels[idx] = [self.texture[t], self.texture[t + 1], self.texture[t + 2]];
            }
        }
        Ok(())
    }

    fn draw_points(
        &mut self,
        positions: &[Vertex],
        colors: &[Vertex],
        point_size: f32,
    ) -> Result<(), RenderError> {
        if positions.len() != colors.len() {
            return Err(RenderError::DrawFailed(format!(
                "{} positions but {} colors",
                positions.len(),
                colors.len()
            )));
        }

        // Point size is in physical pixels; anything below one is one pixel
        let size = point_size.max(1.0).round() as usize;
        for (&p, &c) in positions.iter().zip(colors) {
            let Some((x, y, z)) = self.project(p) else {
                continue;
            };
            let color = to_pixel(c);
            for dy in 0..size {
                for dx in 0..size {
                    self.plot(x + dx as f32, y + dy as f32, z, color);
                }
            }
        }
        Ok(())
    }

    fn draw_lines(
        &mut self,
        segments: &[(Vertex, Vertex)],
        color: Vertex,
    ) -> Result<(), RenderError> {
        let color = to_pixel(color);
        for &(a, b) in segments {
            let (Some((ax, ay, az)), Some((bx, by, bz))) = (self.project(a), self.project(b))
            else {
                continue;
            };
            let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                self.plot(
                    ax + (bx - ax) * t,
                    ay + (by - ay) * t,
                    az + (bz - az) * t,
                    color,
                );
            }
        }
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::camera;

    #[test]
    fn test_textured_quad_fills_viewport() {
        let mut canvas = Canvas::new(4, 2, 4, 2);
        let rgba = [10u8, 20, 30, 255, 40, 50, 60, 255];
        canvas
            .upload_texture(ImageView {
                width: 2,
                height: 1,
                rgba: &rgba,
            })
            .unwrap();
        canvas.draw_textured_quad().unwrap();

        assert_eq!(canvas.pixel(0, 0), Some([10, 20, 30]));
        assert_eq!(canvas.pixel(1, 1), Some([10, 20, 30]));
        assert_eq!(canvas.pixel(3, 0), Some([40, 50, 60]));
    }

    #[test]
    fn test_quad_without_texture_fails() {
        let mut canvas = Canvas::new(2, 2, 2, 2);
        assert!(canvas.draw_textured_quad().is_err());
    }

    #[test]
    fn test_normalized_points_land_in_viewport() {
        let mut canvas = Canvas::new(10, 10, 10, 10);
        canvas.set_state(RenderState {
            viewport: Viewport::new(0, 0, 10, 10),
            projection: Projection::Normalized,
            model_view: camera::IDENTITY,
        });
        canvas
            .draw_points(
                &[[0.0, 0.0, 1.0], [f32::NEG_INFINITY; 3], [5.0, 0.0, 1.0]],
                &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                1.0,
            )
            .unwrap();

        assert_eq!(canvas.pixel(5, 5), Some([255, 0, 0]));
        let lit = canvas.pixels().iter().filter(|p| **p != [0, 0, 0]).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_nearer_point_wins() {
        let mut canvas = Canvas::new(4, 4, 4, 4);
        canvas.set_state(RenderState {
            viewport: Viewport::new(0, 0, 4, 4),
            projection: Projection::Normalized,
            model_view: camera::IDENTITY,
        });
        canvas
            .draw_points(
                &[[0.0, 0.0, 2.0], [0.0, 0.0, 1.0], [0.0, 0.0, 3.0]],
                &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                1.0,
            )
            .unwrap();
        assert_eq!(canvas.pixel(2, 2), Some([0, 255, 0]));
    }

    #[test]
    fn test_mismatched_point_buffers_fail() {
        let mut canvas = Canvas::new(2, 2, 2, 2);
        assert!(canvas.draw_points(&[[0.0; 3]], &[], 1.0).is_err());
    }

    #[test]
    fn test_line_is_rasterized() {
        let mut canvas = Canvas::new(8, 8, 8, 8);
        canvas
            .draw_lines(&[([0.0, 0.0, 0.0], [7.0, 0.0, 0.0])], [1.0, 1.0, 1.0])
            .unwrap();
        for x in 0..8 {
            assert_eq!(canvas.pixel(x, 0), Some([255, 255, 255]));
        }
    }
}
