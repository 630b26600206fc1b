// SPDX-License-Identifier: GPL-3.0-only

//! Rendering abstraction
//!
//! The mode renderer draws through [`RenderBackend`], a small immediate-mode
//! interface (one reusable texture, a full-viewport quad, points and lines),
//! and presents through [`DisplaySurface`]. [`Canvas`] is the software
//! implementation used by the terminal surface and by tests.

pub mod camera;
pub mod canvas;
pub mod mode;
pub mod renderer;

pub use camera::{Mat4, OrbitCamera};
pub use canvas::Canvas;
pub use mode::{DisplayMode, InputEvent, Key, KeyAction, KeyInput, ModeCommand, ModeSelector};
pub use renderer::{ARM_SEGMENTS, ModeRenderer};

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crate::errors::RenderError;
use crate::pipeline::Vertex;

/// Target rectangle in window pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How vertex coordinates reach the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Window pixels, origin top-left, Y down
    Screen { width: f32, height: f32 },
    /// Coordinates are already normalized; X and Y in -1..=1 are visible
    Normalized,
}

/// Everything a scoped draw may change and must give back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub viewport: Viewport,
    pub projection: Projection,
    pub model_view: Mat4,
}

impl RenderState {
    /// Full-window pixel projection
    pub fn screen(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(0, 0, width, height),
            projection: Projection::Screen {
                width: width as f32,
                height: height as f32,
            },
            model_view: camera::IDENTITY,
        }
    }
}

/// Borrowed RGBA image
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub rgba: &'a [u8],
}

/// Immediate-mode drawing operations the mode renderer needs
pub trait RenderBackend {
    fn state(&self) -> RenderState;

    fn set_state(&mut self, state: RenderState);

    /// Clear color and depth
    fn clear(&mut self);

    /// Replace the contents of the single reusable texture
    fn upload_texture(&mut self, image: ImageView<'_>) -> Result<(), RenderError>;

    /// Draw the texture over the whole viewport
    fn draw_textured_quad(&mut self) -> Result<(), RenderError>;

    /// Draw one unlit point per position
    fn draw_points(
        &mut self,
        positions: &[Vertex],
        colors: &[Vertex],
        point_size: f32,
    ) -> Result<(), RenderError>;

    /// Draw independent line segments in one color
    fn draw_lines(&mut self, segments: &[(Vertex, Vertex)], color: Vertex)
    -> Result<(), RenderError>;
}

/// A window-like target that shows finished frames and delivers input
pub trait DisplaySurface {
    /// Next pending input event, waiting at most `timeout`
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, RenderError>;

    /// Show the frame drawn so far, with a one-line status text
    fn present(&mut self, status: &str) -> Result<(), RenderError>;

    /// True once the surface was closed from the outside
    fn should_close(&self) -> bool;
}

/// Temporarily replaces the backend's render state
///
/// The previous state is restored when the scope is dropped, including on
/// early return through `?`.
pub struct StateScope<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    saved: RenderState,
}

impl<'a, B: RenderBackend + ?Sized> StateScope<'a, B> {
    pub fn enter(backend: &'a mut B, state: RenderState) -> Self {
        let saved = backend.state();
        backend.set_state(state);
        Self { backend, saved }
    }
}

impl<B: RenderBackend + ?Sized> Deref for StateScope<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> DerefMut for StateScope<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for StateScope<'_, B> {
    fn drop(&mut self) {
        self.backend.set_state(self.saved);
    }
}
