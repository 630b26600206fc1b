// SPDX-License-Identifier: GPL-3.0-only

//! View transforms for the point cloud
//!
//! Left-handed like the sensor's camera space: +Z points away from the eye.

use crate::config::OrbitSettings;
use crate::pipeline::Vertex;

/// Row-major 4x4 affine transform
pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn sub(a: Vertex, b: Vertex) -> Vertex {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vertex, b: Vertex) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vertex, b: Vertex) -> Vertex {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: Vertex) -> Vertex {
    let len = dot(v, v).sqrt();
    if len > f32::EPSILON {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        v
    }
}

/// View matrix placing `eye` at the origin looking toward `center`
pub fn look_at(eye: Vertex, center: Vertex, up: Vertex) -> Mat4 {
    let forward = normalize(sub(center, eye));
    let right = normalize(cross(up, forward));
    let up = cross(forward, right);

    [
        [right[0], right[1], right[2], -dot(right, eye)],
        [up[0], up[1], up[2], -dot(up, eye)],
        [forward[0], forward[1], forward[2], -dot(forward, eye)],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Apply an affine transform to a point
#[inline]
pub fn transform_point(m: &Mat4, p: Vertex) -> Vertex {
    [
        m[0][0] * p[0] + m[0][1] * p[1] + m[0][2] * p[2] + m[0][3],
        m[1][0] * p[0] + m[1][1] * p[1] + m[1][2] * p[2] + m[1][3],
        m[2][0] * p[0] + m[2][1] * p[1] + m[2][2] * p[2] + m[2][3],
    ]
}

/// Camera circling the scene around a point half a radius in front of the sensor
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    angle: f64,
    radius: f64,
    step: f64,
}

impl OrbitCamera {
    pub fn new(settings: &OrbitSettings) -> Self {
        Self {
            angle: 0.0,
            radius: settings.radius,
            step: settings.angle_step,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// View for the current angle
    ///
    /// At angle zero the eye sits half a radius behind the sensor, looking
    /// straight ahead.
    pub fn view(&self) -> Mat4 {
        let x = self.radius * self.angle.sin();
        let z = self.radius * (1.0 - self.angle.cos()) - self.radius / 2.0;
        look_at(
            [x as f32, 0.0, z as f32],
            [0.0, 0.0, (self.radius / 2.0) as f32],
            [0.0, 1.0, 0.0],
        )
    }

    /// View for the current angle, then advance
    pub fn next_view(&mut self) -> Mat4 {
        let view = self.view();
        self.angle += self.step;
        view
    }
}
