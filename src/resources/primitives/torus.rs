use glam::Vec3;
use std::f32::consts::PI;

use crate::resources::geometry::Geometry;

pub struct TorusOptions {
    pub tube_radius: f32,
    pub ring_radius: f32,
    pub segments: u32,
    pub sides: u32,
}

impl Default for TorusOptions {
    fn default() -> Self {
        Self {
            tube_radius: 0.2,
            ring_radius: 0.3,
            segments: 30,
            sides: 20,
        }
    }
}

/// Torus lying in the XZ plane.
#[must_use]
pub fn create_torus(options: &TorusOptions) -> Geometry {
    let segments = options.segments.max(3);
    let sides = options.sides.max(3);

    let mut positions = Vec::with_capacity(((segments + 1) * (sides + 1)) as usize);
    for i in 0..=sides {
        let tube = i as f32 / sides as f32 * 2.0 * PI;
        let r = options.ring_radius + options.tube_radius * tube.cos();
        let y = options.tube_radius * tube.sin();
        for j in 0..=segments {
            let ring = j as f32 / segments as f32 * 2.0 * PI;
            positions.push(Vec3::new(r * ring.cos(), y, r * ring.sin()));
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * sides * 6) as usize);
    for i in 0..sides {
        for j in 0..segments {
            let a = i * stride + j;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    Geometry::new("Torus", positions, indices)
}
