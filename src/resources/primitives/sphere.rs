use glam::Vec3;
use std::f32::consts::PI;

use crate::resources::geometry::Geometry;

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

#[must_use]
pub fn create_sphere(options: &SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for y in 0..=height_segments {
        // Latitude angle: from 0 to PI (south pole to north pole)
        let theta = y as f32 / height_segments as f32 * PI;
        let py = -radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let phi = x as f32 / width_segments as f32 * 2.0 * PI;
            positions.push(Vec3::new(-ring_radius * phi.cos(), py, ring_radius * phi.sin()));
        }
    }

    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v1 = y * stride + x;
            let v2 = v1 + 1;
            let v3 = v1 + stride;
            let v4 = v3 + 1;

            // Skip the degenerate triangle at each pole
            if y != 0 {
                indices.extend_from_slice(&[v1, v2, v3]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[v2, v4, v3]);
            }
        }
    }

    Geometry::new("Sphere", positions, indices)
}
