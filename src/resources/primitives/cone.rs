use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::resources::geometry::Geometry;

/// Cone frustum; equal radii give a cylinder.
pub struct ConeOptions {
    pub base_radius: f32,
    pub peak_radius: f32,
    pub height: f32,
    pub height_segments: u32,
    pub cap_segments: u32,
}

impl Default for ConeOptions {
    fn default() -> Self {
        Self {
            base_radius: 0.5,
            peak_radius: 0.0,
            height: 1.0,
            height_segments: 5,
            cap_segments: 20,
        }
    }
}

#[must_use]
pub fn create_cone(options: &ConeOptions) -> Geometry {
    let segments = options.cap_segments.max(3);
    let rings = options.height_segments.max(1);
    let half = options.height / 2.0;

    let mut positions = Vec::new();
    let mut indices = Vec::new();

    // Side wall
    for i in 0..=rings {
        let t = i as f32 / rings as f32;
        let y = -half + options.height * t;
        let r = options.base_radius + (options.peak_radius - options.base_radius) * t;
        for j in 0..=segments {
            let theta = j as f32 / segments as f32 * 2.0 * PI;
            positions.push(Vec3::new(r * theta.sin(), y, r * theta.cos()));
        }
    }
    let stride = segments + 1;
    for i in 0..rings {
        for j in 0..segments {
            let a = i * stride + j;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    push_cap(&mut positions, &mut indices, -half, options.base_radius, segments, false);
    if options.peak_radius > 0.0 {
        push_cap(&mut positions, &mut indices, half, options.peak_radius, segments, true);
    }

    Geometry::new("Cone", positions, indices)
}

fn push_cap(
    positions: &mut Vec<Vec3>,
    indices: &mut Vec<u32>,
    y: f32,
    radius: f32,
    segments: u32,
    facing_up: bool,
) {
    let center = positions.len() as u32;
    positions.push(Vec3::new(0.0, y, 0.0));
    for j in 0..segments {
        let theta = j as f32 / segments as f32 * 2.0 * PI;
        positions.push(Vec3::new(radius * theta.sin(), y, radius * theta.cos()));
    }
    for j in 0..segments {
        let a = center + 1 + j;
        let b = center + 1 + (j + 1) % segments;
        if facing_up {
            indices.extend_from_slice(&[center, a, b]);
        } else {
            indices.extend_from_slice(&[center, b, a]);
        }
    }
}

/// Capsule along Y: a cylinder of `height - 2 * radius` capped by hemispheres.
#[must_use]
pub fn create_capsule(radius: f32, height: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);
    let hemi_rings = (segments / 2).max(2);
    let half_body = ((height - 2.0 * radius) / 2.0).max(0.0);

    let mut positions = Vec::new();
    let mut indices = Vec::new();

    // Rings from bottom pole to top pole; the two equator rings are offset by
    // the body half-height so the quads between them form the cylinder.
    let total_rings = hemi_rings * 2 + 1;
    for ring in 0..=total_rings {
        let (lat, offset) = if ring <= hemi_rings {
            (-FRAC_PI_2 + FRAC_PI_2 * ring as f32 / hemi_rings as f32, -half_body)
        } else {
            (FRAC_PI_2 * (ring - hemi_rings - 1) as f32 / hemi_rings as f32, half_body)
        };
        let y = radius * lat.sin() + offset;
        let r = radius * lat.cos();
        for j in 0..=segments {
            let theta = j as f32 / segments as f32 * 2.0 * PI;
            positions.push(Vec3::new(r * theta.sin(), y, r * theta.cos()));
        }
    }

    let stride = segments + 1;
    for ring in 0..total_rings {
        for j in 0..segments {
            let a = ring * stride + j;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    Geometry::new("Capsule", positions, indices)
}
