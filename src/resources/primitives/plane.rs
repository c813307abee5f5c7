use glam::Vec3;

use crate::resources::geometry::Geometry;

pub struct PlaneOptions {
    pub width: f32,
    pub length: f32,
    pub width_segments: u32,
    pub length_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            length: 1.0,
            width_segments: 1,
            length_segments: 1,
        }
    }
}

/// A plane in XZ facing +Y.
#[must_use]
pub fn create_plane(options: &PlaneOptions) -> Geometry {
    let ws = options.width_segments.max(1);
    let ls = options.length_segments.max(1);
    let half_w = options.width / 2.0;
    let half_l = options.length / 2.0;

    let mut positions = Vec::with_capacity(((ws + 1) * (ls + 1)) as usize);
    for iz in 0..=ls {
        let z = -half_l + options.length * (iz as f32 / ls as f32);
        for ix in 0..=ws {
            let x = -half_w + options.width * (ix as f32 / ws as f32);
            positions.push(Vec3::new(x, 0.0, z));
        }
    }

    let row = ws + 1;
    let mut indices = Vec::with_capacity((ws * ls * 6) as usize);
    for iz in 0..ls {
        for ix in 0..ws {
            let a = iz * row + ix;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    Geometry::new("Plane", positions, indices)
}
