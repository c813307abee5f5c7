use glam::Vec3;

use crate::resources::geometry::Geometry;

#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> Geometry {
    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // 24 vertices (4 per face) so faces keep hard edges
    let positions = vec![
        // Front face (+Z)
        Vec3::new(-w, -h, d),
        Vec3::new(w, -h, d),
        Vec3::new(w, h, d),
        Vec3::new(-w, h, d),
        // Back face (-Z)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, -h, -d),
        // Top face (+Y)
        Vec3::new(-w, h, -d),
        Vec3::new(-w, h, d),
        Vec3::new(w, h, d),
        Vec3::new(w, h, -d),
        // Bottom face (-Y)
        Vec3::new(-w, -h, -d),
        Vec3::new(w, -h, -d),
        Vec3::new(w, -h, d),
        Vec3::new(-w, -h, d),
        // Right face (+X)
        Vec3::new(w, -h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, h, d),
        Vec3::new(w, -h, d),
        // Left face (-X)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, -h, d),
        Vec3::new(-w, h, d),
        Vec3::new(-w, h, -d),
    ];

    let indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    Geometry::new("Box", positions, indices)
}
