use std::sync::Arc;

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resources::skin::{Morph, Skin};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing every point; `None` for an empty set.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);
        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self {
            min: new_min,
            max: new_max,
        }
    }
}

/// Triangle geometry shared between mesh instances.
///
/// A render asset's payload is a list of these (one per sub-mesh). Geometry is
/// immutable once built and handed around as `Arc<Geometry>`; identity is the
/// `uuid`.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    pub name: String,

    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,

    bounding_box: BoundingBox,

    /// Skeleton definition, present on skinned meshes.
    pub skin: Option<Arc<Skin>>,
    /// Morph targets, present on blend-shape meshes.
    pub morph: Option<Arc<Morph>>,
}

impl Geometry {
    #[must_use]
    pub fn new(name: &str, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounding_box = BoundingBox::from_points(&positions)
            .unwrap_or(BoundingBox::new(Vec3::ZERO, Vec3::ZERO));
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            positions,
            indices,
            bounding_box,
            skin: None,
            morph: None,
        }
    }

    #[must_use]
    pub fn with_skin(mut self, skin: Arc<Skin>) -> Self {
        self.skin = Some(skin);
        self
    }

    #[must_use]
    pub fn with_morph(mut self, morph: Arc<Morph>) -> Self {
        self.morph = Some(morph);
        self
    }

    #[inline]
    #[must_use]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }
}
