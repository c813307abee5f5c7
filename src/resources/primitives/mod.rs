//! Shape primitives
//!
//! Procedural geometry for the render component's primitive types, along with
//! the lightmap area metric each shape reports. Generated geometry is shared:
//! [`ShapePrimitives`] builds each kind once and hands out the same
//! `Arc<Geometry>` to every component asking for it.

pub mod box_shape;
pub mod cone;
pub mod plane;
pub mod sphere;
pub mod torus;

pub use box_shape::create_box;
pub use cone::{ConeOptions, create_capsule, create_cone};
pub use plane::{PlaneOptions, create_plane};
pub use sphere::{SphereOptions, create_sphere};
pub use torus::{TorusOptions, create_torus};

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::RenderableError;
use crate::resources::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Box,
    Capsule,
    Cone,
    Cylinder,
    Plane,
    Sphere,
    Torus,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 7] = [
        Self::Box,
        Self::Capsule,
        Self::Cone,
        Self::Cylinder,
        Self::Plane,
        Self::Sphere,
        Self::Torus,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Capsule => "capsule",
            Self::Cone => "cone",
            Self::Cylinder => "cylinder",
            Self::Plane => "plane",
            Self::Sphere => "sphere",
            Self::Torus => "torus",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveKind {
    type Err = RenderableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RenderableError::UnknownRenderType(s.to_string()))
    }
}

/// Surface area per projection axis plus the UV-space area, used by the
/// lightmapper to size lightmaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightmapArea {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub uv: f32,
}

impl LightmapArea {
    #[must_use]
    pub fn for_kind(kind: PrimitiveKind) -> Self {
        let third = 1.0 / 3.0;
        match kind {
            PrimitiveKind::Box => Self { x: 2.0, y: 2.0, z: 2.0, uv: 2.0 / 3.0 },
            PrimitiveKind::Capsule => Self {
                x: PI * 2.0,
                y: PI,
                z: PI * 2.0,
                uv: third + (third / 3.0) * 2.0,
            },
            PrimitiveKind::Cone => Self { x: 2.54, y: 2.54, z: 2.54, uv: third + third / 3.0 },
            PrimitiveKind::Cylinder => Self {
                x: PI,
                y: 0.79 * 2.0,
                z: PI,
                uv: third + (third / 3.0) * 2.0,
            },
            PrimitiveKind::Plane => Self { x: 0.0, y: 1.0, z: 0.0, uv: 1.0 },
            PrimitiveKind::Sphere => Self { x: PI, y: PI, z: PI, uv: 1.0 },
            PrimitiveKind::Torus => Self {
                x: PI * 0.5 * 0.5 - PI * 0.1 * 0.1,
                y: 0.4,
                z: 0.4,
                uv: 1.0,
            },
        }
    }
}

/// Output of primitive generation.
#[derive(Debug, Clone)]
pub struct ShapePrimitive {
    pub geometry: Arc<Geometry>,
    pub area: LightmapArea,
}

/// Shape generation seam. The render component only asks for a kind.
pub trait PrimitiveGenerator {
    fn generate(&mut self, kind: PrimitiveKind) -> ShapePrimitive;
}

/// Default generator: unit-sized shapes, optionally cached per kind.
#[derive(Debug, Default)]
pub struct ShapePrimitives {
    cache: FxHashMap<PrimitiveKind, Arc<Geometry>>,
    share: bool,
}

impl ShapePrimitives {
    #[must_use]
    pub fn new(share: bool) -> Self {
        Self {
            cache: FxHashMap::default(),
            share,
        }
    }

    /// Number of kinds generated so far (always zero when sharing is off).
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    fn build(kind: PrimitiveKind) -> Geometry {
        match kind {
            PrimitiveKind::Box => create_box(1.0, 1.0, 1.0),
            PrimitiveKind::Capsule => create_capsule(0.5, 2.0, 20),
            PrimitiveKind::Cone => create_cone(&ConeOptions {
                base_radius: 0.5,
                peak_radius: 0.0,
                height: 1.0,
                ..Default::default()
            }),
            PrimitiveKind::Cylinder => create_cone(&ConeOptions {
                base_radius: 0.5,
                peak_radius: 0.5,
                height: 1.0,
                ..Default::default()
            }),
            PrimitiveKind::Plane => create_plane(&PlaneOptions::default()),
            PrimitiveKind::Sphere => create_sphere(&SphereOptions {
                radius: 0.5,
                ..Default::default()
            }),
            PrimitiveKind::Torus => create_torus(&TorusOptions::default()),
        }
    }
}

impl PrimitiveGenerator for ShapePrimitives {
    fn generate(&mut self, kind: PrimitiveKind) -> ShapePrimitive {
        let geometry = if self.share {
            Arc::clone(
                self.cache
                    .entry(kind)
                    .or_insert_with(|| Arc::new(Self::build(kind))),
            )
        } else {
            Arc::new(Self::build(kind))
        };

        ShapePrimitive {
            geometry,
            area: LightmapArea::for_kind(kind),
        }
    }
}
