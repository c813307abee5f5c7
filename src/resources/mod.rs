//! Core resource definitions
//!
//! CPU-side descriptions of what a mesh instance draws. GPU objects are owned
//! by the renderer and never appear here.
//! - Geometry: positions, indices, bounds, optional skin and morph data
//! - Material: shading description shared through [`MaterialHandle`]
//! - Skin / Morph: skeleton definitions and morph targets
//! - Primitives: generated shapes with lightmap area metrics

pub mod geometry;
pub mod material;
pub mod primitives;
pub mod skin;

pub use geometry::{BoundingBox, Geometry};
pub use material::{Material, MaterialHandle, resolve_primitive_material};
pub use primitives::{LightmapArea, PrimitiveGenerator, PrimitiveKind, ShapePrimitive, ShapePrimitives};
pub use skin::{Morph, MorphInstance, MorphTarget, Skin};
