#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Render component binding layer.
//!
//! Attaches renderable geometry to scene-graph nodes: a [`RenderComponent`]
//! resolves a render asset, a shape primitive or an explicit list into
//! [`MeshInstance`]s, keeps them registered with render layers or the batcher,
//! and follows asset, material and skin changes as they arrive.
//!
//! Everything is driven through [`RenderSystem`], which owns the scene graph,
//! the asset registry, the layer composition, the batcher and the shared
//! [`SkinInstanceCache`], and routes their notifications to components.

pub mod assets;
pub mod batching;
pub mod component;
pub mod errors;
pub mod layers;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod skinning;
pub mod system;

pub use assets::{Asset, AssetId, AssetKind, AssetPayload, AssetRegistry, RenderData};
pub use batching::{BatchGroupId, BatchGroupKind, BatchRegistry, Batcher};
pub use component::{
    MeshInstance, MembershipState, RenderComponent, RenderComponentData, RenderComponentKey,
    RenderComponentMut, RenderPayload, RenderStyle, RenderType,
};
pub use errors::{RenderableError, Result};
pub use layers::{Layer, LayerComposition, LayerId};
pub use resources::{BoundingBox, Geometry, Material, MaterialHandle, Morph, PrimitiveKind, Skin};
pub use scene::{Capabilities, EntityReference, EntityTarget, NodeHandle, SceneGraph};
pub use settings::RenderSettings;
pub use skinning::{SkinInstance, SkinInstanceCache, SkinInstanceKey};
pub use system::RenderSystem;
