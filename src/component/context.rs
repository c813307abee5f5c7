use crate::assets::AssetRegistry;
use crate::batching::Batcher;
use crate::layers::LayerComposition;
use crate::resources::{MaterialHandle, PrimitiveGenerator};
use crate::scene::SceneGraph;
use crate::settings::RenderSettings;
use crate::skinning::SkinInstanceCache;

/// Collaborators a render component needs to react to a change.
///
/// Built by [`RenderSystem`](crate::system::RenderSystem) for each call; tests
/// may assemble one from their own isolated pieces.
pub struct RenderContext<'a> {
    pub scene: &'a SceneGraph,
    pub assets: &'a mut AssetRegistry,
    pub layers: &'a mut LayerComposition,
    pub batcher: &'a mut dyn Batcher,
    pub skins: &'a mut SkinInstanceCache,
    pub primitives: &'a mut dyn PrimitiveGenerator,
    pub default_material: &'a MaterialHandle,
    pub settings: &'a RenderSettings,
}
