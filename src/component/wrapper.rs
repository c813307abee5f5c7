//! Chainable render component wrapper.
//!
//! [`RenderComponentMut`] borrows a [`RenderSystem`] mutably and forwards
//! property changes to one component with the system's collaborators in
//! place:
//!
//! ```rust,ignore
//! system.component_mut(entity)?
//!     .set_type(PrimitiveKind::Sphere.into())
//!     .set_layers(&[LayerId::WORLD, LayerId::UI])
//!     .set_cast_shadows(false);
//! ```
//!
//! Methods silently no-op when the component has been removed in between.
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]

use crate::assets::ResolveAssetId;
use crate::batching::BatchGroupId;
use crate::component::context::RenderContext;
use crate::component::mesh_instance::{MeshInstance, RenderStyle};
use crate::component::payload::RenderType;
use crate::component::render::RenderComponent;
use crate::component::RenderComponentKey;
use crate::layers::LayerId;
use crate::resources::{BoundingBox, MaterialHandle};
use crate::scene::{EntityTarget, NodeHandle};
use crate::system::RenderSystem;

pub struct RenderComponentMut<'a> {
    system: &'a mut RenderSystem,
    key: RenderComponentKey,
}

impl<'a> RenderComponentMut<'a> {
    #[inline]
    pub(crate) fn new(system: &'a mut RenderSystem, key: RenderComponentKey) -> Self {
        Self { system, key }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> RenderComponentKey {
        self.key
    }

    /// Read access to the component.
    pub fn get(&self) -> Option<&RenderComponent> {
        self.system.component_by_key(self.key)
    }

    fn with(self, f: impl FnOnce(&mut RenderComponent, &mut RenderContext<'_>)) -> Self {
        self.system.with_component(self.key, f);
        self
    }

    pub fn set_enabled(self, enabled: bool) -> Self {
        self.with(|c, ctx| c.set_enabled(enabled, ctx))
    }

    pub fn set_type(self, render_type: RenderType) -> Self {
        self.with(|c, ctx| c.set_type(render_type, ctx))
    }

    pub fn set_asset(self, asset: impl ResolveAssetId) -> Self {
        self.with(|c, ctx| c.set_asset(asset, ctx))
    }

    pub fn set_mesh_instances(self, instances: Vec<MeshInstance>) -> Self {
        self.with(|c, ctx| c.set_mesh_instances(instances, ctx))
    }

    pub fn set_material(self, material: MaterialHandle) -> Self {
        self.with(|c, _| c.set_material(material))
    }

    pub fn set_material_assets<I>(self, assets: I) -> Self
    where
        I: IntoIterator,
        I::Item: ResolveAssetId,
    {
        self.with(|c, ctx| c.set_material_assets(assets, ctx))
    }

    pub fn set_root_bone(self, target: Option<EntityTarget>) -> Self {
        self.with(|c, ctx| c.set_root_bone(target, ctx))
    }

    pub fn set_root_bone_entity(self, node: Option<NodeHandle>) -> Self {
        self.with(|c, ctx| c.set_root_bone_entity(node, ctx))
    }

    pub fn set_layers(self, layers: &[LayerId]) -> Self {
        self.with(|c, ctx| c.set_layers(layers, ctx))
    }

    pub fn set_batch_group_id(self, group: Option<BatchGroupId>) -> Self {
        self.with(|c, ctx| c.set_batch_group_id(group, ctx))
    }

    pub fn set_cast_shadows(self, cast: bool) -> Self {
        self.with(|c, ctx| c.set_cast_shadows(cast, ctx))
    }

    pub fn set_receive_shadows(self, receive: bool) -> Self {
        self.with(|c, _| c.set_receive_shadows(receive))
    }

    pub fn set_lightmapped(self, lightmapped: bool) -> Self {
        self.with(|c, _| c.set_lightmapped(lightmapped))
    }

    pub fn set_render_style(self, style: RenderStyle) -> Self {
        self.with(|c, _| c.set_render_style(style))
    }

    pub fn set_custom_aabb(self, aabb: Option<BoundingBox>) -> Self {
        self.with(|c, _| c.set_custom_aabb(aabb))
    }

    pub fn hide(self) -> Self {
        self.with(|c, _| c.hide())
    }

    pub fn show(self) -> Self {
        self.with(|c, _| c.show())
    }
}
