//! The render component.
//!
//! A [`RenderComponent`] turns one of three payload modes (render asset,
//! shape primitive, explicit list) into mesh instances on its entity and keeps
//! them registered with render layers or the batcher. It owns nothing shared:
//! every collaborator arrives through a [`RenderContext`], and asset or layer
//! notifications are delivered by [`RenderSystem`](crate::system::RenderSystem).
//!
//! Teardown always finishes before new state is built, so layers, the batcher
//! and the skin cache never see the old and new registrations of one component
//! at the same time.

use smallvec::SmallVec;

use crate::assets::{
    Asset, AssetEventKind, AssetId, AssetReference, AssetReferenceHandler, ReferenceSlot,
    ResolveAssetId, dispatch_asset_event,
};
use crate::batching::BatchGroupId;
use crate::component::RenderComponentKey;
use crate::component::context::RenderContext;
use crate::component::data::RenderComponentData;
use crate::component::instances::{MeshInstanceSet, RenderFlags};
use crate::component::membership::{LayerBinding, MembershipState};
use crate::component::mesh_instance::{MeshInstance, RenderStyle};
use crate::component::payload::{RenderPayload, RenderType};
use crate::layers::{Layer, LayerComposition, LayerId};
use crate::resources::{BoundingBox, LightmapArea, MaterialHandle, resolve_primitive_material};
use crate::scene::{EntityReference, EntityTarget, NodeHandle, SceneGraph};
use crate::skinning::SkinInstanceCache;

#[derive(Debug)]
pub struct RenderComponent {
    key: RenderComponentKey,
    entity: NodeHandle,
    enabled: bool,
    removed: bool,

    payload: RenderPayload,
    area: Option<LightmapArea>,
    asset_reference: AssetReference,
    material_references: Vec<AssetReference>,
    material: MaterialHandle,

    instances: MeshInstanceSet,
    binding: LayerBinding,
    flags: RenderFlags,
    root_bone: EntityReference,
}

impl RenderComponent {
    /// A disabled component with an empty asset payload. Use
    /// [`initialize`](Self::initialize) to apply its data and enable it.
    #[must_use]
    pub fn new(
        key: RenderComponentKey,
        entity: NodeHandle,
        default_material: MaterialHandle,
        layers: &[LayerId],
    ) -> Self {
        Self {
            key,
            entity,
            enabled: false,
            removed: false,
            payload: RenderPayload::Asset,
            area: None,
            asset_reference: AssetReference::new(key, ReferenceSlot::Render),
            material_references: Vec::new(),
            material: default_material,
            instances: MeshInstanceSet::new(),
            binding: LayerBinding::new(layers),
            flags: RenderFlags::default(),
            root_bone: EntityReference::new("rootBone"),
        }
    }

    /// Applies `data` while disabled, then enables the component if the data
    /// asks for it.
    pub fn initialize(&mut self, data: RenderComponentData, ctx: &mut RenderContext<'_>) {
        self.flags = RenderFlags {
            cast_shadows: data.cast_shadows.unwrap_or(ctx.settings.cast_shadows),
            receive_shadows: data.receive_shadows.unwrap_or(ctx.settings.receive_shadows),
            render_style: data.render_style,
            lightmapped: data.lightmapped,
            custom_aabb: data.custom_aabb,
        };
        let layers = data.layers.unwrap_or_else(|| ctx.settings.default_layers.clone());
        self.binding
            .set_layers(&layers, ctx.layers, ctx.settings.warn_unknown_layers);
        self.binding.set_batch_group(data.batch_group_id);
        if let Some(guid) = data.root_bone {
            self.root_bone
                .set_target(Some(EntityTarget::Guid(guid)), ctx.scene, self.entity);
        }

        self.set_material_assets(data.material_assets, ctx);
        match data.render_type {
            RenderType::Asset => self.set_asset(data.asset, ctx),
            RenderType::Primitive(_) => {
                self.assign_asset(data.asset, ctx);
                self.set_type(data.render_type, ctx);
            }
        }

        self.set_enabled(data.enabled, ctx);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn key(&self) -> RenderComponentKey {
        self.key
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> NodeHandle {
        self.entity
    }

    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// `None` while the instances come from an explicit list.
    #[must_use]
    pub fn render_type(&self) -> Option<RenderType> {
        self.payload.render_type()
    }

    #[must_use]
    pub fn payload(&self) -> RenderPayload {
        self.payload
    }

    /// Lightmap area of the generated primitive, `None` for other payloads.
    #[must_use]
    pub fn area(&self) -> Option<LightmapArea> {
        self.area
    }

    #[must_use]
    pub fn asset(&self) -> Option<AssetId> {
        self.asset_reference.id()
    }

    #[must_use]
    pub fn material_assets(&self) -> Vec<Option<AssetId>> {
        self.material_references.iter().map(AssetReference::id).collect()
    }

    /// The component-wide material; instances without a slot material use it.
    #[must_use]
    pub fn material(&self) -> &MaterialHandle {
        &self.material
    }

    #[must_use]
    pub fn mesh_instances(&self) -> &[MeshInstance] {
        self.instances.as_slice()
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        self.binding.layers()
    }

    #[must_use]
    pub fn registered_layers(&self) -> &[LayerId] {
        self.binding.registered_layers()
    }

    #[must_use]
    pub fn membership_state(&self) -> MembershipState {
        self.binding.state()
    }

    #[must_use]
    pub fn batch_group_id(&self) -> Option<BatchGroupId> {
        self.binding.batch_group()
    }

    #[must_use]
    pub fn cast_shadows(&self) -> bool {
        self.flags.cast_shadows
    }

    #[must_use]
    pub fn receive_shadows(&self) -> bool {
        self.flags.receive_shadows
    }

    #[must_use]
    pub fn lightmapped(&self) -> bool {
        self.flags.lightmapped
    }

    #[must_use]
    pub fn render_style(&self) -> RenderStyle {
        self.flags.render_style
    }

    #[must_use]
    pub fn custom_aabb(&self) -> Option<&BoundingBox> {
        self.flags.custom_aabb.as_ref()
    }

    #[must_use]
    pub fn root_bone(&self) -> &EntityReference {
        &self.root_bone
    }

    /// Enabled, not removed, and the entity is enabled in the hierarchy.
    #[must_use]
    pub fn is_live(&self, scene: &SceneGraph) -> bool {
        self.enabled && !self.removed && scene.is_enabled_in_hierarchy(self.entity)
    }

    // ========================================================================
    // Payload
    // ========================================================================

    /// Switches the payload type. Setting the current type does nothing.
    pub fn set_type(&mut self, render_type: RenderType, ctx: &mut RenderContext<'_>) {
        let payload = RenderPayload::from(render_type);
        if payload == self.payload {
            return;
        }
        self.area = None;
        self.payload = payload;
        self.destroy_mesh_instances(ctx);

        match payload {
            RenderPayload::Primitive(kind) => {
                let slot_zero = self.slot_material(0, ctx);
                let material = resolve_primitive_material(
                    Some(&self.material),
                    slot_zero.as_ref(),
                    ctx.default_material,
                );
                let primitive = ctx.primitives.generate(kind);
                self.area = Some(primitive.area);
                let mi = MeshInstance::new(primitive.geometry, material, Some(self.entity));
                self.adopt_instances(vec![mi], ctx);
            }
            RenderPayload::Asset => self.on_render_asset_added(ctx),
            RenderPayload::Explicit => {}
        }
    }

    /// Replaces the instances with a caller-built list.
    ///
    /// Instances without a node are bound to this entity and every current
    /// render flag is applied to them.
    pub fn set_mesh_instances(&mut self, instances: Vec<MeshInstance>, ctx: &mut RenderContext<'_>) {
        self.area = None;
        self.payload = RenderPayload::Explicit;
        self.destroy_mesh_instances(ctx);
        self.adopt_instances(instances, ctx);
    }

    /// Binds the render asset. Accepts an id, `None`, or the asset itself.
    pub fn set_asset(&mut self, asset: impl ResolveAssetId, ctx: &mut RenderContext<'_>) {
        let id = asset.asset_id();
        if self.asset_reference.id() == id {
            return;
        }
        if self.asset_reference.is_loaded(ctx.assets) {
            self.on_render_asset_remove(ctx);
        }
        self.asset_reference.set_id(id, ctx.assets);
        if self.asset_reference.asset(ctx.assets).is_some() {
            self.on_render_asset_added(ctx);
        }
    }

    /// Rebinds the render asset without building or requesting anything.
    pub fn assign_asset(&mut self, asset: impl ResolveAssetId, ctx: &mut RenderContext<'_>) {
        self.asset_reference.set_id(asset.asset_id(), ctx.assets);
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Replaces the material asset list. `None` entries clear their slot and
    /// reset the matching instance to the engine default material.
    pub fn set_material_assets<I>(&mut self, assets: I, ctx: &mut RenderContext<'_>)
    where
        I: IntoIterator,
        I::Item: ResolveAssetId,
    {
        let ids: Vec<Option<AssetId>> = assets.into_iter().map(ResolveAssetId::asset_id).collect();

        if self.material_references.len() > ids.len() {
            for mut reference in self.material_references.drain(ids.len()..) {
                reference.set_id(None, ctx.assets);
            }
        }

        for (index, id) in ids.into_iter().enumerate() {
            if index == self.material_references.len() {
                self.material_references
                    .push(AssetReference::new(self.key, ReferenceSlot::Material(index)));
            }
            self.material_references[index].set_id(id, ctx.assets);

            if id.is_some() {
                if self.material_references[index].asset(ctx.assets).is_some() {
                    self.on_material_added(index, ctx);
                }
            } else if let Some(mi) = self.instances.get_mut(index) {
                mi.material = ctx.default_material.clone();
            }
        }
    }

    /// Sets the component-wide material. Asset payloads take their materials
    /// from the slots, so only the stored handle changes for them.
    pub fn set_material(&mut self, material: MaterialHandle) {
        if self.material == material {
            return;
        }
        self.material = material;
        if self.payload != RenderPayload::Asset {
            for mi in self.instances.iter_mut() {
                mi.material = self.material.clone();
            }
        }
    }

    fn update_main_material(&mut self, index: usize, material: MaterialHandle) {
        if index == 0 {
            self.set_material(material);
        }
    }

    fn slot_material(&self, index: usize, ctx: &RenderContext<'_>) -> Option<MaterialHandle> {
        self.material_references
            .get(index)?
            .asset(ctx.assets)
            .and_then(Asset::material)
            .cloned()
    }

    // ========================================================================
    // Root Bone
    // ========================================================================

    pub fn set_root_bone(&mut self, target: Option<EntityTarget>, ctx: &mut RenderContext<'_>) {
        if self.root_bone.target() == target.as_ref() {
            return;
        }
        let events = self.root_bone.set_target(target, ctx.scene, self.entity);
        if !events.is_empty() {
            self.on_root_bone_changed(ctx);
        }
    }

    pub fn set_root_bone_entity(&mut self, node: Option<NodeHandle>, ctx: &mut RenderContext<'_>) {
        let events = self.root_bone.set_entity(node, ctx.scene, self.entity);
        if !events.is_empty() {
            self.on_root_bone_changed(ctx);
        }
    }

    fn on_root_bone_changed(&mut self, ctx: &mut RenderContext<'_>) {
        self.clear_skin_instances(ctx.skins);
        if self.is_live(ctx.scene) {
            self.clone_skin_instances(ctx);
        }
    }

    /// The root bone's node was destroyed; its skin instances go with it.
    pub fn on_entity_destroyed(&mut self, node: NodeHandle, ctx: &mut RenderContext<'_>) {
        if self.root_bone.on_entity_destroyed(node).is_some() {
            self.clear_skin_instances(ctx.skins);
        }
    }

    fn clone_skin_instances(&mut self, ctx: &mut RenderContext<'_>) {
        let Some(root_bone) = self.root_bone.entity() else {
            return;
        };
        if !ctx.scene.contains(root_bone) {
            return;
        }
        for mi in self.instances.iter_mut() {
            if mi.skin_instance.is_some() {
                continue;
            }
            if let Some(skin) = mi.geometry().skin.clone() {
                mi.skin_instance = Some(ctx.skins.acquire(&skin, root_bone, self.entity, ctx.scene));
            }
        }
    }

    fn clear_skin_instances(&mut self, skins: &mut SkinInstanceCache) {
        self.instances.release_skins(skins);
    }

    // ========================================================================
    // Layers, Batching & Render Flags
    // ========================================================================

    pub fn set_layers(&mut self, layers: &[LayerId], ctx: &mut RenderContext<'_>) {
        self.binding
            .set_layers(layers, ctx.layers, ctx.settings.warn_unknown_layers);
        self.sync_membership(ctx);
    }

    /// `None` leaves batching and returns to ordinary layer registration.
    pub fn set_batch_group_id(&mut self, group: Option<BatchGroupId>, ctx: &mut RenderContext<'_>) {
        if self.binding.batch_group() == group {
            return;
        }
        self.binding.set_batch_group(group);
        self.sync_membership(ctx);
    }

    /// Layers see casters leave before the flag clears and join after it is set.
    pub fn set_cast_shadows(&mut self, cast: bool, ctx: &mut RenderContext<'_>) {
        if self.flags.cast_shadows == cast {
            return;
        }
        if !cast {
            self.binding
                .remove_shadow_casters(self.instances.as_slice(), ctx.layers);
        }
        self.flags.cast_shadows = cast;
        for mi in self.instances.iter_mut() {
            mi.cast_shadow = cast;
        }
        if cast {
            self.binding
                .add_shadow_casters(self.instances.as_slice(), ctx.layers);
        }
    }

    pub fn set_receive_shadows(&mut self, receive: bool) {
        self.flags.receive_shadows = receive;
        for mi in self.instances.iter_mut() {
            mi.receive_shadow = receive;
        }
    }

    pub fn set_lightmapped(&mut self, lightmapped: bool) {
        self.flags.lightmapped = lightmapped;
        for mi in self.instances.iter_mut() {
            mi.lightmapped = lightmapped;
        }
    }

    pub fn set_render_style(&mut self, style: RenderStyle) {
        self.flags.render_style = style;
        for mi in self.instances.iter_mut() {
            mi.render_style = style;
        }
    }

    pub fn set_custom_aabb(&mut self, aabb: Option<BoundingBox>) {
        self.flags.custom_aabb = aabb;
        for mi in self.instances.iter_mut() {
            mi.custom_aabb = aabb;
        }
    }

    /// Hides every instance. Layer registration is left alone.
    pub fn hide(&mut self) {
        for mi in self.instances.iter_mut() {
            mi.visible = false;
        }
    }

    pub fn show(&mut self) {
        for mi in self.instances.iter_mut() {
            mi.visible = true;
        }
    }

    fn sync_membership(&mut self, ctx: &mut RenderContext<'_>) {
        let live = self.is_live(ctx.scene);
        self.binding.sync(
            self.instances.as_slice(),
            live,
            self.entity,
            ctx.layers,
            ctx.batcher,
        );
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn set_enabled(&mut self, enabled: bool, ctx: &mut RenderContext<'_>) {
        if self.enabled == enabled || self.removed {
            return;
        }
        let was_live = self.is_live(ctx.scene);
        self.enabled = enabled;
        let live = self.is_live(ctx.scene);
        if live && !was_live {
            self.on_enable(ctx);
        } else if was_live && !live {
            self.on_disable(ctx);
        }
    }

    /// Called when the component becomes live.
    pub fn on_enable(&mut self, ctx: &mut RenderContext<'_>) {
        if !self.is_live(ctx.scene) {
            return;
        }
        let events = self
            .root_bone
            .on_parent_component_enable(ctx.scene, self.entity);
        if !events.is_empty() {
            self.clear_skin_instances(ctx.skins);
        }
        self.clone_skin_instances(ctx);

        ctx.layers.subscribe(self.key);

        if self.instances.is_empty()
            && self.payload == RenderPayload::Asset
            && self.asset_reference.asset(ctx.assets).is_some()
        {
            self.on_render_asset_added(ctx);
        }

        let pending: SmallVec<[AssetId; 4]> = self
            .material_references
            .iter()
            .filter_map(|r| r.asset(ctx.assets))
            .filter(|asset| !asset.is_loaded())
            .map(Asset::id)
            .collect();
        for id in pending {
            ctx.assets.load(id);
        }

        self.sync_membership(ctx);
    }

    /// Called when the component stops being live. Instances and asset
    /// references are kept so enabling again is cheap.
    pub fn on_disable(&mut self, ctx: &mut RenderContext<'_>) {
        ctx.layers.unsubscribe(self.key);
        self.binding.sync(
            self.instances.as_slice(),
            false,
            self.entity,
            ctx.layers,
            ctx.batcher,
        );
    }

    /// Permanent detachment. Safe to call more than once.
    pub fn on_remove(&mut self, ctx: &mut RenderContext<'_>) {
        if self.removed {
            return;
        }
        self.on_disable(ctx);
        self.removed = true;
        self.destroy_mesh_instances(ctx);

        self.asset_reference.set_id(None, ctx.assets);
        for reference in &mut self.material_references {
            reference.set_id(None, ctx.assets);
        }
        self.root_bone.set_target(None, ctx.scene, self.entity);
    }

    /// The entity was attached somewhere in the hierarchy.
    pub fn on_insert_child(&mut self, ctx: &mut RenderContext<'_>) {
        if !self.instances.is_empty() && self.is_live(ctx.scene) {
            self.sync_membership(ctx);
        }
    }

    /// The entity was taken out of the hierarchy.
    pub fn on_remove_child(&mut self, ctx: &mut RenderContext<'_>) {
        self.binding
            .remove_from_layers(self.instances.as_slice(), ctx.layers);
    }

    // ========================================================================
    // Layer Composition Notifications
    // ========================================================================

    pub fn on_layer_added(&mut self, id: LayerId, ctx: &mut RenderContext<'_>) {
        if self.binding.layers().contains(&id) {
            self.sync_membership(ctx);
        }
    }

    pub fn on_layer_removed(&mut self, layer: &mut Layer) {
        self.binding
            .on_layer_removed(layer, self.instances.as_slice());
    }

    /// The scene swapped its whole composition; `ctx.layers` is the new one.
    pub fn on_layers_replaced(&mut self, old: &mut LayerComposition, ctx: &mut RenderContext<'_>) {
        self.binding
            .remove_from_layers(self.instances.as_slice(), old);
        old.unsubscribe(self.key);
        if self.is_live(ctx.scene) {
            ctx.layers.subscribe(self.key);
        }
        self.sync_membership(ctx);
    }

    // ========================================================================
    // Mesh Instances
    // ========================================================================

    fn adopt_instances(&mut self, instances: Vec<MeshInstance>, ctx: &mut RenderContext<'_>) {
        self.instances.replace(instances, self.entity, &self.flags);
        self.sync_membership(ctx);
        self.clone_skin_instances(ctx);
    }

    /// Builds one instance per mesh; slot `i` supplies the material of mesh
    /// `i`, the component material covers the rest.
    fn clone_meshes(&mut self, ctx: &mut RenderContext<'_>) {
        let Some(meshes) = self
            .asset_reference
            .asset(ctx.assets)
            .and_then(Asset::render_meshes)
        else {
            return;
        };
        if meshes.is_empty() {
            return;
        }

        let instances: Vec<MeshInstance> = meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| {
                let material = self
                    .slot_material(index, ctx)
                    .unwrap_or_else(|| self.material.clone());
                MeshInstance::new(mesh.clone(), material, Some(self.entity))
            })
            .collect();
        log::debug!(
            "Render component on {:?} built {} mesh instances",
            self.entity,
            instances.len()
        );
        self.adopt_instances(instances, ctx);
    }

    /// Unregisters, releases skins and drops every instance. Idempotent.
    pub fn destroy_mesh_instances(&mut self, ctx: &mut RenderContext<'_>) {
        self.binding
            .remove_from_layers(self.instances.as_slice(), ctx.layers);
        self.instances.clear(ctx.skins);
    }

    // ========================================================================
    // Asset Notifications
    // ========================================================================

    /// Entry point for registry notifications; ignores ones whose asset no
    /// longer matches the reference they were routed to.
    pub fn handle_asset_event(
        &mut self,
        id: AssetId,
        slot: ReferenceSlot,
        kind: AssetEventKind,
        ctx: &mut RenderContext<'_>,
    ) {
        let reference = match slot {
            ReferenceSlot::Render => Some(&self.asset_reference),
            ReferenceSlot::Material(index) => self.material_references.get(index),
        };
        if reference.is_some_and(|r| r.matches(id)) {
            dispatch_asset_event(self, slot, kind, ctx);
        }
    }

    fn on_render_asset_added(&mut self, ctx: &mut RenderContext<'_>) {
        if self.payload != RenderPayload::Asset {
            return;
        }
        let Some(asset) = self.asset_reference.asset(ctx.assets) else {
            return;
        };
        if asset.is_loaded() {
            self.on_render_asset_load(ctx);
        } else if self.is_live(ctx.scene) {
            let id = asset.id();
            ctx.assets.load(id);
        }
    }

    fn on_render_asset_load(&mut self, ctx: &mut RenderContext<'_>) {
        self.destroy_mesh_instances(ctx);
        self.clone_meshes(ctx);
    }

    fn on_render_asset_remove(&mut self, ctx: &mut RenderContext<'_>) {
        if self.payload == RenderPayload::Asset {
            self.destroy_mesh_instances(ctx);
        }
    }

    fn on_material_added(&mut self, index: usize, ctx: &mut RenderContext<'_>) {
        let Some(asset) = self
            .material_references
            .get(index)
            .and_then(|r| r.asset(ctx.assets))
        else {
            return;
        };
        if asset.is_loaded() {
            self.on_material_load(index, ctx);
        } else if self.is_live(ctx.scene) {
            let id = asset.id();
            ctx.assets.load(id);
        }
    }

    fn on_material_load(&mut self, index: usize, ctx: &mut RenderContext<'_>) {
        let Some(material) = self.slot_material(index, ctx) else {
            return;
        };
        if let Some(mi) = self.instances.get_mut(index) {
            mi.material = material.clone();
        }
        self.update_main_material(index, material);
    }

    fn on_material_reset(&mut self, index: usize, ctx: &mut RenderContext<'_>) {
        if let Some(mi) = self.instances.get_mut(index) {
            mi.material = ctx.default_material.clone();
        }
        self.update_main_material(index, ctx.default_material.clone());
    }
}

impl<'a> AssetReferenceHandler<RenderContext<'a>> for RenderComponent {
    fn on_asset_added(&mut self, slot: ReferenceSlot, ctx: &mut RenderContext<'a>) {
        match slot {
            ReferenceSlot::Render => self.on_render_asset_added(ctx),
            ReferenceSlot::Material(index) => self.on_material_added(index, ctx),
        }
    }

    fn on_asset_loaded(&mut self, slot: ReferenceSlot, ctx: &mut RenderContext<'a>) {
        match slot {
            ReferenceSlot::Render if self.payload == RenderPayload::Asset => {
                self.on_render_asset_load(ctx);
            }
            ReferenceSlot::Render => {}
            ReferenceSlot::Material(index) => self.on_material_load(index, ctx),
        }
    }

    fn on_asset_changed(&mut self, slot: ReferenceSlot, ctx: &mut RenderContext<'a>) {
        self.on_asset_loaded(slot, ctx);
    }

    fn on_asset_removed(&mut self, slot: ReferenceSlot, ctx: &mut RenderContext<'a>) {
        match slot {
            ReferenceSlot::Render => self.on_render_asset_remove(ctx),
            ReferenceSlot::Material(index) => self.on_material_reset(index, ctx),
        }
    }

    fn on_asset_unloaded(&mut self, slot: ReferenceSlot, ctx: &mut RenderContext<'a>) {
        self.on_asset_removed(slot, ctx);
    }
}
