//! Render system
//!
//! [`RenderSystem`] owns every collaborator a render component talks to and
//! is the single place where notifications are routed:
//! - Scene mutations made through it (attach, detach, enable, destroy) are
//!   turned into component enable/disable and insert/remove calls.
//! - Asset and layer notifications queue up in their containers and are
//!   delivered synchronously by [`process_events`](RenderSystem::process_events).
//!
//! # Example
//!
//! ```rust,ignore
//! let mut system = RenderSystem::default();
//! let entity = system.create_node("Crate");
//! system.add_component(entity, RenderComponentData::primitive(PrimitiveKind::Box))?;
//! system.process_events();
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::assets::{AssetEvent, AssetListener, AssetRegistry};
use crate::batching::BatchRegistry;
use crate::component::{
    RenderComponent, RenderComponentData, RenderComponentKey, RenderComponentMut, RenderContext,
};
use crate::errors::{RenderableError, Result};
use crate::layers::{LayerComposition, LayerEvent};
use crate::resources::{Material, MaterialHandle, ShapePrimitives};
use crate::scene::{Capabilities, NodeHandle, SceneGraph};
use crate::settings::RenderSettings;
use crate::skinning::SkinInstanceCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HierarchyChange {
    Inserted,
    Removed,
    State,
}

#[derive(Debug)]
pub struct RenderSystem {
    scene: SceneGraph,
    assets: AssetRegistry,
    layers: LayerComposition,
    batcher: BatchRegistry,
    skins: SkinInstanceCache,
    primitives: ShapePrimitives,
    default_material: MaterialHandle,
    settings: RenderSettings,

    components: SlotMap<RenderComponentKey, RenderComponent>,
    by_entity: FxHashMap<NodeHandle, RenderComponentKey>,
}

impl RenderSystem {
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            scene: SceneGraph::new(),
            assets: AssetRegistry::new(),
            layers: LayerComposition::with_default_layers(),
            batcher: BatchRegistry::new(),
            skins: SkinInstanceCache::new(),
            primitives: ShapePrimitives::new(settings.primitive_cache),
            default_material: MaterialHandle::new(Material::new("Default Material")),
            settings,
            components: SlotMap::with_key(),
            by_entity: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    #[must_use]
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// Registry mutations queue notifications; call
    /// [`process_events`](Self::process_events) to deliver them.
    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    #[must_use]
    pub fn layers(&self) -> &LayerComposition {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerComposition {
        &mut self.layers
    }

    #[must_use]
    pub fn batcher(&self) -> &BatchRegistry {
        &self.batcher
    }

    #[must_use]
    pub fn skins(&self) -> &SkinInstanceCache {
        &self.skins
    }

    #[must_use]
    pub fn primitives(&self) -> &ShapePrimitives {
        &self.primitives
    }

    #[must_use]
    pub fn default_material(&self) -> &MaterialHandle {
        &self.default_material
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Swaps the whole layer composition and returns the old one, with every
    /// component's registrations already taken out of it.
    pub fn set_layer_composition(&mut self, composition: LayerComposition) -> LayerComposition {
        let mut old = std::mem::replace(&mut self.layers, composition);
        log::debug!(
            "Layer composition '{}' replaced by '{}'",
            old.name,
            self.layers.name
        );

        let keys: Vec<_> = self.components.keys().collect();
        for key in keys {
            let (components, mut ctx) = self.split();
            if let Some(component) = components.get_mut(key) {
                component.on_layers_replaced(&mut old, &mut ctx);
            }
        }
        old
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Adds a render component to `entity` and initializes it from `data`.
    ///
    /// An entity carries at most one render component; adding a second one
    /// warns and returns the existing key.
    pub fn add_component(
        &mut self,
        entity: NodeHandle,
        data: RenderComponentData,
    ) -> Result<RenderComponentKey> {
        if !self.scene.contains(entity) {
            return Err(RenderableError::NodeNotFound);
        }
        if let Some(&key) = self.by_entity.get(&entity) {
            log::warn!("Entity {entity:?} already has a render component");
            return Ok(key);
        }

        let default_material = self.default_material.clone();
        let layers = self.settings.default_layers.clone();
        let key = self.components.insert_with_key(|key| {
            RenderComponent::new(key, entity, default_material, &layers)
        });
        self.by_entity.insert(entity, key);
        self.scene.insert_capabilities(entity, Capabilities::RENDER);

        self.with_component(key, |component, ctx| component.initialize(data, ctx));
        Ok(key)
    }

    /// Fully tears down and drops the component on `entity`.
    pub fn remove_component(&mut self, entity: NodeHandle) -> Result<()> {
        let key = self
            .by_entity
            .remove(&entity)
            .ok_or(RenderableError::ComponentNotFound)?;
        self.teardown(entity, key);
        Ok(())
    }

    fn teardown(&mut self, entity: NodeHandle, key: RenderComponentKey) {
        self.with_component(key, RenderComponent::on_remove);
        self.components.remove(key);
        self.scene.remove_capabilities(entity, Capabilities::RENDER);
    }

    #[must_use]
    pub fn component(&self, entity: NodeHandle) -> Option<&RenderComponent> {
        self.by_entity
            .get(&entity)
            .and_then(|&key| self.components.get(key))
    }

    #[must_use]
    pub fn component_by_key(&self, key: RenderComponentKey) -> Option<&RenderComponent> {
        self.components.get(key)
    }

    /// Chainable mutable access to the component on `entity`.
    pub fn component_mut(&mut self, entity: NodeHandle) -> Option<RenderComponentMut<'_>> {
        let key = *self.by_entity.get(&entity)?;
        Some(RenderComponentMut::new(self, key))
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Runs `f` on one component with the collaborators in place. Returns
    /// `false` for a stale key.
    pub fn with_component(
        &mut self,
        key: RenderComponentKey,
        f: impl FnOnce(&mut RenderComponent, &mut RenderContext<'_>),
    ) -> bool {
        let (components, mut ctx) = self.split();
        match components.get_mut(key) {
            Some(component) => {
                f(component, &mut ctx);
                true
            }
            None => false,
        }
    }

    fn split(&mut self) -> (&mut SlotMap<RenderComponentKey, RenderComponent>, RenderContext<'_>) {
        (
            &mut self.components,
            RenderContext {
                scene: &self.scene,
                assets: &mut self.assets,
                layers: &mut self.layers,
                batcher: &mut self.batcher,
                skins: &mut self.skins,
                primitives: &mut self.primitives,
                default_material: &self.default_material,
                settings: &self.settings,
            },
        )
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Delivers queued asset and layer notifications until both queues are
    /// empty. Handlers may queue more; those are delivered in the same call.
    pub fn process_events(&mut self) {
        loop {
            if let Some(event) = self.assets.pop_event() {
                self.dispatch_asset_event(event);
            } else if let Some(event) = self.layers.pop_event() {
                self.dispatch_layer_event(event);
            } else {
                break;
            }
        }
    }

    fn dispatch_asset_event(&mut self, event: AssetEvent) {
        let listeners: SmallVec<[AssetListener; 4]> =
            self.assets.listeners(event.id).iter().copied().collect();
        for listener in listeners {
            self.with_component(listener.component, |component, ctx| {
                component.handle_asset_event(event.id, listener.slot, event.kind, ctx);
            });
        }
    }

    fn dispatch_layer_event(&mut self, event: LayerEvent) {
        let subscribers = self.layers.subscribers();
        match event {
            LayerEvent::Added(id) => {
                for key in subscribers {
                    self.with_component(key, |component, ctx| component.on_layer_added(id, ctx));
                }
            }
            LayerEvent::Removed(mut layer) => {
                for key in subscribers {
                    if let Some(component) = self.components.get_mut(key) {
                        component.on_layer_removed(&mut layer);
                    }
                }
            }
        }
    }

    // ========================================================================
    // Scene Mutations
    // ========================================================================

    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.scene.create_node(name)
    }

    /// Attaches `child` under `parent`; components below `child` follow.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        let before = self.liveness(child);
        let attached = self.scene.attach(child, parent);
        if attached {
            self.apply_hierarchy_change(before, HierarchyChange::Inserted);
        }
        attached
    }

    /// Takes `node` out of the hierarchy; components below it go dormant.
    pub fn detach(&mut self, node: NodeHandle) -> bool {
        let before = self.liveness(node);
        let detached = self.scene.detach(node);
        if detached {
            self.apply_hierarchy_change(before, HierarchyChange::Removed);
        }
        detached
    }

    pub fn add_to_root(&mut self, node: NodeHandle) -> bool {
        let before = self.liveness(node);
        let added = self.scene.add_to_root(node);
        if added {
            self.apply_hierarchy_change(before, HierarchyChange::Inserted);
        }
        added
    }

    pub fn set_node_enabled(&mut self, node: NodeHandle, enabled: bool) {
        let before = self.liveness(node);
        self.scene.set_enabled(node, enabled);
        self.apply_hierarchy_change(before, HierarchyChange::State);
    }

    /// Destroys `node` and its subtree. Components on the subtree are removed
    /// first; other components let go of references into it.
    pub fn destroy_node(&mut self, node: NodeHandle) -> bool {
        let subtree = self.scene.collect_subtree(node);
        if subtree.is_empty() {
            return false;
        }
        for &entity in &subtree {
            if let Some(key) = self.by_entity.remove(&entity) {
                self.teardown(entity, key);
            }
        }
        self.scene.remove_node(node);

        let destroyed: FxHashSet<NodeHandle> = subtree.into_iter().collect();
        let keys: Vec<_> = self
            .components
            .iter()
            .filter_map(|(key, c)| {
                c.root_bone()
                    .entity()
                    .filter(|bone| destroyed.contains(bone))
                    .map(|bone| (key, bone))
            })
            .collect();
        for (key, bone) in keys {
            self.with_component(key, |component, ctx| component.on_entity_destroyed(bone, ctx));
        }
        true
    }

    fn liveness(&self, root: NodeHandle) -> Vec<(RenderComponentKey, bool)> {
        self.scene
            .collect_subtree(root)
            .into_iter()
            .filter_map(|node| self.by_entity.get(&node).copied())
            .filter_map(|key| {
                self.components
                    .get(key)
                    .map(|c| (key, c.is_live(&self.scene)))
            })
            .collect()
    }

    fn apply_hierarchy_change(&mut self, before: Vec<(RenderComponentKey, bool)>, change: HierarchyChange) {
        for (key, was_live) in before {
            self.with_component(key, |component, ctx| {
                let live = component.is_live(ctx.scene);
                if live && !was_live {
                    component.on_enable(ctx);
                } else if was_live && !live {
                    component.on_disable(ctx);
                }
                match change {
                    HierarchyChange::Inserted => component.on_insert_child(ctx),
                    HierarchyChange::Removed => component.on_remove_child(ctx),
                    HierarchyChange::State => {}
                }
            });
        }
    }
}

impl Default for RenderSystem {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}
