//! Layer and batch membership.
//!
//! [`LayerBinding`] remembers which layers the component wants, which ones
//! actually hold its instances right now, and which batch group holds its
//! node. [`sync`](LayerBinding::sync) reconciles the actual state with the
//! wanted one; every other entry point funnels into it, so registrations can
//! neither leak nor double up.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::batching::{BatchGroupId, BatchGroupKind, Batcher};
use crate::component::mesh_instance::MeshInstance;
use crate::layers::{Layer, LayerComposition, LayerId};
use crate::scene::NodeHandle;

pub type LayerList = SmallVec<[LayerId; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    Unregistered,
    LayerRegistered,
    BatchRegistered(BatchGroupId),
}

#[derive(Debug, Default)]
pub struct LayerBinding {
    layers: LayerList,
    batch_group: Option<BatchGroupId>,

    registered: LayerList,
    batched: Option<BatchGroupId>,

    warned_layers: FxHashSet<LayerId>,
}

impl LayerBinding {
    #[must_use]
    pub fn new(layers: &[LayerId]) -> Self {
        let mut binding = Self::default();
        binding.assign_layers(layers);
        binding
    }

    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    #[inline]
    #[must_use]
    pub fn batch_group(&self) -> Option<BatchGroupId> {
        self.batch_group
    }

    /// Layers currently holding the instances.
    #[inline]
    #[must_use]
    pub fn registered_layers(&self) -> &[LayerId] {
        &self.registered
    }

    #[must_use]
    pub fn state(&self) -> MembershipState {
        match self.batched {
            Some(group) => MembershipState::BatchRegistered(group),
            None if !self.registered.is_empty() => MembershipState::LayerRegistered,
            None => MembershipState::Unregistered,
        }
    }

    /// Brings registrations in line with the wanted state.
    ///
    /// `live` means the component and its node are enabled in the hierarchy.
    /// Stale registrations are dropped before new ones are made, so the layer
    /// and batch paths are never held at the same time.
    pub fn sync(
        &mut self,
        instances: &[MeshInstance],
        live: bool,
        node: NodeHandle,
        composition: &mut LayerComposition,
        batcher: &mut dyn Batcher,
    ) {
        let wanted_batch = self.batch_group.filter(|_| live);
        let wanted_layers: LayerList = if live && wanted_batch.is_none() && !instances.is_empty() {
            self.layers
                .iter()
                .copied()
                .filter(|&id| composition.get_layer_by_id(id).is_some())
                .collect()
        } else {
            LayerList::new()
        };

        if self.batched != wanted_batch
            && let Some(group) = self.batched.take()
        {
            batcher.remove(BatchGroupKind::Render, group, node);
        }

        let stale: LayerList = self
            .registered
            .iter()
            .copied()
            .filter(|id| !wanted_layers.contains(id))
            .collect();
        for id in stale {
            if let Some(layer) = composition.get_layer_by_id_mut(id) {
                layer.remove_mesh_instances(instances);
            }
            self.registered.retain(|r| *r != id);
        }

        for id in wanted_layers {
            if self.registered.contains(&id) {
                continue;
            }
            if let Some(layer) = composition.get_layer_by_id_mut(id) {
                layer.add_mesh_instances(instances);
                self.registered.push(id);
            }
        }

        if self.batched.is_none()
            && let Some(group) = wanted_batch
        {
            batcher.insert(BatchGroupKind::Render, group, node);
            self.batched = Some(group);
        }
    }

    /// Takes the instances out of every layer holding them. Called before
    /// the instances themselves go away.
    pub fn remove_from_layers(&mut self, instances: &[MeshInstance], composition: &mut LayerComposition) {
        for id in self.registered.drain(..) {
            if let Some(layer) = composition.get_layer_by_id_mut(id) {
                layer.remove_mesh_instances(instances);
            }
        }
    }

    /// Replaces the wanted layer list. Call [`sync`](Self::sync) afterwards.
    pub fn set_layers(&mut self, layers: &[LayerId], composition: &LayerComposition, warn_unknown: bool) {
        self.assign_layers(layers);
        if warn_unknown {
            self.warn_unknown_layers(composition);
        }
    }

    // First occurrence wins; order is kept.
    fn assign_layers(&mut self, layers: &[LayerId]) {
        self.layers.clear();
        for &id in layers {
            if !self.layers.contains(&id) {
                self.layers.push(id);
            }
        }
    }

    pub fn set_batch_group(&mut self, group: Option<BatchGroupId>) {
        self.batch_group = group;
    }

    /// A removed layer is already out of the composition; clean it directly.
    pub fn on_layer_removed(&mut self, layer: &mut Layer, instances: &[MeshInstance]) {
        if let Some(pos) = self.registered.iter().position(|&id| id == layer.id()) {
            layer.remove_mesh_instances(instances);
            self.registered.remove(pos);
        }
    }

    pub fn add_shadow_casters(&self, instances: &[MeshInstance], composition: &mut LayerComposition) {
        for &id in &self.registered {
            if let Some(layer) = composition.get_layer_by_id_mut(id) {
                layer.add_shadow_casters(instances);
            }
        }
    }

    pub fn remove_shadow_casters(&self, instances: &[MeshInstance], composition: &mut LayerComposition) {
        for &id in &self.registered {
            if let Some(layer) = composition.get_layer_by_id_mut(id) {
                layer.remove_shadow_casters(instances);
            }
        }
    }

    fn warn_unknown_layers(&mut self, composition: &LayerComposition) {
        for &id in &self.layers {
            if composition.get_layer_by_id(id).is_none() && self.warned_layers.insert(id) {
                log::warn!("Layer {id} is not part of the current composition, it stays selected until one appears");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::batching::BatchRegistry;
    use crate::resources::{Geometry, Material, MaterialHandle};
    use crate::scene::SceneGraph;

    fn instances(count: usize) -> Vec<MeshInstance> {
        let geometry = Arc::new(Geometry::new("Tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]));
        let material = MaterialHandle::new(Material::new("M"));
        (0..count)
            .map(|_| MeshInstance::new(Arc::clone(&geometry), material.clone(), None))
            .collect()
    }

    #[test]
    fn test_sync_registers_only_existing_layers() {
        let mut scene = SceneGraph::new();
        let node = scene.create_node("N");
        let mut composition = LayerComposition::with_default_layers();
        let mut batcher = BatchRegistry::new();
        let mis = instances(2);

        let mut binding = LayerBinding::new(&[LayerId::WORLD, LayerId(99)]);
        binding.sync(&mis, true, node, &mut composition, &mut batcher);

        assert_eq!(binding.registered_layers(), &[LayerId::WORLD]);
        assert_eq!(binding.layers(), &[LayerId::WORLD, LayerId(99)]);
        assert_eq!(composition.get_layer_by_id(LayerId::WORLD).unwrap().len(), 2);
    }

    #[test]
    fn test_layer_list_drops_repeated_ids() {
        let composition = LayerComposition::with_default_layers();
        let mut binding = LayerBinding::new(&[LayerId::UI, LayerId::UI, LayerId::WORLD]);
        assert_eq!(binding.layers(), &[LayerId::UI, LayerId::WORLD]);

        binding.set_layers(
            &[LayerId::WORLD, LayerId::DEPTH, LayerId::WORLD],
            &composition,
            false,
        );
        assert_eq!(binding.layers(), &[LayerId::WORLD, LayerId::DEPTH]);
    }

    #[test]
    fn test_batch_group_excludes_layers() {
        let mut scene = SceneGraph::new();
        let node = scene.create_node("N");
        let mut composition = LayerComposition::with_default_layers();
        let mut batcher = BatchRegistry::new();
        let mis = instances(1);

        let mut binding = LayerBinding::new(&[LayerId::WORLD]);
        binding.sync(&mis, true, node, &mut composition, &mut batcher);
        binding.set_batch_group(Some(BatchGroupId(3)));
        binding.sync(&mis, true, node, &mut composition, &mut batcher);

        assert_eq!(binding.state(), MembershipState::BatchRegistered(BatchGroupId(3)));
        assert!(composition.get_layer_by_id(LayerId::WORLD).unwrap().is_empty());
        assert!(batcher.contains(BatchGroupKind::Render, BatchGroupId(3), node));

        binding.sync(&mis, false, node, &mut composition, &mut batcher);
        assert_eq!(binding.state(), MembershipState::Unregistered);
        assert!(batcher.is_empty());
    }

    #[test]
    fn test_empty_instance_set_stays_unregistered() {
        let mut scene = SceneGraph::new();
        let node = scene.create_node("N");
        let mut composition = LayerComposition::with_default_layers();
        let mut batcher = BatchRegistry::new();

        let mut binding = LayerBinding::new(&[LayerId::WORLD]);
        binding.sync(&[], true, node, &mut composition, &mut batcher);
        assert_eq!(binding.state(), MembershipState::Unregistered);
    }
}
