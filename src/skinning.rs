//! Skin instances
//!
//! A [`SkinInstance`] binds a [`Skin`] (bone names plus inverse bind
//! matrices) to concrete scene nodes found under a root bone. Instances are
//! expensive and identical for every mesh that shares the same skin and root
//! bone, so they live in a [`SkinInstanceCache`] keyed by that pair and
//! reference counted by their users.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SlotMap, new_key_type};
use uuid::Uuid;

use crate::resources::Skin;
use crate::scene::{NodeHandle, SceneGraph};

new_key_type! {
    pub struct SkinInstanceKey;
}

#[derive(Debug, Clone)]
pub struct SkinInstance {
    skin: Arc<Skin>,
    root_bone: NodeHandle,
    // bones[i] corresponds to skin.bone_names[i]
    bones: Vec<NodeHandle>,
    pub matrix_palette: Vec<Mat4>,
}

impl SkinInstance {
    /// Resolves every bone name of `skin` below `root_bone`. Bones that cannot
    /// be found bind to `owner` instead.
    fn resolve(
        skin: Arc<Skin>,
        root_bone: NodeHandle,
        owner: NodeHandle,
        scene: &SceneGraph,
        warned: &mut FxHashSet<(Uuid, String)>,
    ) -> Self {
        let bones = skin
            .bone_names
            .iter()
            .map(|name| {
                scene.find_by_name(root_bone, name).unwrap_or_else(|| {
                    if warned.insert((skin.id, name.clone())) {
                        log::warn!(
                            "Skin '{}': bone '{}' not found under the root bone, binding it to the owner",
                            skin.name,
                            name
                        );
                    }
                    owner
                })
            })
            .collect();
        let matrix_palette = vec![Mat4::IDENTITY; skin.bone_count()];

        Self {
            skin,
            root_bone,
            bones,
            matrix_palette,
        }
    }

    #[must_use]
    pub fn skin(&self) -> &Arc<Skin> {
        &self.skin
    }

    #[must_use]
    pub fn root_bone(&self) -> NodeHandle {
        self.root_bone
    }

    #[must_use]
    pub fn bones(&self) -> &[NodeHandle] {
        &self.bones
    }
}

#[derive(Debug)]
struct CacheEntry {
    instance: SkinInstance,
    ref_count: usize,
}

/// Shared, reference-counted skin instances.
///
/// All methods take `&mut self`, so a release can never re-enter the cache
/// while it is mutating.
#[derive(Debug, Default)]
pub struct SkinInstanceCache {
    entries: SlotMap<SkinInstanceKey, CacheEntry>,
    lookup: FxHashMap<(Uuid, NodeHandle), SkinInstanceKey>,
    warned_bones: FxHashSet<(Uuid, String)>,
}

impl SkinInstanceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance for `(skin, root_bone)`, creating it on first use,
    /// and takes one reference on it.
    pub fn acquire(
        &mut self,
        skin: &Arc<Skin>,
        root_bone: NodeHandle,
        owner: NodeHandle,
        scene: &SceneGraph,
    ) -> SkinInstanceKey {
        if let Some(&key) = self.lookup.get(&(skin.id, root_bone))
            && let Some(entry) = self.entries.get_mut(key)
        {
            entry.ref_count += 1;
            return key;
        }

        let instance = SkinInstance::resolve(
            Arc::clone(skin),
            root_bone,
            owner,
            scene,
            &mut self.warned_bones,
        );
        let key = self.entries.insert(CacheEntry {
            instance,
            ref_count: 1,
        });
        self.lookup.insert((skin.id, root_bone), key);
        log::debug!("Skin instance created for '{}' at {:?}", skin.name, root_bone);
        key
    }

    /// Drops one reference. Returns `true` when this destroyed the instance.
    pub fn release(&mut self, key: SkinInstanceKey) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return false;
        }

        if let Some(entry) = self.entries.remove(key) {
            let skin = &entry.instance.skin;
            self.lookup.remove(&(skin.id, entry.instance.root_bone));
            log::debug!(
                "Skin instance destroyed for '{}' at {:?}",
                skin.name,
                entry.instance.root_bone
            );
        }
        true
    }

    #[must_use]
    pub fn get(&self, key: SkinInstanceKey) -> Option<&SkinInstance> {
        self.entries.get(key).map(|e| &e.instance)
    }

    pub fn get_mut(&mut self, key: SkinInstanceKey) -> Option<&mut SkinInstance> {
        self.entries.get_mut(key).map(|e| &mut e.instance)
    }

    #[must_use]
    pub fn find(&self, skin: &Skin, root_bone: NodeHandle) -> Option<SkinInstanceKey> {
        self.lookup.get(&(skin.id, root_bone)).copied()
    }

    #[must_use]
    pub fn ref_count(&self, key: SkinInstanceKey) -> usize {
        self.entries.get(key).map_or(0, |e| e.ref_count)
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin() -> Arc<Skin> {
        Arc::new(Skin::new(
            "Rig",
            vec!["Hips".into(), "Spine".into(), "Tail".into()],
            vec![Mat4::IDENTITY; 3],
        ))
    }

    #[test]
    fn test_acquire_shares_and_release_destroys_at_zero() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Mesh");
        let root = scene.create_node("Hips");
        let skin = skin();
        let mut cache = SkinInstanceCache::new();

        let a = cache.acquire(&skin, root, owner, &scene);
        let b = cache.acquire(&skin, root, owner, &scene);
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(a), 2);
        assert_eq!(cache.len(), 1);

        assert!(!cache.release(a));
        assert!(cache.release(b));
        assert!(cache.is_empty());
        assert!(cache.find(&skin, root).is_none());
        assert!(!cache.release(a));
    }

    #[test]
    fn test_missing_bones_fall_back_to_owner() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Mesh");
        let hips = scene.create_node("Hips");
        let spine = scene.create_node("Spine");
        scene.attach(spine, hips);
        let mut cache = SkinInstanceCache::new();

        let key = cache.acquire(&skin(), hips, owner, &scene);
        let instance = cache.get(key).unwrap();
        assert_eq!(instance.bones(), &[hips, spine, owner]);
        assert_eq!(instance.matrix_palette.len(), 3);
    }

    #[test]
    fn test_distinct_root_bones_get_distinct_instances() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Mesh");
        let r1 = scene.create_node("R1");
        let r2 = scene.create_node("R2");
        let skin = skin();
        let mut cache = SkinInstanceCache::new();

        let a = cache.acquire(&skin, r1, owner, &scene);
        let b = cache.acquire(&skin, r2, owner, &scene);
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
    }
}
