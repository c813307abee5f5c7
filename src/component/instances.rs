use crate::component::mesh_instance::{MeshInstance, RenderStyle};
use crate::resources::BoundingBox;
use crate::scene::NodeHandle;
use crate::skinning::SkinInstanceCache;

/// Render flags a component pushes onto every instance it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFlags {
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    pub render_style: RenderStyle,
    pub lightmapped: bool,
    pub custom_aabb: Option<BoundingBox>,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            cast_shadows: true,
            receive_shadows: true,
            render_style: RenderStyle::Solid,
            lightmapped: false,
            custom_aabb: None,
        }
    }
}

impl RenderFlags {
    pub fn apply(&self, mi: &mut MeshInstance) {
        mi.cast_shadow = self.cast_shadows;
        mi.receive_shadow = self.receive_shadows;
        mi.render_style = self.render_style;
        mi.lightmapped = self.lightmapped;
        mi.custom_aabb = self.custom_aabb;
    }
}

/// The ordered mesh instances of one component.
///
/// Index `i` lines up with material slot `i`. Layer registration is handled
/// by the caller: instances must be out of every layer before
/// [`clear`](Self::clear) or [`replace`](Self::replace) drops them.
#[derive(Debug, Default)]
pub struct MeshInstanceSet {
    instances: Vec<MeshInstance>,
}

impl MeshInstanceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts `instances`, binding unowned ones to `node` and applying `flags`.
    pub fn replace(&mut self, instances: Vec<MeshInstance>, node: NodeHandle, flags: &RenderFlags) {
        debug_assert!(self.instances.is_empty(), "old instances must be destroyed first");
        self.instances = instances;
        for mi in &mut self.instances {
            match mi.node {
                None => mi.node = Some(node),
                Some(other) if other != node => {
                    log::warn!("Mesh instance {:?} is owned by another node ({other:?})", mi.id());
                }
                Some(_) => {}
            }
            flags.apply(mi);
        }
    }

    /// Returns every held skin instance to the cache.
    pub fn release_skins(&mut self, skins: &mut SkinInstanceCache) {
        for mi in &mut self.instances {
            if let Some(key) = mi.skin_instance.take() {
                skins.release(key);
            }
        }
    }

    /// Drops all instances. Safe on an empty set.
    pub fn clear(&mut self, skins: &mut SkinInstanceCache) {
        self.release_skins(skins);
        self.instances.clear();
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[MeshInstance] {
        &self.instances
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MeshInstance> {
        self.instances.iter_mut()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MeshInstance> {
        self.instances.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
