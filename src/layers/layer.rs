use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::component::{MeshInstance, MeshInstanceId};

/// Numeric layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub i32);

impl LayerId {
    pub const WORLD: LayerId = LayerId(0);
    pub const DEPTH: LayerId = LayerId(1);
    pub const SKYBOX: LayerId = LayerId(2);
    pub const IMMEDIATE: LayerId = LayerId(3);
    pub const UI: LayerId = LayerId(4);
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A render layer.
///
/// Membership is tracked by mesh instance id in insertion order. Casting
/// instances are also tracked in `shadow_casters`; the caster set only ever
/// admits instances whose `cast_shadow` flag is set at the time they are added.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub enabled: bool,

    mesh_instances: Vec<MeshInstanceId>,
    members: FxHashSet<MeshInstanceId>,
    shadow_casters: FxHashSet<MeshInstanceId>,
}

impl Layer {
    #[must_use]
    pub fn new(id: LayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            enabled: true,
            mesh_instances: Vec::new(),
            members: FxHashSet::default(),
            shadow_casters: FxHashSet::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Adds instances not already present; casting ones join the caster set.
    pub fn add_mesh_instances(&mut self, instances: &[MeshInstance]) {
        for mi in instances {
            if self.members.insert(mi.id()) {
                self.mesh_instances.push(mi.id());
            }
        }
        self.add_shadow_casters(instances);
    }

    /// Removes instances from both the member list and the caster set.
    pub fn remove_mesh_instances(&mut self, instances: &[MeshInstance]) {
        let mut removed = false;
        for mi in instances {
            removed |= self.members.remove(&mi.id());
        }
        if removed {
            self.mesh_instances.retain(|id| self.members.contains(id));
        }
        self.remove_shadow_casters(instances);
    }

    pub fn add_shadow_casters(&mut self, instances: &[MeshInstance]) {
        for mi in instances.iter().filter(|mi| mi.cast_shadow) {
            self.shadow_casters.insert(mi.id());
        }
    }

    pub fn remove_shadow_casters(&mut self, instances: &[MeshInstance]) {
        for mi in instances {
            self.shadow_casters.remove(&mi.id());
        }
    }

    #[must_use]
    pub fn contains(&self, id: MeshInstanceId) -> bool {
        self.members.contains(&id)
    }

    #[must_use]
    pub fn is_shadow_caster(&self, id: MeshInstanceId) -> bool {
        self.shadow_casters.contains(&id)
    }

    #[must_use]
    pub fn mesh_instance_ids(&self) -> &[MeshInstanceId] {
        &self.mesh_instances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mesh_instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mesh_instances.is_empty()
    }

    #[must_use]
    pub fn shadow_caster_count(&self) -> usize {
        self.shadow_casters.len()
    }
}
