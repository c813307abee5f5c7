use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::resources::{BoundingBox, Geometry, MaterialHandle, MorphInstance};
use crate::scene::NodeHandle;
use crate::skinning::SkinInstanceKey;

static NEXT_MESH_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mesh instance, used by layers to track
/// membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshInstanceId(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    #[default]
    Solid,
    Wireframe,
    Points,
}

/// One drawable unit: geometry, material, owning node and render flags.
///
/// Mesh instances are owned by exactly one component and are never cloned;
/// the id is what layers hold on to.
#[derive(Debug)]
pub struct MeshInstance {
    id: MeshInstanceId,
    geometry: Arc<Geometry>,
    pub material: MaterialHandle,
    pub node: Option<NodeHandle>,

    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub render_style: RenderStyle,
    pub lightmapped: bool,
    pub custom_aabb: Option<BoundingBox>,
    pub visible: bool,

    pub(crate) skin_instance: Option<SkinInstanceKey>,
    pub morph_instance: Option<MorphInstance>,
}

impl MeshInstance {
    /// Geometry with morph targets gets its own [`MorphInstance`].
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: MaterialHandle, node: Option<NodeHandle>) -> Self {
        let morph_instance = geometry.morph.clone().map(MorphInstance::new);
        Self {
            id: MeshInstanceId(NEXT_MESH_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)),
            geometry,
            material,
            node,
            cast_shadow: true,
            receive_shadow: true,
            render_style: RenderStyle::Solid,
            lightmapped: false,
            custom_aabb: None,
            visible: true,
            skin_instance: None,
            morph_instance,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> MeshInstanceId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    #[inline]
    #[must_use]
    pub fn skin_instance(&self) -> Option<SkinInstanceKey> {
        self.skin_instance
    }

    /// Local bounds used for culling: the override if one is set.
    #[must_use]
    pub fn aabb(&self) -> &BoundingBox {
        self.custom_aabb
            .as_ref()
            .unwrap_or_else(|| self.geometry.bounding_box())
    }
}
