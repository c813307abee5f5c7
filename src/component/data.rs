use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::AssetId;
use crate::batching::BatchGroupId;
use crate::component::mesh_instance::RenderStyle;
use crate::component::payload::RenderType;
use crate::layers::LayerId;
use crate::resources::BoundingBox;

/// Initial state of a render component, as stored in scene data.
///
/// Unset optional fields fall back to [`RenderSettings`](crate::settings::RenderSettings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderComponentData {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub render_type: RenderType,
    pub asset: Option<AssetId>,
    pub material_assets: Vec<Option<AssetId>>,
    pub layers: Option<Vec<LayerId>>,
    pub batch_group_id: Option<BatchGroupId>,
    pub cast_shadows: Option<bool>,
    pub receive_shadows: Option<bool>,
    pub lightmapped: bool,
    pub render_style: RenderStyle,
    pub custom_aabb: Option<BoundingBox>,
    /// Guid of the root bone node.
    pub root_bone: Option<Uuid>,
}

impl Default for RenderComponentData {
    fn default() -> Self {
        Self {
            enabled: true,
            render_type: RenderType::Asset,
            asset: None,
            material_assets: Vec::new(),
            layers: None,
            batch_group_id: None,
            cast_shadows: None,
            receive_shadows: None,
            lightmapped: false,
            render_style: RenderStyle::Solid,
            custom_aabb: None,
            root_bone: None,
        }
    }
}

impl RenderComponentData {
    /// Data for a component drawing a generated shape.
    #[must_use]
    pub fn primitive(render_type: impl Into<RenderType>) -> Self {
        Self {
            render_type: render_type.into(),
            ..Default::default()
        }
    }

    /// Data for a component drawing the meshes of a render asset.
    #[must_use]
    pub fn asset(id: AssetId) -> Self {
        Self {
            asset: Some(id),
            ..Default::default()
        }
    }
}
