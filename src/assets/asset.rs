use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resources::{Geometry, MaterialHandle};

/// Registry-wide asset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Geometry container: one mesh per sub-mesh.
    Render,
    Material,
}

/// Render asset payload.
#[derive(Debug, Clone, Default)]
pub struct RenderData {
    pub meshes: Vec<Arc<Geometry>>,
}

impl RenderData {
    #[must_use]
    pub fn new(meshes: Vec<Arc<Geometry>>) -> Self {
        Self { meshes }
    }
}

#[derive(Debug, Clone)]
pub enum AssetPayload {
    Render(RenderData),
    Material(MaterialHandle),
}

impl AssetPayload {
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Render(_) => AssetKind::Render,
            Self::Material(_) => AssetKind::Material,
        }
    }
}

impl From<RenderData> for AssetPayload {
    fn from(data: RenderData) -> Self {
        Self::Render(data)
    }
}

impl From<MaterialHandle> for AssetPayload {
    fn from(material: MaterialHandle) -> Self {
        Self::Material(material)
    }
}

/// A registered asset. `resource` is `None` until loaded and after unload.
#[derive(Debug, Clone)]
pub struct Asset {
    id: AssetId,
    pub name: String,
    kind: AssetKind,
    pub(crate) resource: Option<AssetPayload>,
    pub(crate) loading: bool,
}

impl Asset {
    #[must_use]
    pub fn new(id: AssetId, name: &str, kind: AssetKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            resource: None,
            loading: false,
        }
    }

    /// An asset whose payload is already resident.
    #[must_use]
    pub fn loaded(id: AssetId, name: &str, payload: impl Into<AssetPayload>) -> Self {
        let payload = payload.into();
        Self {
            id,
            name: name.to_string(),
            kind: payload.kind(),
            resource: Some(payload),
            loading: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn resource(&self) -> Option<&AssetPayload> {
        self.resource.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.resource.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn render_meshes(&self) -> Option<&[Arc<Geometry>]> {
        match &self.resource {
            Some(AssetPayload::Render(data)) => Some(&data.meshes),
            _ => None,
        }
    }

    #[must_use]
    pub fn material(&self) -> Option<&MaterialHandle> {
        match &self.resource {
            Some(AssetPayload::Material(material)) => Some(material),
            _ => None,
        }
    }
}
