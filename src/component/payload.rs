use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RenderableError;
use crate::resources::PrimitiveKind;

/// The `type` property: where a component's mesh instances come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RenderType {
    /// Meshes of a render asset.
    #[default]
    Asset,
    /// A generated shape.
    Primitive(PrimitiveKind),
}

impl RenderType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RenderType::Asset => "asset",
            RenderType::Primitive(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderType {
    type Err = RenderableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "asset" {
            Ok(RenderType::Asset)
        } else {
            s.parse().map(RenderType::Primitive)
        }
    }
}

impl TryFrom<String> for RenderType {
    type Error = RenderableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RenderType> for String {
    fn from(value: RenderType) -> Self {
        value.as_str().to_string()
    }
}

impl From<PrimitiveKind> for RenderType {
    fn from(kind: PrimitiveKind) -> Self {
        RenderType::Primitive(kind)
    }
}

/// Active payload mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPayload {
    Asset,
    Primitive(PrimitiveKind),
    /// Instances supplied by the caller.
    Explicit,
}

impl RenderPayload {
    /// The `type` this payload answers to; explicit lists have none.
    #[must_use]
    pub fn render_type(self) -> Option<RenderType> {
        match self {
            RenderPayload::Asset => Some(RenderType::Asset),
            RenderPayload::Primitive(kind) => Some(RenderType::Primitive(kind)),
            RenderPayload::Explicit => None,
        }
    }
}

impl From<RenderType> for RenderPayload {
    fn from(ty: RenderType) -> Self {
        match ty {
            RenderType::Asset => RenderPayload::Asset,
            RenderType::Primitive(kind) => RenderPayload::Primitive(kind),
        }
    }
}
