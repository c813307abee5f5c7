//! Render Component Settings
//!
//! Engine-wide defaults applied to every render component, configured the
//! usual way:
//!
//! ```rust,ignore
//! use myth_renderable::{RenderSettings, RenderSystem, LayerId};
//!
//! let system = RenderSystem::new(RenderSettings {
//!     default_layers: vec![LayerId::WORLD, LayerId::DEPTH],
//!     ..Default::default()
//! });
//! ```

use serde::{Deserialize, Serialize};

use crate::layers::LayerId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Layers a new component joins when its data names none.
    pub default_layers: Vec<LayerId>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Warn (once per id and component) when a layer id is set that the
    /// current composition does not contain.
    pub warn_unknown_layers: bool,
    /// Share one generated geometry per primitive kind.
    pub primitive_cache: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            default_layers: vec![LayerId::WORLD],
            cast_shadows: true,
            receive_shadows: true,
            warn_unknown_layers: true,
            primitive_cache: true,
        }
    }
}
