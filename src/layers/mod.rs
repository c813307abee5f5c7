//! Render layers
//!
//! A [`Layer`] is a bucket of mesh instances the renderer draws together, with
//! a separate shadow-caster subset. Layers are grouped in a
//! [`LayerComposition`], which the scene may replace wholesale.

pub mod composition;
pub mod layer;

pub use composition::{CompositionId, LayerComposition, LayerEvent};
pub use layer::{Layer, LayerId};
