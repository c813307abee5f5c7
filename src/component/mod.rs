//! Render component
//!
//! - [`RenderComponent`]: payload mode, materials, root bone and lifecycle
//! - [`MeshInstance`] / [`MeshInstanceSet`]: the drawable units it owns
//! - [`LayerBinding`]: layer and batch membership
//! - [`RenderContext`]: the collaborators handed to every mutation
//! - [`RenderComponentMut`]: chainable access through the system
//! - [`RenderComponentData`]: serialized initial state

pub mod context;
pub mod data;
pub mod instances;
pub mod membership;
pub mod mesh_instance;
pub mod payload;
pub mod render;
pub mod wrapper;

pub use context::RenderContext;
pub use data::RenderComponentData;
pub use instances::{MeshInstanceSet, RenderFlags};
pub use membership::{LayerBinding, MembershipState};
pub use mesh_instance::{MeshInstance, MeshInstanceId, RenderStyle};
pub use payload::{RenderPayload, RenderType};
pub use render::RenderComponent;
pub use wrapper::RenderComponentMut;

use slotmap::new_key_type;

new_key_type! {
    pub struct RenderComponentKey;
}
