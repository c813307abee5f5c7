//! Scene graph
//!
//! The minimal entity hierarchy the render binding layer runs against:
//! - [`SceneGraph`]: node storage, hierarchy and enabled state
//! - [`Node`]: name, guid, parent/children and capability bits
//! - [`EntityReference`]: lazily resolved, notification-driven pointer to a node

pub mod entity_reference;
pub mod graph;
pub mod node;

pub use entity_reference::{EntityReference, EntityReferenceEvent, EntityTarget};
pub use graph::SceneGraph;
pub use node::{Capabilities, Node};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
