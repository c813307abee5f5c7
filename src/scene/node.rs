use bitflags::bitflags;
use uuid::Uuid;

use crate::scene::NodeHandle;

bitflags! {
    /// Component capabilities a node currently carries.
    ///
    /// Queried through [`EntityReference::has_capability`](crate::scene::EntityReference::has_capability)
    /// so callers never need to know what else lives on the node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const RENDER  = 1 << 0;
        const MODEL   = 1 << 1;
        const ELEMENT = 1 << 2;
        const SPRITE  = 1 << 3;
        const CAMERA  = 1 << 4;
        const LIGHT   = 1 << 5;
        const BUTTON  = 1 << 6;
        const ANIM    = 1 << 7;
    }
}

/// A scene node ("entity").
///
/// # Hierarchy
///
/// - `parent`: Optional handle to parent node (None for root nodes and detached nodes)
/// - `children`: List of child node handles
///
/// A node only counts as enabled in the hierarchy when its own flag and every
/// ancestor's flag are set and the chain ends in a root node of the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) guid: Uuid,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Core State ===
    pub(crate) enabled: bool,
    pub(crate) capabilities: Capabilities,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            guid: Uuid::new_v4(),
            parent: None,
            children: Vec::new(),
            enabled: true,
            capabilities: Capabilities::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable identifier used by serialized references.
    #[inline]
    #[must_use]
    pub fn guid(&self) -> Uuid {
        self.guid
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// The node's own enabled flag, ignoring its ancestors.
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
