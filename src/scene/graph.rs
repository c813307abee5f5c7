use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::scene::NodeHandle;
use crate::scene::node::{Capabilities, Node};

/// Scene graph storage.
///
/// Nodes live in a slot map; `root_nodes` lists the top of every attached
/// tree. A node that has been detached is neither a root nor a child of
/// anything and therefore never enabled in the hierarchy.
///
/// Hierarchy mutations here are silent. [`RenderSystem`](crate::system::RenderSystem)
/// wraps them and turns the resulting state changes into component
/// enable/disable and insert/remove notifications.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    root_nodes: Vec<NodeHandle>,
    guid_lookup: FxHashMap<Uuid, NodeHandle>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Creation & Removal
    // ========================================================================

    /// Creates a node at the root of the graph.
    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Adds a node at the root of the graph.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let guid = node.guid;
        let handle = self.nodes.insert(node);
        self.guid_lookup.insert(guid, handle);
        self.root_nodes.push(handle);
        handle
    }

    /// Removes a node and its whole subtree, returning the removed handles in
    /// pre-order.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Vec<NodeHandle> {
        if !self.nodes.contains_key(handle) {
            return Vec::new();
        }
        self.unlink(handle);

        let removed = self.collect_subtree(handle);
        for &node in &removed {
            if let Some(node) = self.nodes.remove(node) {
                self.guid_lookup.remove(&node.guid);
            }
        }
        removed
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(Node::name)
    }

    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn find_by_guid(&self, guid: &Uuid) -> Option<NodeHandle> {
        self.guid_lookup
            .get(guid)
            .copied()
            .filter(|&h| self.nodes.contains_key(h))
    }

    /// Depth-first search for the first node named `name`, starting at (and
    /// including) `root`.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Resolves a `/`-separated path relative to `from`.
    ///
    /// `..` steps to the parent and `.` stays in place; any other segment
    /// selects the first child with that name.
    #[must_use]
    pub fn resolve_path(&self, from: NodeHandle, path: &str) -> Option<NodeHandle> {
        let mut current = from;
        self.nodes.get(current)?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = match segment {
                "." => current,
                ".." => self.nodes.get(current)?.parent?,
                name => self
                    .nodes
                    .get(current)?
                    .children
                    .iter()
                    .copied()
                    .find(|&c| self.nodes.get(c).is_some_and(|n| n.name == name))?,
            };
        }
        Some(current)
    }

    /// Collects `handle` and all of its descendants in pre-order.
    #[must_use]
    pub fn collect_subtree(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Attaches `child` under `parent`, detaching it from wherever it was.
    ///
    /// Returns `false` (and changes nothing) when either handle is stale or
    /// when the attachment would create a cycle.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        if child == parent || !self.contains(child) || !self.contains(parent) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach a node below its own descendant");
            return false;
        }

        self.unlink(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Takes `handle` out of the hierarchy without destroying it.
    pub fn detach(&mut self, handle: NodeHandle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.unlink(handle);
        true
    }

    /// Makes a detached node a root node again.
    pub fn add_to_root(&mut self, handle: NodeHandle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.unlink(handle);
        self.root_nodes.push(handle);
        true
    }

    /// Is `ancestor` on the parent chain of `handle`?
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut current = self.nodes.get(handle).and_then(Node::parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(Node::parent);
        }
        false
    }

    /// Is the node reachable from one of the root nodes?
    #[must_use]
    pub fn is_in_hierarchy(&self, handle: NodeHandle) -> bool {
        let mut current = handle;
        loop {
            let Some(node) = self.nodes.get(current) else {
                return false;
            };
            match node.parent {
                Some(parent) => current = parent,
                None => return self.root_nodes.contains(&current),
            }
        }
    }

    fn unlink(&mut self, handle: NodeHandle) {
        let parent = self.nodes.get_mut(handle).and_then(|n| n.parent.take());
        match parent {
            Some(parent_handle) => {
                if let Some(parent) = self.nodes.get_mut(parent_handle)
                    && let Some(pos) = parent.children.iter().position(|&x| x == handle)
                {
                    parent.children.remove(pos);
                }
            }
            None => {
                if let Some(pos) = self.root_nodes.iter().position(|&x| x == handle) {
                    self.root_nodes.remove(pos);
                }
            }
        }
    }

    // ========================================================================
    // Enabled State & Capabilities
    // ========================================================================

    pub fn set_enabled(&mut self, handle: NodeHandle, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.enabled = enabled;
        }
    }

    /// True when the node, every ancestor, and the root attachment are all
    /// in place.
    #[must_use]
    pub fn is_enabled_in_hierarchy(&self, handle: NodeHandle) -> bool {
        let mut current = handle;
        loop {
            let Some(node) = self.nodes.get(current) else {
                return false;
            };
            if !node.enabled {
                return false;
            }
            match node.parent {
                Some(parent) => current = parent,
                None => return self.root_nodes.contains(&current),
            }
        }
    }

    #[must_use]
    pub fn capabilities(&self, handle: NodeHandle) -> Capabilities {
        self.nodes
            .get(handle)
            .map_or(Capabilities::empty(), Node::capabilities)
    }

    pub fn insert_capabilities(&mut self, handle: NodeHandle, caps: Capabilities) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.capabilities.insert(caps);
        }
    }

    pub fn remove_capabilities(&mut self, handle: NodeHandle, caps: Capabilities) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.capabilities.remove(caps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_in_hierarchy_follows_ancestors() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("Parent");
        let child = graph.create_node("Child");
        assert!(graph.attach(child, parent));

        assert!(graph.is_enabled_in_hierarchy(child));
        graph.set_enabled(parent, false);
        assert!(!graph.is_enabled_in_hierarchy(child));
        graph.set_enabled(parent, true);
        graph.detach(parent);
        assert!(!graph.is_enabled_in_hierarchy(child));
        assert!(!graph.is_in_hierarchy(child));
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("A");
        let b = graph.create_node("B");
        assert!(graph.attach(b, a));
        assert!(!graph.attach(a, b));
        assert_eq!(graph.get_node(a).unwrap().parent(), None);
    }

    #[test]
    fn test_resolve_path() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("Root");
        let arm = graph.create_node("Armature");
        let hips = graph.create_node("Hips");
        let mesh = graph.create_node("Mesh");
        graph.attach(arm, root);
        graph.attach(hips, arm);
        graph.attach(mesh, root);

        assert_eq!(graph.resolve_path(mesh, "../Armature/Hips"), Some(hips));
        assert_eq!(graph.resolve_path(mesh, "./"), Some(mesh));
        assert_eq!(graph.resolve_path(mesh, "../Missing"), None);
        assert_eq!(graph.find_by_name(root, "Hips"), Some(hips));
    }

    #[test]
    fn test_remove_node_drops_subtree_and_guids() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("A");
        let b = graph.create_node("B");
        graph.attach(b, a);
        let guid = graph.get_node(b).unwrap().guid();

        let removed = graph.remove_node(a);
        assert_eq!(removed, vec![a, b]);
        assert!(graph.find_by_guid(&guid).is_none());
        assert!(graph.is_empty());
    }
}
