//! Batch groups
//!
//! A batch group merges the geometry of many nodes into fewer draw calls. The
//! render component only ever inserts or removes its node under a group id;
//! how the merged geometry is built is up to the [`Batcher`] implementation.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::scene::NodeHandle;

/// Which component type a batch entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchGroupKind {
    Render,
    Model,
    Element,
    Sprite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchGroupId(pub u32);

impl fmt::Display for BatchGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Batching subsystem seam.
pub trait Batcher {
    fn insert(&mut self, kind: BatchGroupKind, group: BatchGroupId, node: NodeHandle);
    fn remove(&mut self, kind: BatchGroupKind, group: BatchGroupId, node: NodeHandle);
}

type GroupMembers = SmallVec<[(BatchGroupKind, NodeHandle); 4]>;

/// Default batcher: records group membership and marks touched groups dirty
/// so a later merge pass knows what to rebuild.
#[derive(Debug, Default)]
pub struct BatchRegistry {
    groups: FxHashMap<BatchGroupId, GroupMembers>,
    dirty: FxHashSet<BatchGroupId>,
}

impl BatchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn members(&self, group: BatchGroupId) -> &[(BatchGroupKind, NodeHandle)] {
        self.groups.get(&group).map(SmallVec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn contains(&self, kind: BatchGroupKind, group: BatchGroupId, node: NodeHandle) -> bool {
        self.members(group).contains(&(kind, node))
    }

    /// Is `node` registered in any group?
    #[must_use]
    pub fn contains_node(&self, node: NodeHandle) -> bool {
        self.groups
            .values()
            .any(|members| members.iter().any(|&(_, n)| n == node))
    }

    /// Total entries across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(SmallVec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<BatchGroupId> {
        let mut dirty: Vec<_> = self.dirty.drain().collect();
        dirty.sort_unstable();
        dirty
    }
}

impl Batcher for BatchRegistry {
    fn insert(&mut self, kind: BatchGroupKind, group: BatchGroupId, node: NodeHandle) {
        let members = self.groups.entry(group).or_default();
        if !members.contains(&(kind, node)) {
            members.push((kind, node));
            self.dirty.insert(group);
        }
    }

    fn remove(&mut self, kind: BatchGroupKind, group: BatchGroupId, node: NodeHandle) {
        let Some(members) = self.groups.get_mut(&group) else {
            return;
        };
        let before = members.len();
        members.retain(|entry| *entry != (kind, node));
        if members.len() != before {
            self.dirty.insert(group);
        }
        if members.is_empty() {
            self.groups.remove(&group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    #[test]
    fn test_insert_is_idempotent_and_marks_dirty() {
        let mut scene = SceneGraph::new();
        let node = scene.create_node("Batched");
        let mut batcher = BatchRegistry::new();

        batcher.insert(BatchGroupKind::Render, BatchGroupId(0), node);
        batcher.insert(BatchGroupKind::Render, BatchGroupId(0), node);
        assert_eq!(batcher.len(), 1);
        assert_eq!(batcher.take_dirty(), vec![BatchGroupId(0)]);

        batcher.remove(BatchGroupKind::Render, BatchGroupId(0), node);
        assert!(batcher.is_empty());
        assert!(!batcher.contains_node(node));
        assert_eq!(batcher.take_dirty(), vec![BatchGroupId(0)]);
    }
}
