//! Weak entity references.
//!
//! An [`EntityReference`] is a named pointer from a component to another node,
//! stored as a guid or a path relative to the owning node and resolved lazily.
//! Resolution failing is not an error: the reference stays unresolved,
//! capability queries answer `false`, and the next
//! [`on_parent_component_enable`](EntityReference::on_parent_component_enable)
//! tries again.

use smallvec::SmallVec;
use uuid::Uuid;

use crate::scene::{Capabilities, NodeHandle, SceneGraph};

/// How a reference locates its node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTarget {
    /// A node's stable guid.
    Guid(Uuid),
    /// A `/`-separated path relative to the owning node (`..` for the parent).
    Path(String),
}

/// Emitted whenever the resolved node changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityReferenceEvent {
    Acquired(NodeHandle),
    Released(NodeHandle),
}

pub type EntityReferenceEvents = SmallVec<[EntityReferenceEvent; 2]>;

#[derive(Debug, Clone)]
pub struct EntityReference {
    property: &'static str,
    target: Option<EntityTarget>,
    entity: Option<NodeHandle>,
}

impl EntityReference {
    #[must_use]
    pub fn new(property: &'static str) -> Self {
        Self {
            property,
            target: None,
            entity: None,
        }
    }

    /// Name of the component property this reference backs.
    #[inline]
    #[must_use]
    pub fn property(&self) -> &'static str {
        self.property
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&EntityTarget> {
        self.target.as_ref()
    }

    /// The currently resolved node, if any.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Option<NodeHandle> {
        self.entity
    }

    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.entity.is_some()
    }

    /// Replaces the target and resolves it immediately.
    pub fn set_target(
        &mut self,
        target: Option<EntityTarget>,
        scene: &SceneGraph,
        owner: NodeHandle,
    ) -> EntityReferenceEvents {
        self.target = target;
        self.resolve(scene, owner)
    }

    /// Points the reference at `node` directly, storing its guid as target.
    pub fn set_entity(
        &mut self,
        node: Option<NodeHandle>,
        scene: &SceneGraph,
        owner: NodeHandle,
    ) -> EntityReferenceEvents {
        let target = node
            .and_then(|h| scene.get_node(h))
            .map(|n| EntityTarget::Guid(n.guid()));
        self.set_target(target, scene, owner)
    }

    /// Called when the owning component becomes enabled. Only re-resolves
    /// when nothing (or a stale node) is currently held.
    pub fn on_parent_component_enable(
        &mut self,
        scene: &SceneGraph,
        owner: NodeHandle,
    ) -> EntityReferenceEvents {
        match self.entity {
            Some(node) if scene.contains(node) => EntityReferenceEvents::new(),
            _ => self.resolve(scene, owner),
        }
    }

    /// Looks the target up again and reports what changed.
    pub fn resolve(&mut self, scene: &SceneGraph, owner: NodeHandle) -> EntityReferenceEvents {
        let found = match &self.target {
            Some(EntityTarget::Guid(guid)) => scene.find_by_guid(guid),
            Some(EntityTarget::Path(path)) => scene.resolve_path(owner, path),
            None => None,
        };

        let mut events = EntityReferenceEvents::new();
        if found == self.entity {
            return events;
        }
        if let Some(old) = self.entity.take() {
            events.push(EntityReferenceEvent::Released(old));
        }
        if let Some(new) = found {
            log::debug!("Entity reference '{}' acquired {:?}", self.property, new);
            events.push(EntityReferenceEvent::Acquired(new));
        }
        self.entity = found;
        events
    }

    /// Drops the resolved node if it is the one being destroyed. The target
    /// is kept so the reference can resolve again later.
    pub fn on_entity_destroyed(&mut self, node: NodeHandle) -> Option<EntityReferenceEvent> {
        if self.entity == Some(node) {
            self.entity = None;
            Some(EntityReferenceEvent::Released(node))
        } else {
            None
        }
    }

    /// Does the resolved node currently carry every capability in `caps`?
    #[must_use]
    pub fn has_capability(&self, scene: &SceneGraph, caps: Capabilities) -> bool {
        self.entity
            .is_some_and(|node| scene.capabilities(node).contains(caps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_reference_is_tolerated() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Owner");
        let mut reference = EntityReference::new("rootBone");

        let events = reference.set_target(Some(EntityTarget::Guid(Uuid::new_v4())), &scene, owner);
        assert!(events.is_empty());
        assert!(!reference.is_resolved());
        assert!(!reference.has_capability(&scene, Capabilities::RENDER));
    }

    #[test]
    fn test_replacing_target_releases_then_acquires() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Owner");
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        let mut reference = EntityReference::new("rootBone");

        let events = reference.set_entity(Some(a), &scene, owner);
        assert_eq!(events.as_slice(), &[EntityReferenceEvent::Acquired(a)]);

        let events = reference.set_entity(Some(b), &scene, owner);
        assert_eq!(
            events.as_slice(),
            &[
                EntityReferenceEvent::Released(a),
                EntityReferenceEvent::Acquired(b)
            ]
        );

        let events = reference.set_entity(None, &scene, owner);
        assert_eq!(events.as_slice(), &[EntityReferenceEvent::Released(b)]);
    }

    #[test]
    fn test_late_resolution_on_enable() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Owner");
        let mut reference = EntityReference::new("rootBone");
        reference.set_target(Some(EntityTarget::Path("Bone".into())), &scene, owner);
        assert!(!reference.is_resolved());

        let bone = scene.create_node("Bone");
        scene.attach(bone, owner);
        let events = reference.on_parent_component_enable(&scene, owner);
        assert_eq!(events.as_slice(), &[EntityReferenceEvent::Acquired(bone)]);

        scene.insert_capabilities(bone, Capabilities::RENDER);
        assert!(reference.has_capability(&scene, Capabilities::RENDER));
        assert!(!reference.has_capability(&scene, Capabilities::RENDER | Capabilities::CAMERA));
    }
}
