//! Layer & Batch Membership Integration Tests
//!
//! Tests for:
//! - Layer registration across enable/disable and hierarchy changes
//! - Layer list changes, unknown layer ids and late-arriving layers
//! - Batch group registration and its exclusion of layer registration
//! - Layer composition replacement and subscriptions
//! - Component removal and node destruction

use myth_renderable::batching::BatchGroupKind;
use myth_renderable::{
    BatchGroupId, Capabilities, Layer, LayerComposition, LayerId, MembershipState, NodeHandle,
    PrimitiveKind, RenderComponentData, RenderSystem, RenderableError,
};

fn box_entity(system: &mut RenderSystem, name: &str) -> NodeHandle {
    let entity = system.create_node(name);
    system
        .add_component(entity, RenderComponentData::primitive(PrimitiveKind::Box))
        .unwrap();
    entity
}

fn layer_len(system: &RenderSystem, id: LayerId) -> usize {
    system.layers().get_layer_by_id(id).map_or(0, Layer::len)
}

fn registered(system: &RenderSystem, entity: NodeHandle) -> Vec<LayerId> {
    system.component(entity).unwrap().registered_layers().to_vec()
}

/// Registered layers must be the wanted layers that exist, or nothing.
fn assert_consistent(system: &RenderSystem, entity: NodeHandle) {
    let component = system.component(entity).unwrap();
    let live = component.is_live(system.scene());
    let expected: Vec<LayerId> = if live
        && component.batch_group_id().is_none()
        && !component.mesh_instances().is_empty()
    {
        component
            .layers()
            .iter()
            .copied()
            .filter(|&id| system.layers().get_layer_by_id(id).is_some())
            .collect()
    } else {
        Vec::new()
    };
    assert_eq!(component.registered_layers(), expected.as_slice());

    let batched = system.batcher().contains_node(entity);
    assert!(!(batched && !component.registered_layers().is_empty()));
}

// ============================================================================
// Enable / Disable
// ============================================================================

#[test]
fn registration_follows_component_enabled() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);

    system.component_mut(entity).unwrap().set_enabled(false);
    assert!(registered(&system, entity).is_empty());
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);
    assert_eq!(system.component(entity).unwrap().mesh_instances().len(), 1);

    system.component_mut(entity).unwrap().set_enabled(true);
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);
}

#[test]
fn registration_follows_ancestor_enabled() {
    let mut system = RenderSystem::default();
    let parent = system.create_node("Parent");
    let entity = box_entity(&mut system, "Crate");
    assert!(system.attach(entity, parent));
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);

    system.set_node_enabled(parent, false);
    assert!(registered(&system, entity).is_empty());
    assert_eq!(system.layers().subscriber_count(), 0);

    system.set_node_enabled(parent, true);
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert_eq!(system.layers().subscriber_count(), 1);
}

#[test]
fn detach_and_reattach() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");

    assert!(system.detach(entity));
    assert!(registered(&system, entity).is_empty());
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);

    assert!(system.add_to_root(entity));
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);
}

#[test]
fn disabled_component_stays_unregistered_through_hierarchy_changes() {
    let mut system = RenderSystem::default();
    let parent = system.create_node("Parent");
    let entity = box_entity(&mut system, "Crate");
    system.component_mut(entity).unwrap().set_enabled(false);

    system.attach(entity, parent);
    system.set_node_enabled(parent, false);
    system.set_node_enabled(parent, true);
    assert!(registered(&system, entity).is_empty());
    assert_consistent(&system, entity);
}

#[test]
fn consistency_holds_across_mutation_sequence() {
    let mut system = RenderSystem::default();
    let parent = system.create_node("Parent");
    let entity = box_entity(&mut system, "Crate");
    system.attach(entity, parent);

    system.component_mut(entity).unwrap().set_layers(&[LayerId::WORLD, LayerId::UI]);
    assert_consistent(&system, entity);
    system.component_mut(entity).unwrap().set_enabled(false);
    assert_consistent(&system, entity);
    system.component_mut(entity).unwrap().set_layers(&[LayerId::UI]);
    assert_consistent(&system, entity);
    system.component_mut(entity).unwrap().set_enabled(true);
    assert_consistent(&system, entity);
    system
        .component_mut(entity)
        .unwrap()
        .set_batch_group_id(Some(BatchGroupId(1)));
    assert_consistent(&system, entity);
    system.set_node_enabled(parent, false);
    assert_consistent(&system, entity);
    system.component_mut(entity).unwrap().set_batch_group_id(None);
    assert_consistent(&system, entity);
    system.set_node_enabled(parent, true);
    assert_consistent(&system, entity);

    assert_eq!(registered(&system, entity), vec![LayerId::UI]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);
    assert_eq!(layer_len(&system, LayerId::UI), 1);
}

// ============================================================================
// Layer Lists
// ============================================================================

#[test]
fn changing_layers_moves_instances() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");

    system
        .component_mut(entity)
        .unwrap()
        .set_layers(&[LayerId::DEPTH, LayerId::UI]);

    assert_eq!(registered(&system, entity), vec![LayerId::DEPTH, LayerId::UI]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);
    assert_eq!(layer_len(&system, LayerId::DEPTH), 1);
    assert_eq!(layer_len(&system, LayerId::UI), 1);
}

#[test]
fn repeated_layer_ids_register_once() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");

    system
        .component_mut(entity)
        .unwrap()
        .set_layers(&[LayerId::WORLD, LayerId::UI, LayerId::WORLD]);

    assert_eq!(
        system.component(entity).unwrap().layers(),
        &[LayerId::WORLD, LayerId::UI]
    );
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD, LayerId::UI]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);
    assert_consistent(&system, entity);
}

#[test]
fn unknown_layer_is_kept_until_it_appears() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    let custom = LayerId(42);

    system
        .component_mut(entity)
        .unwrap()
        .set_layers(&[LayerId::WORLD, custom]);
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert_eq!(
        system.component(entity).unwrap().layers(),
        &[LayerId::WORLD, custom]
    );

    system
        .layers_mut()
        .push_layer(Layer::new(custom, "Custom"))
        .unwrap();
    system.process_events();

    assert_eq!(registered(&system, entity), vec![LayerId::WORLD, custom]);
    assert_eq!(layer_len(&system, custom), 1);
}

#[test]
fn removed_layer_releases_instances() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    let id = system.component(entity).unwrap().mesh_instances()[0].id();

    assert!(system.layers_mut().remove_layer(LayerId::WORLD));
    system.process_events();
    assert!(registered(&system, entity).is_empty());
    assert_eq!(
        system.component(entity).unwrap().layers(),
        &[LayerId::WORLD]
    );

    system
        .layers_mut()
        .push_layer(Layer::new(LayerId::WORLD, "World"))
        .unwrap();
    system.process_events();
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert!(
        system
            .layers()
            .get_layer_by_id(LayerId::WORLD)
            .unwrap()
            .contains(id)
    );
}

#[test]
fn layer_added_while_disabled_is_ignored() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    system.component_mut(entity).unwrap().set_layers(&[LayerId(7)]);
    system.component_mut(entity).unwrap().set_enabled(false);

    system
        .layers_mut()
        .push_layer(Layer::new(LayerId(7), "Late"))
        .unwrap();
    system.process_events();
    assert!(registered(&system, entity).is_empty());

    system.component_mut(entity).unwrap().set_enabled(true);
    assert_eq!(registered(&system, entity), vec![LayerId(7)]);
}

#[test]
fn duplicate_layer_is_rejected() {
    let mut system = RenderSystem::default();
    let err = system
        .layers_mut()
        .push_layer(Layer::new(LayerId::UI, "Again"))
        .unwrap_err();
    assert_eq!(err, RenderableError::DuplicateLayer(LayerId::UI));
}

// ============================================================================
// Batch Groups
// ============================================================================

#[test]
fn batch_group_replaces_layer_registration() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    assert_eq!(
        system.component(entity).unwrap().membership_state(),
        MembershipState::LayerRegistered
    );

    system
        .component_mut(entity)
        .unwrap()
        .set_batch_group_id(Some(BatchGroupId(0)));
    assert!(registered(&system, entity).is_empty());
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);
    assert!(
        system
            .batcher()
            .contains(BatchGroupKind::Render, BatchGroupId(0), entity)
    );
    assert_eq!(
        system.component(entity).unwrap().membership_state(),
        MembershipState::BatchRegistered(BatchGroupId(0))
    );

    system.component_mut(entity).unwrap().set_batch_group_id(None);
    assert!(system.batcher().is_empty());
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);
}

#[test]
fn batch_group_ignores_empty_instance_set() {
    let mut system = RenderSystem::default();
    let entity = system.create_node("Empty");
    let data = RenderComponentData {
        batch_group_id: Some(BatchGroupId(5)),
        ..Default::default()
    };
    system.add_component(entity, data).unwrap();

    assert!(
        system
            .batcher()
            .contains(BatchGroupKind::Render, BatchGroupId(5), entity)
    );
    system.component_mut(entity).unwrap().set_enabled(false);
    assert!(system.batcher().is_empty());
}

#[test]
fn moving_between_batch_groups() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    system
        .component_mut(entity)
        .unwrap()
        .set_batch_group_id(Some(BatchGroupId(1)))
        .set_batch_group_id(Some(BatchGroupId(2)));

    assert_eq!(system.batcher().len(), 1);
    assert!(
        system
            .batcher()
            .contains(BatchGroupKind::Render, BatchGroupId(2), entity)
    );
}

// ============================================================================
// Composition Replacement
// ============================================================================

#[test]
fn replacing_composition_moves_registrations() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");

    let old = system.set_layer_composition(LayerComposition::with_default_layers());

    assert_eq!(old.get_layer_by_id(LayerId::WORLD).unwrap().len(), 0);
    assert_eq!(old.subscriber_count(), 0);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);
    assert_eq!(system.layers().subscriber_count(), 1);
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
}

#[test]
fn replacement_composition_without_layer_leaves_id_pending() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");

    let mut bare = LayerComposition::new("Bare");
    bare.push_layer(Layer::new(LayerId::UI, "UI")).unwrap();
    system.set_layer_composition(bare);
    system.process_events();

    assert!(registered(&system, entity).is_empty());
    system
        .layers_mut()
        .push_layer(Layer::new(LayerId::WORLD, "World"))
        .unwrap();
    system.process_events();
    assert_eq!(registered(&system, entity), vec![LayerId::WORLD]);
}

#[test]
fn disabled_component_does_not_subscribe_to_new_composition() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    system.component_mut(entity).unwrap().set_enabled(false);

    system.set_layer_composition(LayerComposition::with_default_layers());
    assert_eq!(system.layers().subscriber_count(), 0);

    system.component_mut(entity).unwrap().set_enabled(true);
    assert_eq!(system.layers().subscriber_count(), 1);
    assert_eq!(layer_len(&system, LayerId::WORLD), 1);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn remove_component_cleans_up_everything() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    system
        .component_mut(entity)
        .unwrap()
        .set_layers(&[LayerId::WORLD, LayerId::UI]);

    system.remove_component(entity).unwrap();

    assert!(system.component(entity).is_none());
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);
    assert_eq!(layer_len(&system, LayerId::UI), 0);
    assert_eq!(system.layers().subscriber_count(), 0);
    assert!(!system.scene().capabilities(entity).contains(Capabilities::RENDER));
    assert_eq!(
        system.remove_component(entity).unwrap_err(),
        RenderableError::ComponentNotFound
    );
}

#[test]
fn destroying_a_node_removes_components_below_it() {
    let mut system = RenderSystem::default();
    let parent = system.create_node("Parent");
    let a = box_entity(&mut system, "A");
    let b = box_entity(&mut system, "B");
    system.attach(a, parent);
    system.attach(b, a);
    system
        .component_mut(b)
        .unwrap()
        .set_batch_group_id(Some(BatchGroupId(3)));

    assert!(system.destroy_node(a));

    assert_eq!(system.component_count(), 0);
    assert_eq!(layer_len(&system, LayerId::WORLD), 0);
    assert!(system.batcher().is_empty());
    assert!(!system.scene().contains(b));
    assert!(!system.destroy_node(a));
}

#[test]
fn adding_twice_returns_the_existing_component() {
    let mut system = RenderSystem::default();
    let entity = box_entity(&mut system, "Crate");
    let key = system.component(entity).unwrap().key();
    let again = system
        .add_component(entity, RenderComponentData::default())
        .unwrap();
    assert_eq!(key, again);
    assert_eq!(system.component_count(), 1);
}

#[test]
fn adding_to_a_missing_node_fails() {
    let mut system = RenderSystem::default();
    let entity = system.create_node("Gone");
    system.destroy_node(entity);
    assert_eq!(
        system
            .add_component(entity, RenderComponentData::default())
            .unwrap_err(),
        RenderableError::NodeNotFound
    );
}
