//! Asset Binding Integration Tests
//!
//! Tests for:
//! - Bound references to assets that are not registered yet
//! - Load requests issued on behalf of live components
//! - Asset re-registration after removal
//! - Listener bookkeeping on component removal
//! - Late resolution of entity references

use std::sync::Arc;

use glam::{Mat4, Vec3};
use myth_renderable::{
    Asset, AssetKind, EntityTarget, Geometry, Material, MaterialHandle, RenderComponentData,
    RenderData, RenderSystem, Skin,
};

fn quad_meshes(count: usize) -> Vec<Arc<Geometry>> {
    (0..count)
        .map(|i| {
            Arc::new(Geometry::new(
                &format!("Quad{i}"),
                vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
                vec![0, 1, 2, 2, 1, 3],
            ))
        })
        .collect()
}

// ============================================================================
// Render Asset References
// ============================================================================

#[test]
fn reference_waits_for_registration() {
    let mut system = RenderSystem::default();
    let id = system.assets_mut().reserve_id();
    let entity = system.create_node("Prop");
    system
        .add_component(entity, RenderComponentData::asset(id))
        .unwrap();
    system.process_events();
    assert!(system.component(entity).unwrap().mesh_instances().is_empty());
    assert_eq!(system.component(entity).unwrap().asset(), Some(id));

    system.assets_mut().add(Asset::new(id, "Prop", AssetKind::Render));
    system.process_events();
    assert_eq!(system.assets_mut().take_load_requests(), vec![id]);
    assert!(system.assets().is_load_requested(id));

    system
        .assets_mut()
        .finish_load(id, RenderData::new(quad_meshes(2)))
        .unwrap();
    system.process_events();
    assert_eq!(system.component(entity).unwrap().mesh_instances().len(), 2);
}

#[test]
fn removed_asset_is_picked_up_again_when_re_added() {
    let mut system = RenderSystem::default();
    let id = system.assets_mut().reserve_id();
    system
        .assets_mut()
        .add(Asset::loaded(id, "Prop", RenderData::new(quad_meshes(1))));
    let entity = system.create_node("Prop");
    system
        .add_component(entity, RenderComponentData::asset(id))
        .unwrap();
    system.process_events();
    assert_eq!(system.component(entity).unwrap().mesh_instances().len(), 1);

    let removed = system.assets_mut().remove(id).unwrap();
    system.process_events();
    assert!(system.component(entity).unwrap().mesh_instances().is_empty());
    assert_eq!(system.component(entity).unwrap().asset(), Some(id));

    system.assets_mut().add(removed);
    system.process_events();
    assert_eq!(system.component(entity).unwrap().mesh_instances().len(), 1);
}

#[test]
fn asset_can_be_passed_by_reference() {
    let mut system = RenderSystem::default();
    let id = system.assets_mut().reserve_id();
    system
        .assets_mut()
        .add(Asset::loaded(id, "Prop", RenderData::new(quad_meshes(3))));
    system.process_events();

    let entity = system.create_node("Prop");
    system
        .add_component(entity, RenderComponentData::default())
        .unwrap();
    let asset = system.assets().get(id).unwrap().clone();
    system.component_mut(entity).unwrap().set_asset(&asset);

    assert_eq!(system.component(entity).unwrap().mesh_instances().len(), 3);
}

#[test]
fn removing_component_unbinds_every_reference() {
    let mut system = RenderSystem::default();
    let render = system.assets_mut().create("Prop", AssetKind::Render);
    let red = system.assets_mut().create("Red", AssetKind::Material);
    let blue = system.assets_mut().create("Blue", AssetKind::Material);

    let entity = system.create_node("Prop");
    let data = RenderComponentData {
        material_assets: vec![Some(red), None, Some(blue)],
        ..RenderComponentData::asset(render)
    };
    system.add_component(entity, data).unwrap();
    assert_eq!(system.assets().listener_count(), 3);

    system.remove_component(entity).unwrap();
    assert_eq!(system.assets().listener_count(), 0);
}

// ============================================================================
// Load Requests
// ============================================================================

#[test]
fn enabling_requests_pending_material_loads() {
    let mut system = RenderSystem::default();
    let material = system.assets_mut().create("Brick", AssetKind::Material);
    let entity = system.create_node("Wall");
    let data = RenderComponentData {
        enabled: false,
        material_assets: vec![Some(material)],
        ..RenderComponentData::default()
    };
    system.add_component(entity, data).unwrap();
    system.process_events();
    assert!(system.assets_mut().take_load_requests().is_empty());

    system.component_mut(entity).unwrap().set_enabled(true);
    assert_eq!(system.assets_mut().take_load_requests(), vec![material]);

    let brick = MaterialHandle::new(Material::new("Brick"));
    system.assets_mut().finish_load(material, brick.clone()).unwrap();
    system.process_events();
    assert_eq!(system.component(entity).unwrap().material(), &brick);
}

#[test]
fn detached_component_requests_nothing() {
    let mut system = RenderSystem::default();
    let render = system.assets_mut().create("Prop", AssetKind::Render);
    let entity = system.create_node("Prop");
    system.detach(entity);
    system
        .add_component(entity, RenderComponentData::asset(render))
        .unwrap();
    system.process_events();
    assert!(system.assets_mut().take_load_requests().is_empty());

    system.add_to_root(entity);
    assert_eq!(system.assets_mut().take_load_requests(), vec![render]);
}

// ============================================================================
// Entity References
// ============================================================================

#[test]
fn root_bone_path_resolves_on_enable() {
    let mut system = RenderSystem::default();
    let skin = Arc::new(Skin::new("Rig", vec!["Hips".into()], vec![Mat4::IDENTITY]));
    let mesh = Geometry::new("Body", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])
        .with_skin(Arc::clone(&skin));
    let id = system.assets_mut().reserve_id();
    system
        .assets_mut()
        .add(Asset::loaded(id, "Body", RenderData::new(vec![Arc::new(mesh)])));

    let entity = system.create_node("Character");
    system
        .add_component(entity, RenderComponentData::asset(id))
        .unwrap();
    system
        .component_mut(entity)
        .unwrap()
        .set_root_bone(Some(EntityTarget::Path("Armature".into())));
    system.process_events();
    assert!(!system.component(entity).unwrap().root_bone().is_resolved());
    assert!(system.skins().is_empty());

    let armature = system.create_node("Armature");
    system.attach(armature, entity);
    system.component_mut(entity).unwrap().set_enabled(false).set_enabled(true);

    let component = system.component(entity).unwrap();
    assert_eq!(component.root_bone().entity(), Some(armature));
    assert!(component.mesh_instances()[0].skin_instance().is_some());
    assert_eq!(system.skins().len(), 1);
}
