//! Scene composition and traversal through the public API.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use dispersion::prelude::*;
use dispersion::scene::{icosahedron, NodeKind};
use glam::{Quat, Vec3};

fn ready_scene() -> Scene {
    let mut scene = compose_scene(&SceneConfig {
        icosahedron_detail: 1,
        ..Default::default()
    });
    scene.set_asset_state(AssetState::Ready(Arc::new(icosahedron(1.0, 0))));
    scene
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn test_grid_layout_at_rest() {
    let scene = ready_scene();
    let instances = scene.background_instances(0.0);
    assert_eq!(instances.len(), 25);

    let coords = [-5.0, -2.5, 0.0, 2.5, 5.0];
    for x in coords {
        for y in coords {
            let expected = Vec3::new(x, y, -4.0);
            assert!(
                instances
                    .iter()
                    .any(|(_, m)| approx(m.w_axis.truncate(), expected)),
                "no icosahedron at {:?}",
                expected
            );
        }
    }
}

#[test]
fn test_grid_rotates_with_elapsed_time() {
    let scene = ready_scene();
    let t = 1.25_f32;
    let spin = Quat::from_rotation_z(t);

    for visited in scene.traverse(t) {
        if !visited.node.name.starts_with("icosahedron_") {
            continue;
        }
        let local = visited.node.transform.translation;
        assert!(approx(visited.world_position(), spin * local));
        assert!((visited.world_position().z + 4.0).abs() < 1e-5);
    }

    // Rotation equals elapsed seconds
    assert_eq!(Scene::background_rotation(t), t);
    let quarter = scene.background_instances(FRAC_PI_2);
    assert!(quarter
        .iter()
        .any(|(_, m)| approx(m.w_axis.truncate(), Vec3::new(0.0, 5.0, -4.0))));
}

#[test]
fn test_traversal_is_repeatable() {
    let scene = ready_scene();
    let first: Vec<_> = scene.traverse(3.0).iter().map(|v| (v.id(), v.world)).collect();
    let second: Vec<_> = scene.traverse(3.0).iter().map(|v| (v.id(), v.world)).collect();
    assert_eq!(first, second);

    // Root first, then children in declaration order
    let names: Vec<_> = scene.traverse(0.0).iter().map(|v| v.node.name.clone()).collect();
    assert_eq!(names[0], "root");
    assert_eq!(names[1], "ambient_light");
    assert_eq!(names[2], "camera");
    assert_eq!(names[3], "dispersion");
    assert_eq!(names[4], "background");
    assert_eq!(names.last().map(String::as_str), Some("stars"));
}

#[test]
fn test_gate_hides_dispersion_subtree() {
    let mut scene = compose_scene(&SceneConfig {
        icosahedron_detail: 0,
        ..Default::default()
    });
    assert!(!scene.is_gate_open());
    let names: Vec<_> = scene.traverse(0.0).iter().map(|v| v.node.name.clone()).collect();
    assert_eq!(names, ["root", "ambient_light", "camera"]);
    assert!(scene.background_instances(0.0).is_empty());

    scene.set_asset_state(AssetState::Failed("broken file".into()));
    assert!(!scene.is_gate_open());
    assert!(scene.world_matrix(scene.dispersive_mesh(), 0.0).is_none());

    scene.set_asset_state(AssetState::Ready(Arc::new(icosahedron(1.0, 0))));
    assert!(scene.is_gate_open());
    assert!(scene.world_matrix(scene.dispersive_mesh(), 0.0).is_some());
}

#[test]
fn test_hidden_stars_are_skipped() {
    let mut scene = ready_scene();
    let stars = scene.stars_node();
    scene.set_visible(stars, false);
    assert!(scene.traverse(0.0).iter().all(|v| v.id() != stars));
    // Star data itself is untouched
    assert_eq!(scene.star_field().map(|f| f.len()), Some(5000));
}

#[test]
fn test_scene_constants() {
    let scene = ready_scene();
    let (camera, fov, near, far) = scene.camera().unwrap();
    assert_eq!(camera.translation, Vec3::new(0.0, 0.0, 9.0));
    assert_eq!((fov, near, far), (75.0, 0.1, 1000.0));
    assert_eq!(scene.ambient_light(), Vec3::splat(5.0));
    assert_eq!(scene.background_color(), Vec3::ZERO);

    let mesh = scene.node(scene.dispersive_mesh()).unwrap();
    assert!(matches!(mesh.kind, NodeKind::Mesh(_)));
    let world = scene.world_matrix(scene.dispersive_mesh(), 10.0).unwrap();
    // Mesh sits outside the spinning group: its transform ignores time
    assert_eq!(world, scene.world_matrix(scene.dispersive_mesh(), 0.0).unwrap());
}
