//! Frame planning: pass order, the asset gate, and parameter snapshots.

use std::sync::Arc;

use dispersion::prelude::*;
use dispersion::scene::icosahedron;
use glam::{Vec2, Vec3};

fn scene(ready: bool) -> Scene {
    let mut scene = compose_scene(&SceneConfig {
        icosahedron_detail: 0,
        ..Default::default()
    });
    if ready {
        scene.set_asset_state(AssetState::Ready(Arc::new(icosahedron(1.0, 1))));
    }
    scene
}

fn snapshot(params: &DispersionParams) -> FrameSnapshot {
    FrameSnapshot::new(params, 2.0, Resolution::new(1600, 1200), CameraView::default())
}

#[test]
fn test_three_passes_in_order() {
    let plan = plan_frame(&scene(true), &snapshot(&DispersionParams::default()));
    assert!(!plan.gated);

    let targets: Vec<_> = plan.passes.iter().map(|p| p.target).collect();
    assert_eq!(targets, [PassTarget::Back, PassTarget::Main, PassTarget::Screen]);

    let back = &plan.passes[0];
    assert!(!back.mesh_visible);
    assert_eq!(back.side, None);

    let main = &plan.passes[1];
    assert!(main.mesh_visible);
    assert_eq!(main.side, Some(FaceSide::Back));
    assert_eq!(main.input, Some(PassTarget::Back));

    let screen = plan.visible_pass().unwrap();
    assert!(screen.mesh_visible);
    assert_eq!(screen.side, Some(FaceSide::Front));
    assert_eq!(screen.input, Some(PassTarget::Main));

    assert_eq!(plan.offscreen_passes().count(), 2);
    assert_eq!(plan.background_rotation, 2.0);
    assert_eq!(plan.clear_color, Vec3::ZERO);
}

#[test]
fn test_gated_frame_only_clears() {
    for state in [AssetState::Loading, AssetState::Failed("no such node".into())] {
        let mut scene = scene(false);
        scene.set_asset_state(state);
        let plan = plan_frame(&scene, &snapshot(&DispersionParams::default()));
        assert!(plan.gated);
        assert_eq!(plan.passes.len(), 1);
        assert_eq!(plan.offscreen_passes().count(), 0);
        let pass = plan.visible_pass().unwrap();
        assert!(!pass.mesh_visible);
        assert_eq!(pass.input, None);
    }
}

#[test]
fn test_uniforms_follow_params() {
    let mut params = DispersionParams::default();
    params.set("iorG", 1.5).unwrap();
    params.set("refraction", 0.9).unwrap();
    params.light = Vec3::new(2.0, 0.0, -1.0);

    let plan = plan_frame(&scene(true), &snapshot(&params));
    let u = &plan.uniforms;
    assert_eq!(u.iors, [1.15, 1.16, 1.5, 1.22, 1.22, 1.22]);
    assert_eq!(u.refract_power, 0.9);
    assert_eq!(u.light, Vec3::new(2.0, 0.0, -1.0));
    assert_eq!(u.resolution, Vec2::new(1600.0, 1200.0));
}

#[test]
fn test_out_of_range_params_clamped_in_snapshot() {
    let mut params = DispersionParams::default();
    params.ior_r = 0.5;
    params.ior_p = 3.0;
    params.saturation = f32::NAN;
    params.chromatic_aberration = 2.0;
    params.refraction = -1.0;
    params.shininess = 500.0;

    let snap = snapshot(&params);
    assert_eq!(snap.params.ior_r, 1.0);
    assert_eq!(snap.params.ior_p, 2.333);
    assert_eq!(snap.params.saturation, 1.0);
    assert_eq!(snap.params.chromatic_aberration, 1.5);
    assert_eq!(snap.params.refraction, 0.0);
    // Unbounded
    assert_eq!(snap.params.shininess, 500.0);

    // The live store is not touched
    assert_eq!(params.ior_p, 3.0);
}

#[test]
fn test_snapshot_is_detached_from_store() {
    let mut params = DispersionParams::default();
    let snap = snapshot(&params);
    params.set("iorR", 2.0).unwrap();
    assert_eq!(snap.params.ior_r, 1.15);
}

#[test]
fn test_resolution_scaling() {
    let logical = Vec2::new(1024.0, 768.0);
    assert_eq!(physical_resolution(logical, 1.0), Resolution::new(1024, 768));
    assert_eq!(physical_resolution(logical, 1.25), Resolution::new(1280, 960));
    assert_eq!(physical_resolution(logical, 4.0), Resolution::new(2048, 1536));
}
