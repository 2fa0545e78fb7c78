//! Builds the one scene this program shows.

use glam::Vec3;

use super::{
    icosahedron, GeometryId, GeometryRef, Material, MeshData, MeshNode, NodeId, NodeKind, Scene,
    SceneNode, Spin, StarField, StarFieldConfig, Transform,
};
use crate::asset::AssetState;
use crate::util::range;

/// Constants of the demo scene
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub camera_position: Vec3,
    pub camera_fov_y_degrees: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub background: Vec3,
    /// Grid spans `-grid_extent..=grid_extent` on X and Y
    pub grid_extent: f32,
    pub grid_step: f32,
    pub grid_z: f32,
    pub grid_color: Vec3,
    pub icosahedron_radius: f32,
    pub icosahedron_detail: u32,
    /// XYZ Euler rotation of the dispersive mesh (radians)
    pub mesh_rotation: Vec3,
    pub stars: StarFieldConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_position: Vec3::new(0.0, 0.0, 9.0),
            camera_fov_y_degrees: 75.0,
            camera_near: 0.1,
            camera_far: 1000.0,
            ambient_color: Vec3::ONE,
            ambient_intensity: 5.0,
            background: Vec3::ZERO,
            grid_extent: 5.0,
            grid_step: 2.5,
            grid_z: -4.0,
            grid_color: Vec3::ONE,
            icosahedron_radius: 0.6,
            icosahedron_detail: 8,
            mesh_rotation: Vec3::new(0.0, -std::f32::consts::FRAC_PI_2, 0.0),
            stars: StarFieldConfig::default(),
        }
    }
}

struct Builder {
    nodes: Vec<SceneNode>,
}

impl Builder {
    fn add(&mut self, parent: Option<NodeId>, name: &str, transform: Transform, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            name: name.to_string(),
            transform,
            kind,
            children: Vec::new(),
            visible: true,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }
}

/// Build the scene tree:
///
/// ```text
/// root
/// ├── ambient light
/// ├── camera
/// └── dispersion            (gated on the asset)
///     ├── background grid   (spins about Z)
///     │   └── 25 × icosahedron
///     ├── dispersive mesh
///     └── stars
/// ```
///
/// The asset starts in [`AssetState::Loading`].
pub fn compose_scene(config: &SceneConfig) -> Scene {
    let mut b = Builder { nodes: Vec::new() };

    let root = b.add(None, "root", Transform::IDENTITY, NodeKind::Group { spin: None });
    let ambient = b.add(
        Some(root),
        "ambient_light",
        Transform::IDENTITY,
        NodeKind::AmbientLight {
            color: config.ambient_color,
            intensity: config.ambient_intensity,
        },
    );
    let camera = b.add(
        Some(root),
        "camera",
        Transform::from_translation(config.camera_position),
        NodeKind::Camera {
            fov_y_degrees: config.camera_fov_y_degrees,
            near: config.camera_near,
            far: config.camera_far,
        },
    );
    let dispersion_group = b.add(
        Some(root),
        "dispersion",
        Transform::IDENTITY,
        NodeKind::Group { spin: None },
    );

    let background_group = b.add(
        Some(dispersion_group),
        "background",
        Transform::IDENTITY,
        NodeKind::Group {
            spin: Some(Spin::ElapsedZ),
        },
    );

    let geometries: Vec<MeshData> = vec![icosahedron(
        config.icosahedron_radius,
        config.icosahedron_detail,
    )];
    let ico = GeometryId(0);

    let coords = range(-config.grid_extent, config.grid_extent, config.grid_step);
    for &x in &coords {
        for &y in &coords {
            b.add(
                Some(background_group),
                &format!("icosahedron_{}_{}", x, y),
                Transform::from_translation(Vec3::new(x, y, config.grid_z)),
                NodeKind::Mesh(MeshNode {
                    geometry: GeometryRef::Builtin(ico),
                    material: Material::Standard {
                        color: config.grid_color,
                    },
                }),
            );
        }
    }

    let r = config.mesh_rotation;
    let dispersive_mesh = b.add(
        Some(dispersion_group),
        "suzanne",
        Transform::from_euler(r.x, r.y, r.z),
        NodeKind::Mesh(MeshNode {
            geometry: GeometryRef::Asset,
            material: Material::Dispersion,
        }),
    );

    let stars = b.add(
        Some(dispersion_group),
        "stars",
        Transform::IDENTITY,
        NodeKind::Stars(StarField::generate(config.stars)),
    );

    tracing::debug!(
        "Composed scene: {} nodes, {} grid meshes",
        b.nodes.len(),
        coords.len() * coords.len()
    );

    Scene {
        nodes: b.nodes,
        root,
        geometries,
        background: config.background,
        camera,
        ambient,
        dispersion_group,
        background_group,
        dispersive_mesh,
        stars,
        asset: AssetState::Loading,
        asset_generation: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SceneConfig {
        SceneConfig {
            icosahedron_detail: 1,
            stars: StarFieldConfig {
                count: 64,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_ids_are_arena_indices() {
        let scene = compose_scene(&small());
        for (i, node) in scene.nodes().iter().enumerate() {
            assert_eq!(node.id, NodeId(i));
        }
        assert_eq!(scene.root(), NodeId(0));
    }

    #[test]
    fn test_composition_is_repeatable() {
        let a = compose_scene(&small());
        let b = compose_scene(&small());
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn test_tree_shape() {
        let scene = compose_scene(&small());
        let group = scene.node(scene.dispersion_group()).unwrap();
        assert_eq!(
            group.children,
            vec![scene.background_group(), scene.dispersive_mesh(), scene.stars_node()]
        );
        let grid = scene.node(scene.background_group()).unwrap();
        assert_eq!(grid.children.len(), 25);
        assert_eq!(scene.ambient_light(), Vec3::splat(5.0));
        let (transform, fov, _, _) = scene.camera().unwrap();
        assert_eq!(transform.translation, Vec3::new(0.0, 0.0, 9.0));
        assert_eq!(fov, 75.0);
        assert_eq!(scene.star_field().unwrap().len(), 64);
    }

    #[test]
    fn test_starts_loading() {
        let scene = compose_scene(&small());
        assert_eq!(scene.asset_state(), &AssetState::Loading);
        assert!(!scene.is_gate_open());
    }
}
