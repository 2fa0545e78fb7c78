//! Typed scene tree for the dispersion demo.
//!
//! The tree is built once by [`compose_scene`] and never restructured.
//! Nodes live in an arena and are addressed by [`NodeId`], which is simply
//! the arena index. Animation is not stored in the tree: a spinning group
//! derives its rotation from the elapsed time passed to [`Scene::traverse`],
//! so traversal is a pure function of the tree and the frame time.

mod composer;
mod geometry;
mod stars;

pub use composer::{compose_scene, SceneConfig};
pub use geometry::{compute_vertex_normals, icosahedron, MeshData};
pub use stars::{Star, StarField, StarFieldConfig};

use glam::{Mat4, Quat, Vec3};

use crate::asset::AssetState;

/// Stable node identity (arena index, assigned in construction order)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index into the scene's built-in geometry table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// Local transform (translation, rotation, scale)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// XYZ Euler angles in radians
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        Self {
            rotation: Quat::from_euler(glam::EulerRot::XYZ, x, y, z),
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Time-driven rotation of a group
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spin {
    /// Rotation about Z equals elapsed seconds (radians)
    ElapsedZ,
}

/// Where a mesh node gets its triangles
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryRef {
    Builtin(GeometryId),
    /// The externally loaded mesh, available once the asset is ready
    Asset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    /// Ambient-lit opaque surface
    Standard { color: Vec3 },
    /// Refractive, chromatically dispersive surface
    Dispersion,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshNode {
    pub geometry: GeometryRef,
    pub material: Material,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group { spin: Option<Spin> },
    Mesh(MeshNode),
    AmbientLight { color: Vec3, intensity: f32 },
    Camera { fov_y_degrees: f32, near: f32, far: f32 },
    Stars(StarField),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Hidden nodes are skipped with their whole subtree
    pub visible: bool,
}

/// A node reached by [`Scene::traverse`], with its world matrix at that time.
#[derive(Clone, Copy, Debug)]
pub struct VisitedNode<'a> {
    pub node: &'a SceneNode,
    pub world: Mat4,
}

impl VisitedNode<'_> {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

/// The composed demo scene
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    root: NodeId,
    geometries: Vec<MeshData>,
    background: Vec3,
    camera: NodeId,
    ambient: NodeId,
    dispersion_group: NodeId,
    background_group: NodeId,
    dispersive_mesh: NodeId,
    stars: NodeId,
    asset: AssetState,
    asset_generation: u64,
}

impl Scene {
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn geometries(&self) -> &[MeshData] {
        &self.geometries
    }

    pub fn background_color(&self) -> Vec3 {
        self.background
    }

    /// Group gated on the asset: grid, dispersive mesh and stars
    pub fn dispersion_group(&self) -> NodeId {
        self.dispersion_group
    }

    /// Spinning parent of the icosahedron grid
    pub fn background_group(&self) -> NodeId {
        self.background_group
    }

    pub fn dispersive_mesh(&self) -> NodeId {
        self.dispersive_mesh
    }

    pub fn stars_node(&self) -> NodeId {
        self.stars
    }

    pub fn star_field(&self) -> Option<&StarField> {
        match self.node(self.stars).map(|n| &n.kind) {
            Some(NodeKind::Stars(field)) => Some(field),
            _ => None,
        }
    }

    /// Camera node: initial transform, vertical fov (degrees), near, far
    pub fn camera(&self) -> Option<(&Transform, f32, f32, f32)> {
        let node = self.node(self.camera)?;
        match node.kind {
            NodeKind::Camera {
                fov_y_degrees,
                near,
                far,
            } => Some((&node.transform, fov_y_degrees, near, far)),
            _ => None,
        }
    }

    /// Ambient light color premultiplied by intensity
    pub fn ambient_light(&self) -> Vec3 {
        match self.node(self.ambient).map(|n| &n.kind) {
            Some(NodeKind::AmbientLight { color, intensity }) => *color * *intensity,
            _ => Vec3::ZERO,
        }
    }

    pub fn asset_state(&self) -> &AssetState {
        &self.asset
    }

    /// Bumped on every asset state change so GPU copies can tell they are stale
    pub fn asset_generation(&self) -> u64 {
        self.asset_generation
    }

    pub fn set_asset_state(&mut self, state: AssetState) {
        tracing::debug!("Asset state -> {}", state.status());
        self.asset = state;
        self.asset_generation += 1;
    }

    /// The dispersion subtree is drawn only once the asset is ready
    pub fn is_gate_open(&self) -> bool {
        self.asset.is_ready()
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.visible = visible;
        }
    }

    /// Rotation of the background group about Z at `elapsed` seconds
    pub fn background_rotation(elapsed: f32) -> f32 {
        elapsed
    }

    fn local_matrix(&self, node: &SceneNode, elapsed: f32) -> Mat4 {
        match node.kind {
            NodeKind::Group {
                spin: Some(Spin::ElapsedZ),
            } => {
                let spun = Transform {
                    rotation: Quat::from_rotation_z(Self::background_rotation(elapsed))
                        * node.transform.rotation,
                    ..node.transform
                };
                spun.matrix()
            }
            _ => node.transform.matrix(),
        }
    }

    /// Depth-first walk from the root in child order, yielding every visible
    /// node with its world matrix at `elapsed` seconds. The dispersion
    /// group and everything below it are skipped unless the asset is ready.
    pub fn traverse(&self, elapsed: f32) -> Vec<VisitedNode<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, Mat4::IDENTITY)];

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if !node.visible || (id == self.dispersion_group && !self.is_gate_open()) {
                continue;
            }
            let world = parent * self.local_matrix(node, elapsed);
            out.push(VisitedNode { node, world });
            // Reverse so children pop in declaration order
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }

        out
    }

    /// World matrix of a single node at `elapsed`, if it is reached by traversal
    pub fn world_matrix(&self, id: NodeId, elapsed: f32) -> Option<Mat4> {
        self.traverse(elapsed)
            .into_iter()
            .find(|v| v.id() == id)
            .map(|v| v.world)
    }

    /// Visited meshes using the standard material (the icosahedron grid)
    pub fn background_instances(&self, elapsed: f32) -> Vec<(GeometryId, Mat4)> {
        self.traverse(elapsed)
            .into_iter()
            .filter_map(|v| match v.node.kind {
                NodeKind::Mesh(MeshNode {
                    geometry: GeometryRef::Builtin(geometry),
                    material: Material::Standard { .. },
                }) => Some((geometry, v.world)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.matrix().w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_spin_rotates_about_z() {
        let node = SceneNode {
            id: NodeId(0),
            name: "g".into(),
            transform: Transform::IDENTITY,
            kind: NodeKind::Group {
                spin: Some(Spin::ElapsedZ),
            },
            children: vec![],
            visible: true,
        };
        let scene = compose_scene(&SceneConfig::default());
        let m = scene.local_matrix(&node, std::f32::consts::FRAC_PI_2);
        let x = m.transform_point3(Vec3::X);
        assert!((x - Vec3::Y).length() < 1e-6);
    }
}
