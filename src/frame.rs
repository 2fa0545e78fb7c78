//! Per-frame snapshot and the three-pass refraction plan.
//!
//! [`plan_frame`] is a pure function: given the scene and an immutable
//! [`FrameSnapshot`] it describes every pass of the frame, including which
//! offscreen image each pass reads and which faces of the dispersive mesh
//! it draws. The GPU side only executes the plan.

use glam::{Mat4, Vec2, Vec3};

use crate::params::DispersionParams;
use crate::scene::{Scene, SceneConfig};

/// Upper bound applied to the display scale factor
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Render target size in physical pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Physical render size for a logical viewport at the given display scale.
///
/// The scale is capped at [`MAX_PIXEL_RATIO`]; each side is at least 1.
pub fn physical_resolution(logical: Vec2, pixels_per_point: f32) -> Resolution {
    let scale = pixels_per_point.min(MAX_PIXEL_RATIO);
    Resolution {
        width: ((logical.x * scale).round() as u32).max(1),
        height: ((logical.y * scale).round() as u32).max(1),
    }
}

/// Camera matrices for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub view: Mat4,
    pub proj: Mat4,
    pub position: Vec3,
}

/// The default scene camera looking at the origin, square aspect
impl Default for CameraView {
    fn default() -> Self {
        let c = SceneConfig::default();
        let position = c.camera_position;
        Self {
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            proj: Mat4::perspective_rh(
                c.camera_fov_y_degrees.to_radians(),
                1.0,
                c.camera_near,
                c.camera_far,
            ),
            position,
        }
    }
}

/// Everything a frame reads, captured once before any pass runs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Already clamped to the declared ranges
    pub params: DispersionParams,
    /// Seconds since start
    pub elapsed: f32,
    pub resolution: Resolution,
    pub camera: CameraView,
}

impl FrameSnapshot {
    pub fn new(
        params: &DispersionParams,
        elapsed: f32,
        resolution: Resolution,
        camera: CameraView,
    ) -> Self {
        Self {
            params: params.clamped(),
            elapsed,
            resolution,
            camera,
        }
    }
}

/// Values bound to the dispersion shader for a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialUniforms {
    pub light: Vec3,
    pub resolution: Vec2,
    pub diffuseness: f32,
    pub shininess: f32,
    pub fresnel_power: f32,
    /// R, Y, G, C, B, P
    pub iors: [f32; 6],
    pub saturation: f32,
    pub chromatic_aberration: f32,
    pub refract_power: f32,
}

impl MaterialUniforms {
    pub fn from_snapshot(snapshot: &FrameSnapshot) -> Self {
        let p = &snapshot.params;
        Self {
            light: p.light,
            resolution: snapshot.resolution.as_vec2(),
            diffuseness: p.diffuseness,
            shininess: p.shininess,
            fresnel_power: p.fresnel_power,
            iors: p.iors(),
            saturation: p.saturation,
            chromatic_aberration: p.chromatic_aberration,
            refract_power: p.refraction,
        }
    }
}

/// Where a pass writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassTarget {
    /// Offscreen image of the scene without the dispersive mesh
    Back,
    /// Offscreen image including the mesh's back faces
    Main,
    /// The visible viewport
    Screen,
}

/// Faces of the dispersive mesh drawn in a pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceSide {
    Front,
    Back,
}

/// One pass with all of the state it needs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassPlan {
    pub target: PassTarget,
    pub mesh_visible: bool,
    /// `None` when the mesh is hidden
    pub side: Option<FaceSide>,
    /// Offscreen image sampled by the dispersion shader
    pub input: Option<PassTarget>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub passes: Vec<PassPlan>,
    pub uniforms: MaterialUniforms,
    /// Background group rotation about Z (radians)
    pub background_rotation: f32,
    pub clear_color: Vec3,
    /// True when the asset gate is closed and the frame only clears
    pub gated: bool,
}

impl FramePlan {
    pub fn offscreen_passes(&self) -> impl Iterator<Item = &PassPlan> {
        self.passes.iter().filter(|p| p.target != PassTarget::Screen)
    }

    pub fn visible_pass(&self) -> Option<&PassPlan> {
        self.passes.iter().find(|p| p.target == PassTarget::Screen)
    }
}

/// Plan one displayed frame.
///
/// With the asset ready this yields three passes:
/// 1. `Back`: everything except the dispersive mesh.
/// 2. `Main`: the mesh's back faces, refracting `Back`.
/// 3. `Screen`: the mesh's front faces, refracting `Main`.
///
/// Otherwise it yields a single `Screen` pass that only clears.
pub fn plan_frame(scene: &Scene, snapshot: &FrameSnapshot) -> FramePlan {
    let uniforms = MaterialUniforms::from_snapshot(snapshot);
    let background_rotation = Scene::background_rotation(snapshot.elapsed);
    let clear_color = scene.background_color();

    if !scene.is_gate_open() {
        return FramePlan {
            passes: vec![PassPlan {
                target: PassTarget::Screen,
                mesh_visible: false,
                side: None,
                input: None,
            }],
            uniforms,
            background_rotation,
            clear_color,
            gated: true,
        };
    }

    let passes = vec![
        PassPlan {
            target: PassTarget::Back,
            mesh_visible: false,
            side: None,
            input: None,
        },
        PassPlan {
            target: PassTarget::Main,
            mesh_visible: true,
            side: Some(FaceSide::Back),
            input: Some(PassTarget::Back),
        },
        PassPlan {
            target: PassTarget::Screen,
            mesh_visible: true,
            side: Some(FaceSide::Front),
            input: Some(PassTarget::Main),
        },
    ];

    FramePlan {
        passes,
        uniforms,
        background_rotation,
        clear_color,
        gated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_resolution_caps_scale() {
        let logical = Vec2::new(800.0, 600.0);
        assert_eq!(physical_resolution(logical, 1.0), Resolution::new(800, 600));
        assert_eq!(physical_resolution(logical, 1.5), Resolution::new(1200, 900));
        assert_eq!(physical_resolution(logical, 2.0), Resolution::new(1600, 1200));
        assert_eq!(physical_resolution(logical, 3.0), Resolution::new(1600, 1200));
    }

    #[test]
    fn test_physical_resolution_never_zero() {
        assert_eq!(physical_resolution(Vec2::ZERO, 1.0), Resolution::new(1, 1));
    }

    #[test]
    fn test_snapshot_clamps_params() {
        let mut params = DispersionParams::default();
        params.ior_c = 5.0;
        params.saturation = 0.0;
        let snap = FrameSnapshot::new(&params, 0.0, Resolution::new(4, 4), CameraView::default());
        assert_eq!(snap.params.ior_c, 2.333);
        assert_eq!(snap.params.saturation, 1.0);

        let u = MaterialUniforms::from_snapshot(&snap);
        assert_eq!(u.iors[3], 2.333);
        assert_eq!(u.resolution, Vec2::new(4.0, 4.0));
        assert_eq!(u.refract_power, 0.4);
    }
}
