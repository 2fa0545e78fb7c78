//! Orbit camera using dolly

use dolly::prelude::*;
use glam::{Mat4, Vec3};

use crate::frame::CameraView;
use crate::scene::{Scene, SceneConfig};

/// Orbit camera rig for the viewport
pub struct OrbitCamera {
    rig: CameraRig,
    home_target: Vec3,
    home_distance: f32,
    home_angles: (f32, f32),
    /// Vertical FOV in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl OrbitCamera {
    /// Camera orbiting `target` from `position`
    pub fn new(target: Vec3, position: Vec3, fov: f32, near: f32, far: f32) -> Self {
        let offset = position - target;
        let distance = offset.length().max(0.1);
        let dir = offset / distance;
        // Yaw 0 / pitch 0 looks down -Z from +Z
        let yaw = dir.x.atan2(dir.z).to_degrees();
        let pitch = (-dir.y).asin().to_degrees();

        let rig = CameraRig::builder()
            .with(YawPitch::new().yaw_degrees(yaw).pitch_degrees(pitch))
            .with(Smooth::new_rotation(0.0))
            .with(Arm::new(mint::Vector3 { x: 0.0, y: 0.0, z: distance }))
            .with(Smooth::new_position(0.0))
            .with(LookAt::new(mint::Point3 { x: target.x, y: target.y, z: target.z }).tracking_smoothness(0.0))
            .build();

        Self {
            rig,
            home_target: target,
            home_distance: distance,
            home_angles: (yaw, pitch),
            fov,
            near,
            far,
        }
    }

    /// Orbit around target (drag)
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let sensitivity = 0.4;
        self.rig.driver_mut::<YawPitch>().rotate_yaw_pitch(
            -delta_x * sensitivity,
            -delta_y * sensitivity,
        );
    }

    /// Pan target in screen space (middle drag)
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let right: Vec3 = self.rig.final_transform.right();
        let up: Vec3 = self.rig.final_transform.up();
        let sensitivity = 0.002 * self.distance();
        let offset = right * (-delta_x * sensitivity) + up * (delta_y * sensitivity);

        let look_at = self.rig.driver_mut::<LookAt>();
        look_at.target.x += offset.x;
        look_at.target.y += offset.y;
        look_at.target.z += offset.z;
    }

    /// Zoom (scroll)
    pub fn zoom(&mut self, delta: f32) {
        let current = self.distance();
        let factor = 1.0 - delta * 0.001;
        self.set_distance(current * factor);
    }

    /// Back to the initial view
    pub fn reset(&mut self) {
        let t = self.home_target;
        self.rig.driver_mut::<LookAt>().target = mint::Point3 { x: t.x, y: t.y, z: t.z };
        self.set_distance(self.home_distance);
        let (yaw, pitch) = self.home_angles;
        self.set_angles(yaw, pitch);
    }

    pub fn distance(&self) -> f32 {
        self.rig.driver::<Arm>().offset.z
    }

    pub fn set_distance(&mut self, dist: f32) {
        self.rig.driver_mut::<Arm>().offset.z = dist.clamp(0.1, 5000.0);
    }

    /// Yaw and pitch in degrees
    pub fn angles(&self) -> (f32, f32) {
        let yp = self.rig.driver::<YawPitch>();
        (yp.yaw_degrees, yp.pitch_degrees)
    }

    /// Set yaw and pitch in degrees
    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        let yp = self.rig.driver_mut::<YawPitch>();
        yp.yaw_degrees = yaw;
        yp.pitch_degrees = pitch.clamp(-90.0, 90.0);
    }

    /// Update camera (call each frame)
    pub fn update(&mut self, dt: f32) {
        self.rig.update(dt);
    }

    pub fn position(&self) -> Vec3 {
        let p = self.rig.final_transform.position;
        Vec3::new(p.x, p.y, p.z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        let t = &self.rig.final_transform;
        let pos = self.position();
        let fwd: Vec3 = t.forward();
        let up: Vec3 = t.up();
        Mat4::look_at_rh(pos, pos + fwd, up)
    }

    /// Projection with wgpu's 0..1 depth range
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// Matrices for a frame snapshot
    pub fn view(&self, aspect: f32) -> CameraView {
        CameraView {
            view: self.view_matrix(),
            proj: self.projection_matrix(aspect),
            position: self.position(),
        }
    }
}

impl OrbitCamera {
    /// Orbit the origin from the scene's camera node
    pub fn from_scene(scene: &Scene) -> Option<Self> {
        let (transform, fov, near, far) = scene.camera()?;
        Some(Self::new(Vec3::ZERO, transform.translation, fov, near, far))
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let c = SceneConfig::default();
        Self::new(
            Vec3::ZERO,
            c.camera_position,
            c.camera_fov_y_degrees,
            c.camera_near,
            c.camera_far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let mut cam = OrbitCamera::default();
        cam.update(0.016);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 9.0)).length() < 1e-3);
        let origin = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -9.0)).length() < 1e-3);
    }

    #[test]
    fn test_reset_restores_home() {
        let mut cam = OrbitCamera::default();
        cam.orbit(120.0, 40.0);
        cam.zoom(300.0);
        cam.update(0.016);
        cam.reset();
        cam.update(0.016);
        assert!((cam.distance() - 9.0).abs() < 1e-4);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 9.0)).length() < 1e-3);
    }

    #[test]
    fn test_from_scene_uses_camera_node() {
        let scene = crate::scene::compose_scene(&SceneConfig {
            camera_position: Vec3::new(0.0, 0.0, 20.0),
            camera_fov_y_degrees: 40.0,
            camera_near: 0.5,
            camera_far: 300.0,
            icosahedron_detail: 0,
            ..Default::default()
        });
        let mut cam = OrbitCamera::from_scene(&scene).unwrap();
        cam.update(0.016);

        let view = cam.view(1.5);
        assert!((view.position - Vec3::new(0.0, 0.0, 20.0)).abs().max_element() < 1e-3);
        assert!((cam.distance() - 20.0).abs() < 1e-4);
        let expected = Mat4::perspective_rh(40f32.to_radians(), 1.5, 0.5, 300.0);
        assert!(view.proj.abs_diff_eq(expected, 1e-6));
    }
}
