use glam::{Mat4, Quat, Vec3};

use crate::model::Camera;
use crate::utils::{create_box_mesh, rgb, Mesh};

/// Weapon anchor relative to the camera: right, down, and ahead.
pub const WEAPON_OFFSET: Vec3 = Vec3::new(0.3, -0.2, -0.5);

/// Muzzle light position in weapon-local space.
pub const MUZZLE_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -0.25);

/// How long the muzzle flash stays lit after a fire press (milliseconds).
pub const FLASH_MS: f64 = 100.0;

pub const MUZZLE_LIGHT_INTENSITY: f32 = 10.0;
pub const MUZZLE_LIGHT_RANGE: f32 = 5.0;
pub const MUZZLE_LIGHT_COLOR: [f32; 3] = [1.0, 0.65, 0.0];

/// View-model rigidly attached to the camera. Firing is purely cosmetic:
/// no ammo decrement, no projectile, no hit-scan.
pub struct WeaponViewModel {
    pub position: Vec3,
    pub rotation: Quat,
    /// Frame-clock timestamp (ms) until which the muzzle flash stays lit.
    lit_until: f64,
}

impl WeaponViewModel {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            lit_until: 0.0,
        }
    }

    /// Follow the camera: offset rotated into world space, orientation
    /// copied verbatim.
    pub fn follow(&mut self, camera: &Camera) {
        let rotation = camera.rotation();
        self.position = camera.eye + rotation * WEAPON_OFFSET;
        self.rotation = rotation;
    }

    /// Light the muzzle flash. `now` is the frame clock in milliseconds.
    /// Re-firing extends the deadline; the last press wins.
    pub fn trigger(&mut self, now: f64) {
        self.lit_until = now + FLASH_MS;
    }

    pub fn flash_lit(&self, now: f64) -> bool {
        now < self.lit_until
    }

    /// Muzzle light position in world space.
    pub fn muzzle_position(&self) -> Vec3 {
        self.position + self.rotation * MUZZLE_OFFSET
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Weapon-local mesh: barrel plus body, drawn with `transform()`.
    pub fn mesh() -> Mesh {
        let mut mesh = create_box_mesh(Vec3::new(0.05, 0.05, 0.4), rgb(0x333333));
        let mut body = create_box_mesh(Vec3::new(0.08, 0.08, 0.15), rgb(0x222222));
        body.translate(Vec3::new(0.0, 0.0, -0.15));
        mesh.extend(&body);
        mesh
    }
}

impl Default for WeaponViewModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EYE_HEIGHT;

    fn camera_facing_neg_z() -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.set_look_at(cam.eye + Vec3::NEG_Z);
        cam
    }

    #[test]
    fn test_follow_applies_rotated_offset() {
        // Facing -Z the camera pose is identity, so the offset is verbatim
        let cam = camera_facing_neg_z();
        let mut weapon = WeaponViewModel::new();
        weapon.follow(&cam);

        let expected = cam.eye + WEAPON_OFFSET;
        assert!((weapon.position - expected).length() < 1e-5);
        assert!(weapon.rotation.angle_between(cam.rotation()) < 1e-5);
    }

    #[test]
    fn test_follow_tracks_turned_camera() {
        // Facing +X, "ahead" becomes +X and "right" becomes +Z
        let mut cam = Camera::new(800, 600);
        cam.yaw = 0.0;
        cam.pitch = 0.0;
        let mut weapon = WeaponViewModel::new();
        weapon.follow(&cam);

        let expected = cam.eye + Vec3::new(-WEAPON_OFFSET.z, WEAPON_OFFSET.y, WEAPON_OFFSET.x);
        assert!((weapon.position - expected).length() < 1e-5, "got {}", weapon.position);
    }

    #[test]
    fn test_flash_lit_for_exactly_the_flash_window() {
        let mut weapon = WeaponViewModel::new();
        assert!(!weapon.flash_lit(0.0));

        weapon.trigger(1000.0);
        assert!(weapon.flash_lit(1000.0), "lit immediately on fire");
        assert!(weapon.flash_lit(1099.9));
        assert!(!weapon.flash_lit(1100.0), "unlit once 100ms have passed");
    }

    #[test]
    fn test_refire_extends_deadline() {
        let mut weapon = WeaponViewModel::new();
        weapon.trigger(1000.0);
        weapon.trigger(1080.0);
        assert!(weapon.flash_lit(1150.0));
        assert!(!weapon.flash_lit(1180.0));
    }

    #[test]
    fn test_muzzle_sits_ahead_of_the_barrel() {
        let cam = camera_facing_neg_z();
        let mut weapon = WeaponViewModel::new();
        weapon.follow(&cam);

        let muzzle = weapon.muzzle_position();
        assert!(muzzle.z < weapon.position.z, "muzzle is further along -Z");
        assert!((muzzle.y - (EYE_HEIGHT + WEAPON_OFFSET.y)).abs() < 1e-5);
    }

    #[test]
    fn test_mesh_is_barrel_plus_body() {
        let mesh = WeaponViewModel::mesh();
        assert_eq!(mesh.vertices.len(), 48, "two boxes");
        assert_eq!(mesh.indices.len(), 72);
    }
}
