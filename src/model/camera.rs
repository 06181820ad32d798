use glam::{Mat3, Mat4, Quat, Vec3};

/// First-person camera. Exactly one exists per session; position is written
/// by the player controller, orientation by the mouse-look handler.
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

/// Standing view height above the ground plane.
pub const EYE_HEIGHT: f32 = 1.7;

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, EYE_HEIGHT, 10.0),
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    /// Look direction projected onto the ground plane. Zero only when the
    /// camera looks straight up or down, which the pitch clamp prevents.
    pub fn level_forward(&self) -> Vec3 {
        let mut f = self.forward();
        f.y = 0.0;
        f.normalize_or_zero()
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = width as f32 / height as f32; }

    /// World-space orientation as a quaternion (local -Z maps onto
    /// `forward()`). Used to rigidly attach the weapon view-model.
    pub fn rotation(&self) -> Quat {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let cam_up = right.cross(forward);
        Quat::from_mat3(&Mat3::from_cols(right, cam_up, -forward))
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        let dir = (target - self.eye).normalize();
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-1.4, 1.4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_neg_z() -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.set_look_at(cam.eye + Vec3::NEG_Z);
        cam
    }

    #[test]
    fn test_forward_matches_look_at() {
        let cam = facing_neg_z();
        let f = cam.forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-5, "camera should face -Z, got {f}");
    }

    #[test]
    fn test_level_forward_has_no_vertical_component() {
        let mut cam = Camera::new(800, 600);
        cam.yaw = 0.7;
        cam.pitch = -0.9;
        let f = cam.level_forward();
        assert_eq!(f.y, 0.0);
        assert!((f.length() - 1.0).abs() < 1e-5, "level forward should be unit length");
    }

    #[test]
    fn test_rotation_is_identity_when_facing_neg_z() {
        let cam = facing_neg_z();
        let q = cam.rotation();
        // Local -Z rotated by the camera orientation is the look direction
        let dir = q * Vec3::NEG_Z;
        assert!((dir - cam.forward()).length() < 1e-5);
        assert!(q.angle_between(Quat::IDENTITY) < 1e-4, "facing -Z should be the identity pose");
    }

    #[test]
    fn test_rotation_tracks_forward() {
        let mut cam = Camera::new(800, 600);
        cam.yaw = 1.1;
        cam.pitch = 0.4;
        let dir = cam.rotation() * Vec3::NEG_Z;
        assert!((dir - cam.forward()).length() < 1e-5);
    }
}
