use glam::Vec3;

use crate::controller::input::InputState;
use crate::model::{Camera, EYE_HEIGHT};

/// Walking speed (units per second)
pub const WALK_SPEED: f32 = 5.0;

/// Sprinting speed (units per second)
pub const SPRINT_SPEED: f32 = 10.0;

/// Mouse sensitivity for look
pub const MOUSE_SENSITIVITY: f32 = 0.002;

/// Hook invoked with the camera position after each movement step. Nothing
/// in this crate consumes it.
pub trait MovementObserver {
    fn on_move(&mut self, position: Vec3);
}

/// Per-frame player movement: reads held flags, displaces the camera along
/// its ground-plane basis, and pins the eye to standing height.
///
/// Deliberately collision-free. The player can walk through walls and off
/// the ground bounds.
pub struct PlayerController {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub mouse_sensitivity: f32,
    observer: Option<Box<dyn MovementObserver>>,
}

impl PlayerController {
    pub fn new() -> Self {
        Self {
            walk_speed: WALK_SPEED,
            sprint_speed: SPRINT_SPEED,
            mouse_sensitivity: MOUSE_SENSITIVITY,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn MovementObserver>) {
        self.observer = Some(observer);
    }

    /// Apply mouse look delta to camera
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        let pi_half = std::f32::consts::PI / 2.0;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-pi_half, pi_half);
    }

    /// Raw movement direction in camera-local axes, each component in
    /// {-1, 0, 1}: -z forward, +x right.
    pub fn raw_direction(input: &InputState) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if input.forward {
            dir.z -= 1.0;
        }
        if input.backward {
            dir.z += 1.0;
        }
        if input.left {
            dir.x -= 1.0;
        }
        if input.right {
            dir.x += 1.0;
        }
        dir
    }

    /// Advance the camera by one frame of movement and return the applied
    /// displacement.
    pub fn update(&mut self, camera: &mut Camera, input: &InputState, dt: f32) -> Vec3 {
        // Normalizing the zero vector stays zero, no special case needed
        let dir = Self::raw_direction(input).normalize_or_zero();

        let forward = camera.level_forward();
        let right = forward.cross(camera.up).normalize_or_zero();

        let speed = if input.sprint { self.sprint_speed } else { self.walk_speed };

        let displacement = forward * (-dir.z * speed * dt) + right * (dir.x * speed * dt);
        camera.eye += displacement;
        camera.eye.y = EYE_HEIGHT;

        if let Some(observer) = self.observer.as_mut() {
            observer.on_move(camera.eye);
        }

        displacement
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn camera_facing_neg_z() -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.set_look_at(cam.eye + Vec3::NEG_Z);
        cam
    }

    fn input_with(keys: &[&str]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.process_event(&InputEvent::KeyDown((*key).into()));
        }
        input
    }

    #[test]
    fn test_raw_direction_components_stay_unit() {
        // All 16 combinations of the four movement flags
        for mask in 0..16u32 {
            let mut keys = Vec::new();
            if mask & 1 != 0 {
                keys.push("w");
            }
            if mask & 2 != 0 {
                keys.push("s");
            }
            if mask & 4 != 0 {
                keys.push("a");
            }
            if mask & 8 != 0 {
                keys.push("d");
            }
            let input = input_with(&keys);

            let raw = PlayerController::raw_direction(&input);
            for c in [raw.x, raw.y, raw.z] {
                assert!(c == -1.0 || c == 0.0 || c == 1.0, "component {c} out of range");
            }

            let n = raw.normalize_or_zero().length();
            assert!(n == 0.0 || (n - 1.0).abs() < 1e-6, "normalized magnitude {n}");
        }
    }

    #[test]
    fn test_no_keys_no_displacement() {
        let mut cam = camera_facing_neg_z();
        let start = cam.eye;
        let input = InputState::new();
        let d = PlayerController::new().update(&mut cam, &input, 0.73);
        assert_eq!(d, Vec3::ZERO);
        assert_eq!(cam.eye, start);
    }

    #[test]
    fn test_opposed_keys_cancel() {
        let mut cam = camera_facing_neg_z();
        let input = input_with(&["w", "s", "a", "d"]);
        let d = PlayerController::new().update(&mut cam, &input, 1.0);
        assert_eq!(d, Vec3::ZERO);
    }

    #[test]
    fn test_sprint_doubles_displacement() {
        let mut walk_cam = camera_facing_neg_z();
        let mut sprint_cam = camera_facing_neg_z();
        let mut controller = PlayerController::new();

        let walking = input_with(&["w"]);
        let sprinting = input_with(&["w", "Shift"]);

        let walk = controller.update(&mut walk_cam, &walking, 0.5);
        let sprint = controller.update(&mut sprint_cam, &sprinting, 0.5);

        assert!((sprint.length() - 2.0 * walk.length()).abs() < 1e-5);
    }

    #[test]
    fn test_eye_height_pinned_every_frame() {
        let mut cam = camera_facing_neg_z();
        cam.eye.y = 9.0;
        cam.pitch = -1.0; // looking down must not drive the eye into the ground
        let input = input_with(&["w"]);
        PlayerController::new().update(&mut cam, &input, 0.016);
        assert_eq!(cam.eye.y, EYE_HEIGHT);
    }

    #[test]
    fn test_forward_right_diagonal_for_one_second() {
        // Camera facing world -Z, speed 5, dt 1 => displacement ≈ (3.54, 0, -3.54)
        let mut cam = camera_facing_neg_z();
        let input = input_with(&["w", "d"]);
        let d = PlayerController::new().update(&mut cam, &input, 1.0);

        let expected = 5.0 * std::f32::consts::FRAC_1_SQRT_2;
        assert!((d.x - expected).abs() < 1e-3, "x: {}", d.x);
        assert!(d.y.abs() < 1e-6);
        assert!((d.z + expected).abs() < 1e-3, "z: {}", d.z);
    }

    #[test]
    fn test_movement_follows_camera_yaw() {
        // Facing +X, forward motion moves along +X
        let mut cam = Camera::new(800, 600);
        cam.yaw = 0.0;
        cam.pitch = 0.0;
        let input = input_with(&["w"]);
        let d = PlayerController::new().update(&mut cam, &input, 1.0);
        assert!((d.x - WALK_SPEED).abs() < 1e-4);
        assert!(d.z.abs() < 1e-4);
    }

    #[test]
    fn test_observer_sees_final_position() {
        struct Recorder(Rc<RefCell<Vec<Vec3>>>);
        impl MovementObserver for Recorder {
            fn on_move(&mut self, position: Vec3) {
                self.0.borrow_mut().push(position);
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut controller = PlayerController::new();
        controller.set_observer(Box::new(Recorder(seen.clone())));

        let mut cam = camera_facing_neg_z();
        let input = input_with(&["w"]);
        controller.update(&mut cam, &input, 0.1);

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0], cam.eye);
    }
}
