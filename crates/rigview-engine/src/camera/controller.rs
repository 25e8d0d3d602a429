use glam::{Mat3, Mat4, Vec3};

use super::projection::Perspective;
use crate::input::{InputSnapshot, Key, MouseButton};

/// Requested pointer behavior, applied to the window by the runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CursorMode {
    #[default]
    Normal,
    Locked,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub projection: Perspective,
    pub eye: Vec3,
    /// World units per second.
    pub move_speed: f32,
    /// Mouse sensitivity in `[0, 1]`; shaped into a cubic response curve.
    pub sensitivity: f64,
    /// Held to enter look mode.
    pub look_button: MouseButton,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: Perspective::default(),
            eye: Vec3::new(0.0, 1.5, -2.0),
            move_speed: 5.0,
            sensitivity: 0.5,
            look_button: MouseButton::Left,
        }
    }
}

/// Degrees of rotation per unit of pointer motion per second, before `dt`.
const LOOK_RATE: f64 = 9.0;

/// Pitch limit in degrees.
pub const PITCH_LIMIT: f32 = 90.0;

/// Cubic response curve over `sensitivity`; 0.5 gives exactly 1.0.
pub fn look_factor(sensitivity: f64) -> f64 {
    let s = sensitivity * 0.6 + 0.2;
    s * s * s * 8.0
}

/// Free-look camera: yaw/pitch in degrees plus an eye position.
///
/// Nothing is cached; every matrix is recomputed from the three fields.
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    yaw: f32,
    pitch: f32,
    eye: Vec3,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let eye = config.eye;
        Self { config, yaw: 0.0, pitch: 0.0, eye }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Applies one tick of input and returns the pointer mode to use.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) -> CursorMode {
        let mode = if input.button_down(self.config.look_button) {
            let (dx, dy) = input.look_delta();
            if dx != 0.0 || dy != 0.0 {
                let k = look_factor(self.config.sensitivity) * dt as f64 * LOOK_RATE;
                self.yaw = (self.yaw as f64 - dx as f64 * k) as f32;
                let pitch = self.pitch as f64 - dy as f64 * k;
                self.pitch = pitch.clamp(-PITCH_LIMIT as f64, PITCH_LIMIT as f64) as f32;
            }
            CursorMode::Locked
        } else {
            CursorMode::Normal
        };

        let step = self.config.move_speed * dt;
        let (forward, right) = (self.forward(), self.right());
        if input.key_down(Key::W) {
            self.eye += forward * step;
        }
        if input.key_down(Key::S) {
            self.eye -= forward * step;
        }
        if input.key_down(Key::A) {
            self.eye -= right * step;
        }
        if input.key_down(Key::D) {
            self.eye += right * step;
        }

        mode
    }

    /// World-to-view rotation from yaw and pitch; no roll.
    pub fn rotation(&self) -> Mat4 {
        let (s, c) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        Mat4::from_cols(
            glam::Vec4::new(c, sp * s, -cp * s, 0.0),
            glam::Vec4::new(0.0, cp, sp, 0.0),
            glam::Vec4::new(s, -sp * c, cp * c, 0.0),
            glam::Vec4::W,
        )
    }

    /// View-space +Z expressed in world space.
    pub fn forward(&self) -> Vec3 {
        Mat3::from_mat4(self.rotation()).transpose() * Vec3::Z
    }

    /// View-space +X expressed in world space.
    pub fn right(&self) -> Vec3 {
        Mat3::from_mat4(self.rotation()).transpose() * Vec3::X
    }

    pub fn view(&self) -> Mat4 {
        self.rotation() * Mat4::from_translation(-self.eye)
    }

    /// `projection * rotation * translate(-eye)`, recomputed on every call.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.config.projection.matrix(aspect) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking() -> InputSnapshot {
        InputSnapshot::default().with_button(MouseButton::Left)
    }

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn default_sensitivity_is_unit_curve() {
        assert!((look_factor(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn starts_at_reference_eye_looking_down_z() {
        let cam = CameraController::new(CameraConfig::default());
        assert_eq!(cam.eye(), Vec3::new(0.0, 1.5, -2.0));
        assert_vec_eq(cam.forward(), Vec3::Z);
        assert_vec_eq(cam.right(), Vec3::X);
    }

    #[test]
    fn pitch_clamps_exactly_at_limits() {
        let mut cam = CameraController::new(CameraConfig::default());
        let up = looking().with_motion(0.0, -40.0);
        for _ in 0..10 {
            cam.update(&up, 0.1);
            assert!(cam.pitch() <= PITCH_LIMIT);
        }
        assert_eq!(cam.pitch(), 90.0);

        let down = looking().with_motion(0.0, 40.0);
        for _ in 0..20 {
            cam.update(&down, 0.1);
            assert!(cam.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(cam.pitch(), -90.0);
    }

    #[test]
    fn yaw_follows_pointer_scaled_by_dt() {
        let mut cam = CameraController::new(CameraConfig::default());
        let mode = cam.update(&looking().with_motion(10.0, 0.0), 0.5);
        assert_eq!(mode, CursorMode::Locked);
        assert!((cam.yaw() - -45.0).abs() < 1e-4);
    }

    #[test]
    fn motion_ignored_without_look_button() {
        let mut cam = CameraController::new(CameraConfig::default());
        let mode = cam.update(&InputSnapshot::default().with_motion(10.0, 10.0), 0.5);
        assert_eq!(mode, CursorMode::Normal);
        assert_eq!((cam.yaw(), cam.pitch()), (0.0, 0.0));
    }

    #[test]
    fn wasd_moves_along_local_axes() {
        let mut cam = CameraController::new(CameraConfig::default());
        cam.update(&InputSnapshot::default().with_key(Key::W), 0.2);
        assert_vec_eq(cam.eye(), Vec3::new(0.0, 1.5, -1.0));
        cam.update(&InputSnapshot::default().with_key(Key::D), 0.2);
        assert_vec_eq(cam.eye(), Vec3::new(1.0, 1.5, -1.0));

        // After turning 90 degrees, forward follows the yaw.
        cam.update(&looking().with_motion(-10.0, 0.0), 1.0);
        assert!((cam.yaw() - 90.0).abs() < 1e-4);
        assert_vec_eq(cam.forward(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn view_maps_eye_to_origin_and_forward_to_z() {
        let mut cam = CameraController::new(CameraConfig::default());
        cam.update(&looking().with_motion(3.0, -2.0), 0.1);
        let view = cam.view();
        assert_vec_eq(view.transform_point3(cam.eye()), Vec3::ZERO);
        assert_vec_eq(view.transform_point3(cam.eye() + cam.forward()), Vec3::Z);
    }

    #[test]
    fn model_in_front_projects_inside_clip_volume() {
        let cam = CameraController::new(CameraConfig::default());
        let clip = cam.view_projection(16.0 / 9.0) * glam::Vec4::new(0.0, 1.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z));
    }
}
