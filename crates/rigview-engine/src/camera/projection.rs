use glam::Mat4;

/// Perspective projection parameters. Depth maps to `[0, 1]`, left-handed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Perspective {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self { fov_y_degrees: 60.0, near: 0.1, far: 1000.0 }
    }
}

impl Perspective {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Width over height, with degenerate sizes mapped to 1.0.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    width as f32 / height as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn near_and_far_map_to_depth_range() {
        let p = Perspective::default().matrix(16.0 / 9.0);

        let near = p * Vec4::new(0.0, 0.0, 0.1, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);

        let far = p * Vec4::new(0.0, 0.0, 1000.0, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_sized_window_has_unit_aspect() {
        assert_eq!(aspect_ratio(0, 720), 1.0);
        assert_eq!(aspect_ratio(1280, 640), 2.0);
    }
}
