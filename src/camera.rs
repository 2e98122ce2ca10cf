use glam::{Mat4, Vec3};

const FOV_Y_DEGREES: f32 = 40.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Perspective camera with a fixed look-at target. The view matrix is
/// derived from `eye`/`target` on every frame, so a target change takes
/// effect immediately without any extra bookkeeping.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    aspect: f32,
}

impl Camera {
    pub fn new(eye: Vec3) -> Self {
        Self {
            eye,
            target: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::Y,
            aspect: 1.0,
        }
    }

    /// Must be called whenever the viewport changes, before the next frame
    /// is drawn. Zero sizes are rejected upstream by the viewport record,
    /// but guard anyway.
    pub fn update_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    #[allow(dead_code)]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_matches_viewport_exactly() {
        let mut camera = Camera::new(Vec3::new(0.0, 1.0, 2.0));
        camera.update_aspect(1920.0, 1080.0);
        assert_eq!(camera.aspect(), 1920.0 / 1080.0);

        camera.update_aspect(333.0, 777.0);
        assert_eq!(camera.aspect(), 333.0 / 777.0);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut camera = Camera::new(Vec3::new(0.0, 1.0, 2.0));
        camera.update_aspect(800.0, 600.0);
        camera.update_aspect(800.0, 0.0);
        assert_eq!(camera.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn view_tracks_target_mutation() {
        let mut camera = Camera::new(Vec3::new(0.0, 1.0, 2.0));
        let before = camera.view();
        camera.target = Vec3::new(1.0, 1.0, 0.0);
        assert_ne!(before, camera.view());
    }
}
