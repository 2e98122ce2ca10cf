/// Upper bound for the device pixel ratio forwarded to the renderer. Bounds
/// GPU memory and fill rate on high-density displays.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Shared viewport record. Mutated by the resize handler; every derived
/// value (camera aspect, surface backing size) is recomputed from it.
#[derive(Debug, Clone)]
pub struct Viewport {
    width: f32,
    height: f32,
    pixel_ratio: f64,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            pixel_ratio: 1.0,
        }
    }

    /// Applies a new layout box. Returns `false` (and leaves the record
    /// untouched) when either dimension is zero, so a resize that arrives
    /// before the window is laid out can never produce a degenerate aspect
    /// ratio downstream.
    pub fn update(&mut self, width: f32, height: f32, host_pixel_ratio: f64) -> bool {
        if width <= 0.0 || height <= 0.0 {
            log::warn!(
                "viewport unavailable ({}x{}), keeping previous size",
                width,
                height
            );
            return false;
        }

        self.width = width;
        self.height = height;
        self.pixel_ratio = host_pixel_ratio.min(MAX_PIXEL_RATIO);
        true
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    #[allow(dead_code)]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Backing buffer size in physical pixels, after the pixel ratio clamp.
    pub fn surface_size(&self) -> (u32, u32) {
        let width = (self.width as f64 * self.pixel_ratio).round() as u32;
        let height = (self.height as f64 * self.pixel_ratio).round() as u32;
        (width.max(1), height.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_last_update() {
        let mut viewport = Viewport::new();
        assert!(viewport.update(800.0, 600.0, 1.0));
        assert_eq!(viewport.aspect(), 800.0 / 600.0);

        assert!(viewport.update(1024.0, 1024.0, 1.0));
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        let mut viewport = Viewport::new();
        viewport.update(100.0, 100.0, 3.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.surface_size(), (200, 200));

        viewport.update(100.0, 100.0, 1.0);
        assert_eq!(viewport.pixel_ratio(), 1.0);
        assert_eq!(viewport.surface_size(), (100, 100));

        viewport.update(100.0, 100.0, 1.5);
        assert_eq!(viewport.pixel_ratio(), 1.5);
        assert_eq!(viewport.surface_size(), (150, 150));
    }

    #[test]
    fn zero_size_is_a_no_op() {
        let mut viewport = Viewport::new();
        viewport.update(640.0, 480.0, 2.0);

        assert!(!viewport.update(0.0, 480.0, 2.0));
        assert!(!viewport.update(640.0, 0.0, 2.0));

        assert_eq!(viewport.width(), 640.0);
        assert_eq!(viewport.height(), 480.0);
        assert_eq!(viewport.aspect(), 640.0 / 480.0);
    }
}
