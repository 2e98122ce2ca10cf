/// Pixels of scroll per wheel "line" tick.
const LINE_HEIGHT: f32 = 40.0;

/// Virtual page scroll position. Wheel and trackpad deltas accumulate into
/// an offset clamped to the page's scroll range; `progress` normalizes the
/// offset over that range for the animation timeline.
#[derive(Debug, Clone)]
pub struct ScrollState {
    offset: f32,
    max_offset: f32,
}

impl ScrollState {
    pub fn new(page_scroll_range: f32) -> Self {
        Self {
            offset: 0.0,
            max_offset: page_scroll_range.max(0.0),
        }
    }

    pub fn apply_line_delta(&mut self, lines: f32) {
        self.apply_pixel_delta(lines * LINE_HEIGHT);
    }

    pub fn apply_pixel_delta(&mut self, pixels: f32) {
        // Wheel deltas are positive when scrolling up; page offset grows
        // downward.
        self.set_offset(self.offset - pixels);
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset.clamp(0.0, self.max_offset);
    }

    #[allow(dead_code)]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn max_offset(&self) -> f32 {
        self.max_offset
    }

    /// Normalized position within the scroll range: 0 at the top of the
    /// page, 1 at the bottom.
    pub fn progress(&self) -> f32 {
        if self.max_offset <= 0.0 {
            0.0
        } else {
            self.offset / self.max_offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_clamped_to_range() {
        let mut scroll = ScrollState::new(1000.0);
        scroll.apply_pixel_delta(-250.0);
        assert_eq!(scroll.offset(), 250.0);

        scroll.apply_pixel_delta(-5000.0);
        assert_eq!(scroll.offset(), 1000.0);

        scroll.apply_pixel_delta(9999.0);
        assert_eq!(scroll.offset(), 0.0);
    }

    #[test]
    fn progress_spans_zero_to_one() {
        let mut scroll = ScrollState::new(2000.0);
        assert_eq!(scroll.progress(), 0.0);

        scroll.set_offset(500.0);
        assert_eq!(scroll.progress(), 0.25);

        scroll.set_offset(2000.0);
        assert_eq!(scroll.progress(), 1.0);
    }

    #[test]
    fn empty_range_never_divides_by_zero() {
        let mut scroll = ScrollState::new(0.0);
        scroll.apply_line_delta(-3.0);
        assert_eq!(scroll.progress(), 0.0);
    }
}
