use crate::scene_graph::ObjectId;

/// Quadratic ease-in-out over a normalized 0..1 input.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u / 2.0
    }
}

/// One-dimensional tween with a normalized duration of 1.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
}

impl Tween {
    pub fn value_at(&self, t: f32) -> f32 {
        self.from + (self.to - self.from) * ease_in_out(t)
    }
}

/// Timeline scrubbed by page scroll. Raw scroll progress is smoothed with a
/// time constant (`scrub`, in seconds) so playback lags the scroll position
/// slightly instead of snapping; a scrub of zero tracks scroll exactly.
///
/// Built once after all assets have loaded, and only when the user has not
/// requested reduced motion. Never rebuilt.
#[derive(Debug)]
pub struct ScrollTimeline {
    pub target: ObjectId,
    tween: Tween,
    scrub: f32,
    progress: f32,
}

impl ScrollTimeline {
    pub fn new(target: ObjectId, from: f32, to: f32, scrub: f32) -> Self {
        Self {
            target,
            tween: Tween { from, to },
            scrub: scrub.max(0.0),
            progress: 0.0,
        }
    }

    /// Advances smoothed playback toward `scroll_progress` by `dt` seconds
    /// and returns the tweened value at the new playback position.
    pub fn advance(&mut self, scroll_progress: f32, dt: f32) -> f32 {
        let scroll_progress = scroll_progress.clamp(0.0, 1.0);

        if self.scrub <= f32::EPSILON {
            self.progress = scroll_progress;
        } else {
            // Exponential approach, frame-rate independent.
            let alpha = 1.0 - (-dt / self.scrub).exp();
            self.progress += (scroll_progress - self.progress) * alpha;
        }

        self.tween.value_at(self.progress)
    }

    #[allow(dead_code)]
    pub fn progress(&self) -> f32 {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id_arena::Arena;

    use crate::scene_graph::Object3D;

    fn dummy_target() -> ObjectId {
        let mut arena: Arena<Object3D> = Arena::new();
        arena.alloc(Object3D::group("bear"))
    }

    #[test]
    fn ease_hits_endpoints_exactly() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        // Out-of-range input clamps rather than extrapolating.
        assert_eq!(ease_in_out(-1.0), 0.0);
        assert_eq!(ease_in_out(2.0), 1.0);
    }

    #[test]
    fn ease_is_monotonic() {
        let mut previous = 0.0;
        for step in 1..=100 {
            let value = ease_in_out(step as f32 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn unscrubbed_timeline_tracks_scroll_exactly() {
        let mut timeline = ScrollTimeline::new(dummy_target(), 5.0, 1.0, 0.0);
        assert_eq!(timeline.advance(0.0, 1.0 / 60.0), 5.0);
        assert_eq!(timeline.advance(1.0, 1.0 / 60.0), 1.0);
        assert_eq!(timeline.advance(0.0, 1.0 / 60.0), 5.0);
    }

    #[test]
    fn scrubbed_timeline_lags_then_converges() {
        let mut timeline = ScrollTimeline::new(dummy_target(), 5.0, 1.0, 0.3);

        let first = timeline.advance(1.0, 1.0 / 60.0);
        assert!(first > 1.0 && first < 5.0, "should lag the jump: {first}");
        assert!(timeline.progress() < 1.0);

        // A few seconds of frames later it has converged.
        for _ in 0..600 {
            timeline.advance(1.0, 1.0 / 60.0);
        }
        assert!((timeline.progress() - 1.0).abs() < 1e-3);
        assert!((timeline.advance(1.0, 1.0 / 60.0) - 1.0).abs() < 1e-2);
    }
}
