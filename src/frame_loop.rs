use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared cancellation flag for the frame loop. Cloned tokens observe the
/// same flag.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Explicit per-frame scheduler. The host event loop calls `begin_tick`
/// once per redraw; a cancelled loop yields no further ticks, which gives a
/// deterministic shutdown point and lets tests single-step frames.
#[derive(Debug)]
pub struct FrameLoop {
    token: CancelToken,
    last_tick: Instant,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            last_tick: Instant::now(),
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[allow(dead_code)]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Starts one tick. Returns the delta time since the previous tick in
    /// seconds, or `None` once the loop has been cancelled.
    pub fn begin_tick(&mut self) -> Option<f32> {
        if self.token.is_cancelled() {
            return None;
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        Some(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_until_cancelled() {
        let mut frame_loop = FrameLoop::new();
        assert!(frame_loop.begin_tick().is_some());
        assert!(frame_loop.begin_tick().is_some());

        frame_loop.cancel();
        assert!(frame_loop.begin_tick().is_none());
        assert!(frame_loop.begin_tick().is_none());
    }

    #[test]
    fn cloned_token_cancels_the_loop() {
        let mut frame_loop = FrameLoop::new();
        let token = frame_loop.token();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(frame_loop.is_cancelled());
        assert!(frame_loop.begin_tick().is_none());
    }

    #[test]
    fn delta_time_is_non_negative() {
        let mut frame_loop = FrameLoop::new();
        let dt = frame_loop.begin_tick().unwrap();
        assert!(dt >= 0.0);
    }
}
