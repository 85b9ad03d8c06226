//! Bouncing-line demo state
//!
//! A line from `(x, 0)` to `(W - x - 1, H - 1)` whose top end sweeps back
//! and forth across the screen, one pixel per frame.

/// Frames averaged per timing report
pub const REPORT_INTERVAL: u32 = 8;

/// Horizontal sweep position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounce {
    x: i32,
    velocity: i32,
    width: i32,
}

impl Bounce {
    pub fn new(width: u16) -> Self {
        Self {
            x: 0,
            velocity: 1,
            width: i32::from(width),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    /// Endpoints of this frame's line on a screen `height` rows tall
    pub fn line(&self, height: u16) -> (i32, i32, i32, i32) {
        (self.x, 0, self.width - self.x - 1, i32::from(height) - 1)
    }

    /// Step one pixel, reversing at either edge
    pub fn advance(&mut self) {
        self.x += self.velocity;
        if self.x >= self.width || self.x <= 0 {
            self.velocity = -self.velocity;
            self.x += self.velocity;
        }
    }
}

/// Accumulates per-frame loop time and reports the average
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTimer {
    total_us: u32,
    frames: u32,
}

impl FrameTimer {
    pub const fn new() -> Self {
        Self {
            total_us: 0,
            frames: 0,
        }
    }

    /// Record one frame; every [`REPORT_INTERVAL`] frames returns the
    /// average and starts over
    pub fn record(&mut self, elapsed_us: u32) -> Option<u32> {
        self.total_us = self.total_us.wrapping_add(elapsed_us);
        self.frames += 1;
        if self.frames < REPORT_INTERVAL {
            return None;
        }
        let average = self.total_us / REPORT_INTERVAL;
        *self = Self::new();
        Some(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounce_stays_on_screen() {
        let mut bounce = Bounce::new(120);
        for _ in 0..1000 {
            let (x1, _, x2, y2) = bounce.line(120);
            assert!((0..120).contains(&x1));
            assert!((0..120).contains(&x2));
            assert_eq!(y2, 119);
            bounce.advance();
        }
    }

    #[test]
    fn test_bounce_reverses_at_edges() {
        let mut bounce = Bounce::new(4);
        let mut xs = [0; 8];
        for x in xs.iter_mut() {
            *x = bounce.x();
            bounce.advance();
        }
        // A step past either edge is undone, so the turning column repeats
        assert_eq!(xs, [0, 1, 2, 3, 3, 2, 1, 1]);
    }

    #[test]
    fn test_frame_timer_averages_every_interval() {
        let mut timer = FrameTimer::new();
        for _ in 0..REPORT_INTERVAL - 1 {
            assert_eq!(timer.record(100), None);
        }
        assert_eq!(timer.record(900), Some(200));
        assert_eq!(timer.record(50), None);
    }
}
