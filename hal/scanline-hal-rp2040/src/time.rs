//! Clock backed by the embassy time driver

use embassy_time::{block_for, Duration, Instant};
use scanline_hal::Clock;

/// Monotonic clock; counters wrap like their 32-bit C counterparts
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }

    fn sleep_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}
