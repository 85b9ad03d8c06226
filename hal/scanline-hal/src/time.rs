//! Monotonic clock abstraction

/// Monotonic time source with a blocking sleep
///
/// Counters start at boot and wrap on overflow.
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u32;

    /// Microseconds since boot
    fn now_us(&self) -> u32;

    /// Block the caller for at least `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u32 {
        (**self).now_us()
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}
