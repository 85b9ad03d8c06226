//! PWM duty channels
//!
//! Slices are configured to wrap at 65535 so the gamma-corrected 16-bit
//! levels map straight onto compare values.

use embassy_rp::pwm::Config;
use embedded_hal::pwm::SetDutyCycle;
use scanline_hal::pwm::PWM_WRAP;
use scanline_hal::PwmOutput;

/// Slice configuration shared by the backlight and LED channels
pub fn full_scale_config() -> Config {
    let mut config = Config::default();
    config.top = PWM_WRAP;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// A single PWM output, e.g. one half of a split `Pwm` slice
pub struct DutyChannel<P>(P);

impl<P: SetDutyCycle> DutyChannel<P> {
    pub fn new(channel: P) -> Self {
        Self(channel)
    }
}

impl<P: SetDutyCycle> PwmOutput for DutyChannel<P> {
    fn set_level(&mut self, duty: u16) {
        // Only fails for duty above the slice top, which is u16::MAX
        let _ = self.0.set_duty_cycle(duty);
    }
}
