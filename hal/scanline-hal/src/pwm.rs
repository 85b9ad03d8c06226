//! PWM output abstraction
//!
//! LEDs and the backlight are driven by PWM slices configured with a
//! wrap value of 65535, so a duty cycle is a plain 16-bit level.

/// Full-scale PWM counter wrap value
pub const PWM_WRAP: u16 = u16::MAX;

/// A single PWM output channel
pub trait PwmOutput {
    /// Set the output level (0 = always low, [`PWM_WRAP`] = always high)
    fn set_level(&mut self, duty: u16);
}

impl<T: PwmOutput + ?Sized> PwmOutput for &mut T {
    fn set_level(&mut self, duty: u16) {
        (**self).set_level(duty)
    }
}
