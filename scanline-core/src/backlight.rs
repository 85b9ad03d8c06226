//! Backlight and status LED brightness
//!
//! Perceived brightness is far from linear in PWM duty, so levels given
//! in percent go through a 2.8 gamma curve before reaching the PWM slice.

use scanline_hal::PwmOutput;

/// Gamma exponent applied to percentage brightness levels
pub const GAMMA: f32 = 2.8;

/// Map a 0-100 brightness to a 16-bit PWM duty
///
/// `duty = round(65535 * (brightness / 100) ^ 2.8)`. Values above 100 are
/// treated as 100.
pub fn gamma_correct(brightness: u8) -> u16 {
    let level = f32::from(brightness.min(100)) / 100.0;
    let duty = libm::powf(level, GAMMA) * 65535.0 + 0.5;
    duty as u16
}

/// Screen backlight on a PWM channel
pub struct Backlight<P> {
    pwm: P,
    level: u8,
}

impl<P: PwmOutput> Backlight<P> {
    /// Take the channel and switch the backlight off
    pub fn new(mut pwm: P) -> Self {
        pwm.set_level(0);
        Self { pwm, level: 0 }
    }

    /// Set brightness in percent (clamped to 100)
    pub fn set(&mut self, brightness: u8) {
        self.level = brightness.min(100);
        self.pwm.set_level(gamma_correct(self.level));
    }

    pub fn off(&mut self) {
        self.set(0);
    }

    /// Current brightness in percent
    pub fn level(&self) -> u8 {
        self.level
    }
}

/// RGB user LED, one PWM channel per color
pub struct StatusLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
}

impl<R: PwmOutput, G: PwmOutput, B: PwmOutput> StatusLed<R, G, B> {
    /// Take the channels and switch the LED off
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut led = Self { red, green, blue };
        led.set(0, 0, 0);
        led
    }

    /// Set each channel's brightness in percent
    pub fn set(&mut self, r: u8, g: u8, b: u8) {
        self.red.set_level(gamma_correct(r));
        self.green.set_level(gamma_correct(g));
        self.blue.set_level(gamma_correct(b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct RecordingPwm {
        levels: Vec<u16>,
    }

    impl PwmOutput for RecordingPwm {
        fn set_level(&mut self, duty: u16) {
            self.levels.push(duty);
        }
    }

    #[test]
    fn test_gamma_endpoints() {
        assert_eq!(gamma_correct(0), 0);
        assert_eq!(gamma_correct(100), 65535);
    }

    #[test]
    fn test_gamma_midpoints() {
        // 65535 * 0.5^2.8 = 9409.99
        assert_eq!(gamma_correct(50), 9410);
        // 65535 * 0.75^2.8 = 29284.97
        let v = gamma_correct(75);
        assert!((29_284..=29_286).contains(&v), "got {}", v);
    }

    #[test]
    fn test_gamma_is_monotonic() {
        let mut last = 0;
        for b in 1..=100 {
            let duty = gamma_correct(b);
            assert!(duty >= last);
            last = duty;
        }
    }

    #[test]
    fn test_gamma_clamps_above_100() {
        assert_eq!(gamma_correct(150), 65535);
        assert_eq!(gamma_correct(255), 65535);
    }

    #[test]
    fn test_backlight_starts_off() {
        let mut pwm = RecordingPwm::default();
        let mut backlight = Backlight::new(&mut pwm);
        backlight.set(100);
        assert_eq!(backlight.level(), 100);
        backlight.off();
        drop(backlight);
        assert_eq!(pwm.levels, [0, 65535, 0]);
    }

    #[test]
    fn test_status_led_channels() {
        let (mut r, mut g, mut b) = (
            RecordingPwm::default(),
            RecordingPwm::default(),
            RecordingPwm::default(),
        );
        let mut led = StatusLed::new(&mut r, &mut g, &mut b);
        led.set(100, 0, 50);
        drop(led);
        assert_eq!(r.levels, [0, 65535]);
        assert_eq!(g.levels, [0, 0]);
        assert_eq!(b.levels, [0, gamma_correct(50)]);
    }
}
