//! GPIO lines and the button bank
//!
//! Thin wrappers that put embassy-rp's `Input`/`Output` behind the
//! `scanline-hal` pin traits.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;
use scanline_core::input::Button;
use scanline_hal::{InputPin, InputPort, OutputPin};

/// Push-pull output line
pub struct OutputLine<'d>(Output<'d>);

impl<'d> OutputLine<'d> {
    pub fn new(pin: Peri<'d, impl Pin>, initial: Level) -> Self {
        Self(Output::new(pin, initial))
    }
}

impl OutputPin for OutputLine<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Input line
pub struct InputLine<'d>(Input<'d>);

impl<'d> InputLine<'d> {
    pub fn new(pin: Peri<'d, impl Pin>, pull: Pull) -> Self {
        Self(Input::new(pin, pull))
    }

    /// Underlying embassy input, for async edge waits
    pub fn inner_mut(&mut self) -> &mut Input<'d> {
        &mut self.0
    }
}

impl InputPin for InputLine<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// The eight face and d-pad buttons, read as one bank
///
/// Buttons short to ground, so each line is pulled up. Bits of lines that
/// are not part of the bank read 0.
pub struct ButtonBank<'d> {
    lines: [(u8, Input<'d>); 8],
}

impl<'d> ButtonBank<'d> {
    pub fn new(pins: [(Button, Peri<'d, AnyPin>); 8]) -> Self {
        Self {
            lines: pins.map(|(button, pin)| (button.bit(), Input::new(pin, Pull::Up))),
        }
    }
}

impl InputPort for ButtonBank<'_> {
    fn read_inputs(&mut self) -> u32 {
        self.lines
            .iter()
            .filter(|(_, line)| line.is_high())
            .fold(0u32, |mask, (bit, _)| mask | 1 << *bit)
    }
}
