//! Button sampling and edge detection
//!
//! The buttons are pulled up and short to ground when held, so a line
//! reads 0 while its button is down. The sampler keeps the current and
//! previous raw bank reads; edges are derived from the pair.
//!
//! Edges are relative to the previous sample, so [`InputSampler::sample`]
//! must run exactly once per main-loop iteration. Sampling twice in one
//! iteration erases the edge before the application sees it.

use heapless::Vec;
use scanline_hal::InputPort;

/// GPIO-numbered PicoSystem buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
    ];

    /// GPIO line the button is wired to
    pub const fn bit(self) -> u8 {
        match self {
            Button::Up => 23,
            Button::Down => 20,
            Button::Left => 22,
            Button::Right => 21,
            Button::A => 18,
            Button::B => 19,
            Button::X => 17,
            Button::Y => 16,
        }
    }

    pub const fn mask(self) -> u32 {
        1 << self.bit()
    }
}

/// Mask of every button line
pub const BUTTON_MASK: u32 = {
    let mut mask = 0;
    let mut i = 0;
    while i < Button::ALL.len() {
        mask |= Button::ALL[i].mask();
        i += 1;
    }
    mask
};

/// Edge on a button between two samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Pressed(Button),
    Released(Button),
}

/// Current and previous raw bank reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    pub current: u32,
    pub previous: u32,
}

impl InputSnapshot {
    /// Line went low since the previous sample
    pub fn pressed(&self, bit: u8) -> bool {
        let mask = line_mask(bit);
        self.current & mask == 0 && self.previous & mask != 0
    }

    /// Line went high since the previous sample
    pub fn released(&self, bit: u8) -> bool {
        let mask = line_mask(bit);
        self.current & mask != 0 && self.previous & mask == 0
    }

    /// Line is low now
    pub fn held(&self, bit: u8) -> bool {
        let mask = line_mask(bit);
        mask != 0 && self.current & mask == 0
    }
}

/// Bits outside the 32-line bank never match
fn line_mask(bit: u8) -> u32 {
    1u32.checked_shl(bit as u32).unwrap_or(0)
}

/// Once-per-iteration input sampler
///
/// Starts with both samples zero.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    snapshot: InputSnapshot,
}

impl InputSampler {
    pub const fn new() -> Self {
        Self {
            snapshot: InputSnapshot {
                current: 0,
                previous: 0,
            },
        }
    }

    /// Read the bank once and shift the previous sample out
    pub fn sample<P: InputPort>(&mut self, port: &mut P) -> InputSnapshot {
        let raw = port.read_inputs();
        self.update(raw)
    }

    /// Feed an already-read raw mask
    pub fn update(&mut self, raw: u32) -> InputSnapshot {
        self.snapshot.previous = self.snapshot.current;
        self.snapshot.current = raw;
        self.snapshot
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.snapshot
    }

    pub fn pressed(&self, bit: u8) -> bool {
        self.snapshot.pressed(bit)
    }

    pub fn released(&self, bit: u8) -> bool {
        self.snapshot.released(bit)
    }

    pub fn held(&self, bit: u8) -> bool {
        self.snapshot.held(bit)
    }

    pub fn button_pressed(&self, button: Button) -> bool {
        self.pressed(button.bit())
    }

    pub fn button_released(&self, button: Button) -> bool {
        self.released(button.bit())
    }

    pub fn button_held(&self, button: Button) -> bool {
        self.held(button.bit())
    }

    /// Every button edge of the latest sample, in [`Button::ALL`] order
    pub fn events(&self) -> Vec<ButtonEvent, 8> {
        let mut events = Vec::new();
        for button in Button::ALL {
            let event = if self.button_pressed(button) {
                ButtonEvent::Pressed(button)
            } else if self.button_released(button) {
                ButtonEvent::Released(button)
            } else {
                continue;
            };
            // At most one edge per button, so this cannot overflow
            let _ = events.push(event);
        }
        events
    }
}
