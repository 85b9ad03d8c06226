//! 16-bit RGBA color codec
//!
//! Each channel keeps 4 bits. The packed nibble layout, from the most
//! significant end, is:
//!
//! ```text
//!  15    12 11     8 7      4 3      0
//! ┌────────┬────────┬────────┬────────┐
//! │ green  │  blue  │ alpha  │  red   │
//! └────────┴────────┴────────┴────────┘
//! ```
//!
//! The screen transport byte-swaps every pixel on its way out, which turns
//! this into `alpha red green blue` on the wire. The PIO program drops the
//! alpha nibble and shifts the remaining 12 bits to the panel.

/// Raw packed pixel as stored in a [`crate::PixelBuffer`]
pub type Pixel = u16;

const CHANNEL_MASK: u8 = 0x0F;

const RED_SHIFT: u16 = 0;
const ALPHA_SHIFT: u16 = 4;
const BLUE_SHIFT: u16 = 8;
const GREEN_SHIFT: u16 = 12;

/// Pack four channels into a pixel
///
/// Only the low 4 bits of every channel are kept; larger values are
/// truncated, not rejected.
pub const fn pack(r: u8, g: u8, b: u8, a: u8) -> Pixel {
    ((r & CHANNEL_MASK) as u16) << RED_SHIFT
        | ((a & CHANNEL_MASK) as u16) << ALPHA_SHIFT
        | ((b & CHANNEL_MASK) as u16) << BLUE_SHIFT
        | ((g & CHANNEL_MASK) as u16) << GREEN_SHIFT
}

/// A packed 4-bit-per-channel RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(Pixel);

impl Color {
    /// Fully transparent black (all bits zero)
    pub const BLACK: Self = Self(0);

    /// Opaque white
    pub const WHITE: Self = Self::rgba(15, 15, 15, 15);

    /// Pack a color from 4-bit channels (see [`pack`])
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(pack(r, g, b, a))
    }

    /// Opaque color from 4-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 15)
    }

    /// Wrap an already packed pixel value
    pub const fn from_raw(raw: Pixel) -> Self {
        Self(raw)
    }

    /// Packed pixel value
    pub const fn raw(self) -> Pixel {
        self.0
    }

    pub const fn red(self) -> u8 {
        self.channel(RED_SHIFT)
    }

    pub const fn green(self) -> u8 {
        self.channel(GREEN_SHIFT)
    }

    pub const fn blue(self) -> u8 {
        self.channel(BLUE_SHIFT)
    }

    pub const fn alpha(self) -> u8 {
        self.channel(ALPHA_SHIFT)
    }

    const fn channel(self, shift: u16) -> u8 {
        ((self.0 >> shift) as u8) & CHANNEL_MASK
    }
}

impl From<Color> for Pixel {
    fn from(color: Color) -> Self {
        color.raw()
    }
}

impl From<Pixel> for Color {
    fn from(raw: Pixel) -> Self {
        Self::from_raw(raw)
    }
}
