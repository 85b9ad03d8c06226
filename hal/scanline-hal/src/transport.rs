//! Asynchronous burst transport
//!
//! A burst is one non-blocking transfer of a contiguous run of frame
//! pixels to the panel. The transport is bound to a single frame buffer
//! when it is constructed, so a burst only names a pixel range inside it.
//!
//! Exactly one burst may be outstanding. When it finishes, the transport's
//! completion context hands control back to the flip engine, which
//! decides whether another burst follows.

use core::ops::Range;

/// A contiguous run of pixels within the bound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Burst {
    /// Index of the first pixel
    pub offset: usize,
    /// Number of 16-bit pixels
    pub len: usize,
}

impl Burst {
    /// Create a burst covering `len` pixels starting at `offset`
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Number of 32-bit memory words the pixels span (two pixels per word)
    pub const fn words(&self) -> usize {
        self.len.div_ceil(2)
    }

    /// Pixel index range covered by this burst
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Byte offset of the first pixel from the frame base address
    pub const fn byte_offset(&self) -> usize {
        self.offset * 2
    }
}

/// Non-blocking pixel transport
pub trait BurstTransport {
    /// Start transmitting `burst` and return immediately
    ///
    /// Callers guarantee no other burst is in flight.
    fn transfer(&mut self, burst: Burst);
}

impl<T: BurstTransport + ?Sized> BurstTransport for &mut T {
    fn transfer(&mut self, burst: Burst) {
        (**self).transfer(burst)
    }
}
