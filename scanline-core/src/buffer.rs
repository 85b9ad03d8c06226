//! Pixel buffers
//!
//! A buffer has fixed dimensions and either owns its storage or borrows a
//! caller-supplied slice (typically the static screen buffer). The two
//! cases are distinct variants of [`Storage`], so a borrowed view can never
//! be mistaken for something the buffer must free.

use alloc::vec;
use alloc::vec::Vec;

use scanline_hal::Burst;

use crate::color::{Color, Pixel};

/// Screen width when pixel doubling is enabled
pub const DOUBLED_WIDTH: u16 = 120;
/// Screen height when pixel doubling is enabled
pub const DOUBLED_HEIGHT: u16 = 120;
/// Native panel width
pub const NATIVE_WIDTH: u16 = 240;
/// Native panel height
pub const NATIVE_HEIGHT: u16 = 240;

/// Buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Width or height is zero
    ZeroSized,
    /// Borrowed storage holds fewer than `width * height` pixels
    StorageTooSmall,
    /// Coordinate outside `0..width` x `0..height`
    OutOfBounds,
    /// Buffer dimensions differ from the screen the flip engine sends
    DimensionMismatch,
}

/// Backing storage of a pixel buffer
#[derive(Debug)]
pub enum Storage<'a> {
    /// Heap storage released when the buffer is dropped
    Owned(Vec<Pixel>),
    /// Caller-supplied storage, never released by the buffer
    Borrowed(&'a mut [Pixel]),
}

/// Which kind of storage a buffer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ownership {
    Owned,
    Borrowed,
}

/// Fixed-size 2D pixel buffer, row-major
#[derive(Debug)]
pub struct PixelBuffer<'a> {
    width: u16,
    height: u16,
    storage: Storage<'a>,
}

impl<'a> PixelBuffer<'a> {
    /// Create a buffer
    ///
    /// With `storage`, the buffer becomes a view over the first
    /// `width * height` pixels of it. Without, it allocates and owns that
    /// many pixels, zeroed. Allocation failure aborts through the global
    /// allocator's error handler; there is no recovery.
    pub fn allocate(
        width: u16,
        height: u16,
        storage: Option<&'a mut [Pixel]>,
    ) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroSized);
        }
        let len = width as usize * height as usize;

        let storage = match storage {
            Some(data) => {
                let data = data.get_mut(..len).ok_or(BufferError::StorageTooSmall)?;
                Storage::Borrowed(data)
            }
            None => Storage::Owned(vec![0; len]),
        };

        Ok(Self {
            width,
            height,
            storage,
        })
    }

    /// Create an owned, zeroed buffer
    pub fn owned(width: u16, height: u16) -> Result<PixelBuffer<'static>, BufferError> {
        PixelBuffer::allocate(width, height, None)
    }

    /// Create a view over caller-supplied storage
    pub fn borrowed(width: u16, height: u16, data: &'a mut [Pixel]) -> Result<Self, BufferError> {
        Self::allocate(width, height, Some(data))
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Always false; zero-sized buffers cannot be created
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ownership(&self) -> Ownership {
        match self.storage {
            Storage::Owned(_) => Ownership::Owned,
            Storage::Borrowed(_) => Ownership::Borrowed,
        }
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[Pixel] {
        match &self.storage {
            Storage::Owned(data) => data,
            Storage::Borrowed(data) => data,
        }
    }

    /// All pixels, row-major, mutable
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        match &mut self.storage {
            Storage::Owned(data) => data,
            Storage::Borrowed(data) => data,
        }
    }

    /// Base address of the pixel storage, for binding a DMA transport
    pub fn as_ptr(&self) -> *const Pixel {
        self.pixels().as_ptr()
    }

    /// Overwrite every pixel with `color`
    pub fn clear(&mut self, color: Color) {
        self.pixels_mut().fill(color.raw());
    }

    /// Write one pixel
    ///
    /// Out-of-range coordinates are rejected and leave the buffer untouched.
    pub fn write_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), BufferError> {
        let index = self.index(x, y).ok_or(BufferError::OutOfBounds)?;
        self.pixels_mut()[index] = color.raw();
        Ok(())
    }

    /// Read one pixel, `None` when out of range
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        self.index(x, y).map(|i| self.pixels()[i])
    }

    /// Check whether a coordinate lies inside the buffer
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// One scanline
    pub fn row(&self, y: u16) -> Option<&[Pixel]> {
        if y >= self.height {
            return None;
        }
        let w = self.width as usize;
        let start = y as usize * w;
        Some(&self.pixels()[start..start + w])
    }

    /// Pixels covered by a burst, `None` if it reaches past the buffer
    pub fn burst_pixels(&self, burst: &Burst) -> Option<&[Pixel]> {
        self.pixels().get(burst.range())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let w = self.width as usize;
        if x >= w || y >= self.height as usize {
            return None;
        }
        Some(x + y * w)
    }
}
