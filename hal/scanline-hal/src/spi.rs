//! Panel command link
//!
//! The ST7789 on the PicoSystem has no MISO line, so the link only ever
//! writes. Pixel data does not go through here; see [`crate::transport`].

/// Write-only SPI master
pub trait SpiBus {
    type Error;

    /// Clock `data` out and return once the last bit has left the shifter
    ///
    /// Callers toggle chip-select and data/command lines around this, so
    /// returning while bytes are still queued would corrupt the framing.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(data)
    }
}
