//! Blocking SPI adapter

use embedded_hal::spi::SpiBus as HalSpiBus;
use scanline_hal::SpiBus;

/// Adapts any `embedded-hal` SPI bus, e.g. a blocking `embassy_rp::spi::Spi`
pub struct BlockingSpi<B>(B);

impl<B: HalSpiBus> BlockingSpi<B> {
    pub fn new(bus: B) -> Self {
        Self(bus)
    }

    pub fn release(self) -> B {
        self.0
    }
}

impl<B: HalSpiBus> SpiBus for BlockingSpi<B> {
    type Error = B::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(data)?;
        // chip-select is released right after this returns
        self.0.flush()
    }
}
