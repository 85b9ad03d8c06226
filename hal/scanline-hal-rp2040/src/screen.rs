//! PIO + DMA screen stream
//!
//! Pixels leave the frame buffer through one DMA channel into a PIO state
//! machine that bit-bangs the ST7789's write-only SPI-like interface: data
//! on MOSI, clock on the side-set pin.
//!
//! # Wire format
//!
//! DMA moves 16-bit pixels with byte swapping enabled. A halfword write to
//! the 32-bit TX FIFO is replicated into both halves, so every FIFO word
//! holds the same pixel twice:
//!
//! ```text
//! memory halfword   g g g g b b b b a a a a r r r r
//! after bswap       a a a a r r r r g g g g b b b b
//! FIFO word         [ a r g b | a r g b ]
//! ```
//!
//! The programs shift left, drop the alpha nibble and clock out the 12
//! color bits. The doubling program emits both copies, which is the
//! horizontal half of pixel doubling; the native program emits one.
//!
//! # Completion
//!
//! [`ScreenStream::run`] is the completion context. It waits for a burst
//! on the [`BurstQueue`], awaits the DMA transfer (woken by the DMA
//! interrupt) and reports back to the flip engine, which may queue the
//! next burst.

use embassy_rp::dma::Channel;
use embassy_rp::gpio::Level;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use fixed::types::U24F8;
use scanline_core::config::{DisplayConfig, PixelMode};
use scanline_core::flip::FlipEngine;
use scanline_hal::{Burst, BurstTransport};

/// Color bits per pixel on the wire
pub const BITS_PER_PIXEL: u8 = 12;

/// Hand-off slot between the flip engine and the stream task
///
/// Holds at most one burst; the engine never queues a second before the
/// first completes.
pub type BurstQueue = Signal<CriticalSectionRawMutex, Burst>;

/// Transport that hands bursts to the stream task
#[derive(Clone, Copy)]
pub struct QueueTransport<'a> {
    queue: &'a BurstQueue,
}

impl<'a> QueueTransport<'a> {
    pub fn new(queue: &'a BurstQueue) -> Self {
        Self { queue }
    }
}

impl BurstTransport for QueueTransport<'_> {
    fn transfer(&mut self, burst: Burst) {
        self.queue.signal(burst);
    }
}

/// Raw U24F8 bits for an `(integer, 256ths)` divider
pub const fn divider_bits(integer: u16, frac: u8) -> u32 {
    ((integer as u32) << 8) | frac as u32
}

/// Panel clock produced for a system clock and divider
///
/// Each bit takes two PIO cycles, one per clock phase.
pub fn pixel_clock_hz(sys_hz: u32, (integer, frac): (u16, u8)) -> u32 {
    let bits = divider_bits(integer, frac).max(1 << 8);
    ((u64::from(sys_hz) << 8) / u64::from(bits) / 2) as u32
}

/// PIO state machine plus DMA channel streaming one frame buffer
pub struct ScreenStream<'d, PIO: Instance, const SM: usize, C: Channel> {
    sm: StateMachine<'d, PIO, SM>,
    dma: Peri<'d, C>,
    frame: *const u16,
    frame_len: usize,
}

impl<'d, PIO: Instance, const SM: usize, C: Channel> ScreenStream<'d, PIO, SM, C> {
    /// Load the program for `config.pixel_mode` and start the state machine
    ///
    /// # Safety
    ///
    /// `frame` must point to `frame_len` pixels that stay valid for as long
    /// as the stream exists. The stream only reads them, but it does so
    /// while the CPU may be writing; callers keep drawing out of frames in
    /// flight by polling the flip engine.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn new(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        mosi: Peri<'d, impl PioPin>,
        sck: Peri<'d, impl PioPin>,
        dma: Peri<'d, C>,
        config: &DisplayConfig,
        frame: *const u16,
        frame_len: usize,
    ) -> Self {
        let installed = match config.pixel_mode {
            PixelMode::Doubled => {
                let prg = pio::pio_asm!(
                    ".side_set 1",
                    ".wrap_target",
                    "    pull block      side 0",
                    "    out null, 4     side 0",
                    "    set x, 11       side 0",
                    "first:",
                    "    out pins, 1     side 0",
                    "    jmp x-- first   side 1",
                    "    out null, 4     side 0",
                    "    set x, 11       side 0",
                    "second:",
                    "    out pins, 1     side 0",
                    "    jmp x-- second  side 1",
                    ".wrap"
                );
                common.load_program(&prg.program)
            }
            PixelMode::Native => {
                let prg = pio::pio_asm!(
                    ".side_set 1",
                    ".wrap_target",
                    "    pull block      side 0",
                    "    out null, 4     side 0",
                    "    set x, 11       side 0",
                    "bit:",
                    "    out pins, 1     side 0",
                    "    jmp x-- bit     side 1",
                    ".wrap"
                );
                common.load_program(&prg.program)
            }
        };

        let mosi = common.make_pio_pin(mosi);
        let sck = common.make_pio_pin(sck);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&sck]);
        cfg.set_out_pins(&[&mosi]);

        let mut shift = ShiftConfig::default();
        shift.threshold = 32;
        shift.direction = ShiftDirection::Left;
        shift.auto_fill = false;
        cfg.shift_out = shift;

        // Only TX is used; joining gives an 8-deep FIFO
        cfg.fifo_join = FifoJoin::TxOnly;

        let (integer, frac) = config.pio_clock_divider();
        cfg.clock_divider = U24F8::from_bits(divider_bits(integer, frac));

        sm.set_config(&cfg);
        sm.set_pins(Level::Low, &[&mosi, &sck]);
        sm.set_pin_dirs(PioDirection::Out, &[&mosi, &sck]);
        sm.set_enable(true);

        Self {
            sm,
            dma,
            frame,
            frame_len,
        }
    }

    /// Stream one burst and wait for the DMA to drain it into the FIFO
    ///
    /// Bursts that do not fit the bound frame are skipped.
    pub async fn send(&mut self, burst: Burst) {
        if burst.range().end > self.frame_len {
            #[cfg(feature = "defmt")]
            defmt::warn!("burst {} outside frame of {} pixels", burst, self.frame_len);
            return;
        }

        // SAFETY: in bounds of the frame, which `new`'s contract keeps alive
        let pixels = unsafe { core::slice::from_raw_parts(self.frame.add(burst.offset), burst.len) };

        self.sm
            .tx()
            .dma_push(self.dma.reborrow(), pixels, true)
            .await;
    }

    /// Completion loop: send queued bursts and advance the engine
    pub async fn run(&mut self, queue: &BurstQueue, engine: &FlipEngine) -> ! {
        let mut transport = QueueTransport::new(queue);
        loop {
            let burst = queue.wait().await;
            self.send(burst).await;
            engine.on_transfer_complete(&mut transport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider_bits() {
        assert_eq!(divider_bits(1, 0), 0x100);
        assert_eq!(divider_bits(2, 1), 0x201);
    }

    #[test]
    fn test_pixel_clock_stays_near_panel_limit() {
        // 250 MHz / (2 + 1/256) / 2
        let overclocked = pixel_clock_hz(250_000_000, (2, 1));
        assert!(overclocked <= 62_500_000);
        assert!(overclocked > 62_000_000);

        assert_eq!(pixel_clock_hz(125_000_000, (1, 0)), 62_500_000);
    }
}
