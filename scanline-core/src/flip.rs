//! Flip engine
//!
//! Streams the screen buffer to the panel as a chain of asynchronous
//! bursts. [`FlipEngine::flip`] issues the first burst and returns; every
//! transfer-completion interrupt calls [`FlipEngine::on_transfer_complete`],
//! which issues the next burst until the frame is out.
//!
//! # Pixel doubling
//!
//! In [`PixelMode::Doubled`] the transport doubles pixels horizontally, and
//! rows are doubled by sending each one twice. Rather than duplicating rows
//! in memory, each burst after the first resends the previous row together
//! with the current one:
//!
//! ```text
//! scanline 0        : row 0
//! scanline 1        : row 0 + row 1
//! scanline 2        : row 1 + row 2
//! ...
//! scanline H-1      : row H-2 + row H-1
//! scanline H        : row H-1
//! ```
//!
//! A frame of `H` rows therefore takes `H + 1` bursts.
//!
//! # Concurrency
//!
//! The engine state is a single atomic scanline counter, `-1` when idle.
//! The main flow only starts a flip through a compare-exchange from idle;
//! everything after that is advanced by the completion interrupt. Stores
//! are `Release` and loads `Acquire`, so once the interrupt publishes idle,
//! the next [`FlipEngine::is_transferring`] poll observes it together with
//! the updated frame counter.

use portable_atomic::{AtomicI32, AtomicU32, Ordering};
use scanline_hal::{Burst, BurstTransport};

use crate::config::PixelMode;

/// Scanline sentinel meaning "no transfer in flight"
pub const IDLE_SCANLINE: i32 = -1;

/// Observable transfer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlipState {
    /// No transfer in flight; the buffer may be redrawn
    Idle,
    /// Transfer in flight, currently sending the given scanline burst
    Transferring(u16),
}

/// Result of a flip request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlipOutcome {
    /// A new frame transfer started with this burst
    Started(Burst),
    /// A transfer was already in flight; the request was dropped
    Dropped,
}

/// Result of handling a completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// The frame continues with this burst
    NextBurst(Burst),
    /// The last burst of the frame finished; the engine is idle
    FrameDone,
    /// Completion arrived while idle and was ignored
    Spurious,
}

/// Burst sequencer shared between the main loop and the completion interrupt
#[derive(Debug)]
pub struct FlipEngine {
    mode: PixelMode,
    width: u16,
    height: u16,
    scanline: AtomicI32,
    dropped: AtomicU32,
    frames: AtomicU32,
}

impl FlipEngine {
    /// Create an idle engine for a `width` x `height` frame
    pub const fn new(mode: PixelMode, width: u16, height: u16) -> Self {
        Self {
            mode,
            width,
            height,
            scanline: AtomicI32::new(IDLE_SCANLINE),
            dropped: AtomicU32::new(0),
            frames: AtomicU32::new(0),
        }
    }

    /// Engine sized for the screen of the given mode
    pub const fn for_screen(mode: PixelMode) -> Self {
        Self::new(mode, mode.screen_width(), mode.screen_height())
    }

    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Raw scanline counter (`-1` when idle)
    pub fn scanline(&self) -> i32 {
        self.scanline.load(Ordering::Acquire)
    }

    pub fn state(&self) -> FlipState {
        match self.scanline() {
            s if s < 0 => FlipState::Idle,
            s => FlipState::Transferring(s as u16),
        }
    }

    pub fn is_transferring(&self) -> bool {
        self.scanline() != IDLE_SCANLINE
    }

    /// Flip requests dropped because a transfer was in flight
    pub fn dropped_frames(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Frames fully transmitted
    pub fn frames_sent(&self) -> u32 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Number of bursts (and completion signals) per frame
    pub fn bursts_per_frame(&self) -> u32 {
        match self.mode {
            PixelMode::Doubled => self.height as u32 + 1,
            PixelMode::Native => 1,
        }
    }

    /// Start sending a frame
    ///
    /// A request while a transfer is in flight is not queued: it is counted
    /// in [`Self::dropped_frames`] and otherwise ignored.
    pub fn flip<T: BurstTransport>(&self, transport: &mut T) -> FlipOutcome {
        match self.scanline.compare_exchange(
            IDLE_SCANLINE,
            0,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                let burst = self.burst(0);
                transport.transfer(burst);
                FlipOutcome::Started(burst)
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                FlipOutcome::Dropped
            }
        }
    }

    /// Advance after the transport reports a finished burst
    ///
    /// Called from the completion interrupt.
    pub fn on_transfer_complete<T: BurstTransport>(&self, transport: &mut T) -> Completion {
        let current = self.scanline.load(Ordering::Acquire);
        if current == IDLE_SCANLINE {
            return Completion::Spurious;
        }

        match self.mode {
            PixelMode::Native => {
                self.finish();
                Completion::FrameDone
            }
            PixelMode::Doubled => {
                let next = current + 1;
                if next > self.height as i32 {
                    self.finish();
                    return Completion::FrameDone;
                }
                self.scanline.store(next, Ordering::Release);
                let burst = self.burst(next as u16);
                transport.transfer(burst);
                Completion::NextBurst(burst)
            }
        }
    }

    /// Burst sent for a given scanline
    pub fn burst(&self, scanline: u16) -> Burst {
        let row = self.width as usize;
        match self.mode {
            PixelMode::Native => Burst::new(0, row * self.height as usize),
            PixelMode::Doubled => {
                let first_row = scanline.saturating_sub(1) as usize;
                let rows = if scanline == 0 || scanline >= self.height {
                    1
                } else {
                    2
                };
                Burst::new(first_row * row, rows * row)
            }
        }
    }

    /// Every burst of one frame, in transmission order
    pub fn frame_bursts(&self) -> impl Iterator<Item = Burst> + '_ {
        (0..self.bursts_per_frame()).map(move |s| self.burst(s as u16))
    }

    fn finish(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.scanline.store(IDLE_SCANLINE, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::color::Color;
    use std::sync::mpsc;
    use std::vec::Vec;

    #[derive(Default)]
    struct RecordingTransport {
        bursts: Vec<Burst>,
    }

    impl BurstTransport for RecordingTransport {
        fn transfer(&mut self, burst: Burst) {
            self.bursts.push(burst);
        }
    }

    /// Complete bursts until the engine reports the frame is done
    fn run_to_completion(engine: &FlipEngine, transport: &mut RecordingTransport) -> u32 {
        let mut completions = 0;
        while engine.is_transferring() {
            engine.on_transfer_complete(transport);
            completions += 1;
        }
        completions
    }

    #[test]
    fn test_idle_on_creation() {
        let engine = FlipEngine::for_screen(PixelMode::Doubled);
        assert_eq!(engine.state(), FlipState::Idle);
        assert_eq!(engine.scanline(), IDLE_SCANLINE);
        assert!(!engine.is_transferring());
    }

    #[test]
    fn test_flip_starts_with_first_row() {
        let engine = FlipEngine::new(PixelMode::Doubled, 120, 120);
        let mut transport = RecordingTransport::default();

        let outcome = engine.flip(&mut transport);

        assert_eq!(outcome, FlipOutcome::Started(Burst::new(0, 120)));
        assert!(engine.is_transferring());
        assert_eq!(engine.state(), FlipState::Transferring(0));
        assert_eq!(transport.bursts, [Burst::new(0, 120)]);
    }

    #[test]
    fn test_doubled_needs_height_plus_one_completions() {
        for height in [1u16, 2, 4, 120] {
            let engine = FlipEngine::new(PixelMode::Doubled, 8, height);
            let mut transport = RecordingTransport::default();
            engine.flip(&mut transport);

            for _ in 0..height {
                engine.on_transfer_complete(&mut transport);
                assert!(engine.is_transferring());
            }
            assert_eq!(
                engine.on_transfer_complete(&mut transport),
                Completion::FrameDone
            );
            assert!(!engine.is_transferring());
            assert_eq!(transport.bursts.len(), height as usize + 1);
        }
    }

    #[test]
    fn test_native_needs_one_completion() {
        let engine = FlipEngine::for_screen(PixelMode::Native);
        let mut transport = RecordingTransport::default();

        engine.flip(&mut transport);
        assert!(engine.is_transferring());
        assert_eq!(
            engine.on_transfer_complete(&mut transport),
            Completion::FrameDone
        );
        assert!(!engine.is_transferring());
        assert_eq!(transport.bursts, [Burst::new(0, 240 * 240)]);
        assert_eq!(transport.bursts[0].words(), 240 * 240 / 2);
    }

    #[test]
    fn test_doubled_burst_layout() {
        let engine = FlipEngine::new(PixelMode::Doubled, 120, 120);
        assert_eq!(engine.burst(0), Burst::new(0, 120));
        assert_eq!(engine.burst(1), Burst::new(0, 240));
        assert_eq!(engine.burst(2), Burst::new(120, 240));
        assert_eq!(engine.burst(119), Burst::new(118 * 120, 240));
        assert_eq!(engine.burst(120), Burst::new(119 * 120, 120));

        // 60 words for the lone first/last rows, 120 for the pairs
        assert_eq!(engine.burst(0).words(), 60);
        assert_eq!(engine.burst(60).words(), 120);
        assert_eq!(engine.burst(120).words(), 60);
    }

    #[test]
    fn test_scanline_increases_monotonically() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 6);
        let mut transport = RecordingTransport::default();
        engine.flip(&mut transport);

        let mut last = engine.scanline();
        while engine.is_transferring() {
            engine.on_transfer_complete(&mut transport);
            let now = engine.scanline();
            if now == IDLE_SCANLINE {
                assert_eq!(last, 6);
                break;
            }
            assert_eq!(now, last + 1);
            last = now;
        }
    }

    #[test]
    fn test_every_row_transmitted_twice_in_order() {
        let mut buf = PixelBuffer::owned(3, 5).unwrap();
        for y in 0..5 {
            for x in 0..3 {
                buf.write_pixel(x, y, Color::from_raw((y * 16 + x) as u16))
                    .unwrap();
            }
        }

        let engine = FlipEngine::new(PixelMode::Doubled, 3, 5);
        let mut transport = RecordingTransport::default();
        engine.flip(&mut transport);
        run_to_completion(&engine, &mut transport);

        let stream: Vec<u16> = transport
            .bursts
            .iter()
            .flat_map(|b| buf.burst_pixels(b).unwrap().iter().copied())
            .collect();

        let expected: Vec<u16> = (0..5u16)
            .flat_map(|y| {
                let row = buf.row(y).unwrap();
                row.iter().chain(row.iter()).copied().collect::<Vec<_>>()
            })
            .collect();

        assert_eq!(stream, expected);
    }

    #[test]
    fn test_flip_while_transferring_is_noop() {
        let engine = FlipEngine::new(PixelMode::Doubled, 120, 120);
        let mut transport = RecordingTransport::default();
        engine.flip(&mut transport);
        engine.on_transfer_complete(&mut transport);
        engine.on_transfer_complete(&mut transport);

        let before = engine.scanline();
        let bursts_before = transport.bursts.len();

        assert_eq!(engine.flip(&mut transport), FlipOutcome::Dropped);

        assert_eq!(engine.scanline(), before);
        assert_eq!(transport.bursts.len(), bursts_before);
        assert_eq!(engine.dropped_frames(), 1);
    }

    #[test]
    fn test_spurious_completion_ignored() {
        let engine = FlipEngine::for_screen(PixelMode::Doubled);
        let mut transport = RecordingTransport::default();
        assert_eq!(
            engine.on_transfer_complete(&mut transport),
            Completion::Spurious
        );
        assert!(transport.bursts.is_empty());
        assert_eq!(engine.frames_sent(), 0);
    }

    #[test]
    fn test_flip_again_after_frame_done() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 4);
        let mut transport = RecordingTransport::default();

        for frame in 1..=3 {
            assert!(matches!(engine.flip(&mut transport), FlipOutcome::Started(_)));
            assert_eq!(run_to_completion(&engine, &mut transport), 5);
            assert_eq!(engine.frames_sent(), frame);
        }
        assert_eq!(engine.dropped_frames(), 0);
    }

    #[test]
    fn test_frame_bursts_match_issued_sequence() {
        let engine = FlipEngine::new(PixelMode::Doubled, 10, 7);
        let mut transport = RecordingTransport::default();
        engine.flip(&mut transport);
        run_to_completion(&engine, &mut transport);

        let planned: Vec<Burst> = engine.frame_bursts().collect();
        assert_eq!(planned, transport.bursts);
    }

    struct ChannelTransport(mpsc::Sender<Burst>);

    impl BurstTransport for ChannelTransport {
        fn transfer(&mut self, burst: Burst) {
            let _ = self.0.send(burst);
        }
    }

    #[test]
    fn test_completion_from_another_thread() {
        // A worker thread stands in for the DMA interrupt
        let engine = FlipEngine::new(PixelMode::Doubled, 16, 32);
        let (tx, rx) = mpsc::channel::<Burst>();

        std::thread::scope(|s| {
            let irq_tx = tx.clone();
            let engine = &engine;
            let worker = s.spawn(move || {
                let mut transport = ChannelTransport(irq_tx);
                let mut seen = 0u32;
                while rx.recv().is_ok() {
                    seen += 1;
                    if engine.on_transfer_complete(&mut transport) == Completion::FrameDone {
                        break;
                    }
                }
                seen
            });

            let mut transport = ChannelTransport(tx);
            engine.flip(&mut transport);
            while engine.is_transferring() {
                std::hint::spin_loop();
            }
            assert_eq!(engine.frames_sent(), 1);
            assert_eq!(worker.join().unwrap(), 33);
        });
    }
}
