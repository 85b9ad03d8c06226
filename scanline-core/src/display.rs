//! Display context
//!
//! Ties the screen buffer, the flip engine and the transport handle
//! together so drawing and flipping go through one value instead of
//! process-wide globals. The engine is borrowed because the completion
//! interrupt needs it too; in firmware it lives in a `static`.

use core::future::poll_fn;
use core::task::Poll;

use scanline_hal::BurstTransport;

use crate::buffer::{BufferError, PixelBuffer};
use crate::color::Color;
use crate::flip::{Completion, FlipEngine, FlipOutcome};
use crate::raster;

/// Screen buffer plus the machinery that sends it to the panel
pub struct Display<'a, T> {
    screen: PixelBuffer<'a>,
    engine: &'a FlipEngine,
    transport: T,
}

impl<'a, T: BurstTransport> Display<'a, T> {
    /// Build a display
    ///
    /// `screen` must have the dimensions the engine sends, and `transport`
    /// must be bound to the screen's storage.
    pub fn new(
        screen: PixelBuffer<'a>,
        engine: &'a FlipEngine,
        transport: T,
    ) -> Result<Self, BufferError> {
        if (screen.width(), screen.height()) != engine.dimensions() {
            return Err(BufferError::DimensionMismatch);
        }
        Ok(Self {
            screen,
            engine,
            transport,
        })
    }

    pub fn screen(&self) -> &PixelBuffer<'a> {
        &self.screen
    }

    /// Mutable screen access
    ///
    /// Writes made while [`Self::is_transferring`] is true may show up in
    /// the frame being sent.
    pub fn screen_mut(&mut self) -> &mut PixelBuffer<'a> {
        &mut self.screen
    }

    pub fn engine(&self) -> &'a FlipEngine {
        self.engine
    }

    /// Fill the screen with one color
    pub fn clear(&mut self, color: Color) {
        self.screen.clear(color);
    }

    /// Draw a line into `target`, or into the screen when `target` is `None`
    pub fn draw_line(
        &mut self,
        target: Option<&mut PixelBuffer<'_>>,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    ) -> Result<(), BufferError> {
        match target {
            Some(buf) => raster::draw_line(buf, x1, y1, x2, y2, color),
            None => raster::draw_line(&mut self.screen, x1, y1, x2, y2, color),
        }
    }

    /// Start sending the screen to the panel
    pub fn flip(&mut self) -> FlipOutcome {
        self.engine.flip(&mut self.transport)
    }

    pub fn is_transferring(&self) -> bool {
        self.engine.is_transferring()
    }

    /// Report a finished burst to the engine
    ///
    /// For transports whose completion is observed by polling rather than
    /// an interrupt.
    pub fn complete_transfer(&mut self) -> Completion {
        self.engine.on_transfer_complete(&mut self.transport)
    }

    /// Spin until the in-flight frame, if any, has been sent
    ///
    /// Only for transports completed from interrupt context. When the
    /// completion runs as a task on the same executor, use [`Self::idle`].
    pub fn wait_idle(&self) {
        while self.engine.is_transferring() {
            core::hint::spin_loop();
        }
    }

    /// Wait for the in-flight frame without blocking the executor
    ///
    /// Re-polls on every executor pass until the engine is idle.
    pub async fn idle(&self) {
        poll_fn(|cx| {
            if self.engine.is_transferring() {
                cx.waker().wake_by_ref();
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        })
        .await
    }

    /// Tear down, returning the screen and transport
    pub fn into_parts(self) -> (PixelBuffer<'a>, T) {
        (self.screen, self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PixelMode;
    use crate::flip::FlipState;
    use scanline_hal::Burst;
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

    fn display<'a>(
        engine: &'a FlipEngine,
        storage: &'a mut [u16],
    ) -> Display<'a, RecordingTransport> {
        let (w, h) = engine.dimensions();
        let screen = PixelBuffer::borrowed(w, h, storage).unwrap();
        Display::new(screen, engine, RecordingTransport::default()).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_screen() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 4);
        let screen = PixelBuffer::owned(4, 5).unwrap();
        assert!(matches!(
            Display::new(screen, &engine, RecordingTransport::default()),
            Err(BufferError::DimensionMismatch)
        ));
    }

    #[test]
    fn test_draw_flip_and_complete_frame() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 4);
        let mut storage = [0u16; 16];
        let mut display = display(&engine, &mut storage);

        display.clear(Color::BLACK);
        display
            .draw_line(None, 0, 0, 3, 3, Color::WHITE)
            .unwrap();
        for i in 0..4 {
            assert_eq!(display.screen().pixel(i, i), Some(Color::WHITE.raw()));
        }
        assert_eq!(display.screen().pixel(1, 0), Some(Color::BLACK.raw()));

        assert!(matches!(display.flip(), FlipOutcome::Started(_)));
        assert!(display.is_transferring());

        let mut completions = 0;
        while display.is_transferring() {
            display.complete_transfer();
            completions += 1;
        }
        assert_eq!(completions, 5);
        display.wait_idle();
        assert_eq!(engine.frames_sent(), 1);

        let (_, transport) = display.into_parts();
        assert_eq!(transport.bursts.len(), 5);
        assert_eq!(transport.bursts[0], Burst::new(0, 4));
        assert_eq!(transport.bursts[4], Burst::new(12, 4));
    }

    #[test]
    fn test_flip_while_transferring_is_dropped() {
        let engine = FlipEngine::new(PixelMode::Native, 4, 4);
        let mut storage = [0u16; 16];
        let mut display = display(&engine, &mut storage);

        assert!(matches!(display.flip(), FlipOutcome::Started(_)));
        assert_eq!(display.flip(), FlipOutcome::Dropped);
        assert_eq!(engine.dropped_frames(), 1);
        assert_eq!(display.complete_transfer(), Completion::FrameDone);
        assert_eq!(engine.state(), FlipState::Idle);
    }

    #[test]
    fn test_draw_into_offscreen_target() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 4);
        let mut storage = [0u16; 16];
        let mut display = display(&engine, &mut storage);
        let mut sprite = PixelBuffer::owned(2, 2).unwrap();

        display
            .draw_line(Some(&mut sprite), 0, 1, 1, 1, Color::WHITE)
            .unwrap();
        assert_eq!(sprite.pixel(1, 1), Some(Color::WHITE.raw()));
        assert!(display.screen().pixels().iter().all(|&p| p == 0));

        assert_eq!(
            display.draw_line(Some(&mut sprite), 0, 0, 2, 0, Color::WHITE),
            Err(BufferError::OutOfBounds)
        );
    }

    #[test]
    fn test_idle_resolves_once_completion_drains_frame() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 32);
        let mut storage = [0u16; 128];
        let mut display = display(&engine, &mut storage);
        display.flip();

        std::thread::scope(|s| {
            s.spawn(|| {
                let mut transport = RecordingTransport::default();
                while engine.is_transferring() {
                    engine.on_transfer_complete(&mut transport);
                }
                assert_eq!(transport.bursts.len(), 32);
            });
            embassy_futures::block_on(display.idle());
        });

        assert!(!display.is_transferring());
        assert_eq!(engine.frames_sent(), 1);
    }

    #[test]
    fn test_complete_without_flip_is_spurious() {
        let engine = FlipEngine::new(PixelMode::Doubled, 4, 4);
        let mut storage = [0u16; 16];
        let mut display = display(&engine, &mut storage);
        assert_eq!(display.complete_transfer(), Completion::Spurious);
        display.wait_idle();
    }
}
