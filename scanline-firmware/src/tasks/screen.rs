//! Screen stream task
//!
//! Completion context of the flip engine: every burst the engine queues
//! is streamed here, and the engine is told when it has gone out.

use defmt::*;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use scanline_core::flip::FlipEngine;
use scanline_hal_rp2040::{BurstQueue, ScreenStream};

/// The screen stream as wired on the PicoSystem
pub type Screen = ScreenStream<'static, PIO0, 0, DMA_CH0>;

#[embassy_executor::task]
pub async fn screen_task(
    mut stream: Screen,
    queue: &'static BurstQueue,
    engine: &'static FlipEngine,
) {
    info!(
        "Screen stream task started ({} bursts per frame)",
        engine.bursts_per_frame()
    );
    stream.run(queue, engine).await
}
