//! Scanline - PicoSystem display firmware
//!
//! Brings up the ST7789 panel, then runs the bouncing-line demo on top of
//! the flip engine: sample buttons, wait for the previous frame to leave,
//! draw, wait for vsync, flip.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::Pio;
use embassy_rp::pwm::Pwm;
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embedded_alloc::LlffHeap as Heap;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use scanline_core::backlight::{Backlight, StatusLed};
use scanline_core::buffer::{PixelBuffer, NATIVE_HEIGHT, NATIVE_WIDTH};
use scanline_core::color::{Color, Pixel};
use scanline_core::flip::{FlipEngine, FlipOutcome};
use scanline_core::input::{Button, InputSampler};
use scanline_core::panel::{init_panel, reset_panel, SpiCommandBus};
use scanline_core::vsync::wait_vsync_async;
use scanline_core::Display;
use scanline_hal::Clock;
use scanline_hal_rp2040::clocks::clock_config;
use scanline_hal_rp2040::pwm::full_scale_config;
use scanline_hal_rp2040::screen::pixel_clock_hz;
use scanline_hal_rp2040::{
    BlockingSpi, BurstQueue, ButtonBank, DutyChannel, EmbassyClock, InputLine, OutputLine,
    QueueTransport, ScreenStream,
};

use crate::demo::{Bounce, FrameTimer, REPORT_INTERVAL};

mod config;
mod demo;
mod tasks;

// Heap for owned off-screen buffers
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// Screen storage, sized for native mode; doubled mode uses the front
const FRAME_PIXELS: usize = NATIVE_WIDTH as usize * NATIVE_HEIGHT as usize;

static FRAME: ConstStaticCell<[Pixel; FRAME_PIXELS]> = ConstStaticCell::new([0; FRAME_PIXELS]);
static ENGINE: StaticCell<FlipEngine> = StaticCell::new();
static BURSTS: BurstQueue = BurstQueue::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Scanline firmware starting...");

    init_heap();

    let config = config::load();
    let mode = config.pixel_mode;
    let (width, height) = (mode.screen_width(), mode.screen_height());

    let p = embassy_rp::init(embassy_rp::config::Config::new(clock_config(
        config.overclock,
    )));
    info!(
        "Peripherals initialized, sys clock {} Hz",
        embassy_rp::clocks::clk_sys_freq()
    );

    let mut clock = EmbassyClock;

    // Backlight and green LED share PWM slice 6; red and blue share slice 7
    let (backlight, green) =
        Pwm::new_output_ab(p.PWM_SLICE6, p.PIN_12, p.PIN_13, full_scale_config()).split();
    let (red, blue) =
        Pwm::new_output_ab(p.PWM_SLICE7, p.PIN_14, p.PIN_15, full_scale_config()).split();
    let (Some(backlight), Some(red), Some(green), Some(blue)) = (backlight, red, green, blue)
    else {
        defmt::panic!("PWM outputs unavailable");
    };
    let mut backlight = Backlight::new(DutyChannel::new(backlight));
    let mut led = StatusLed::new(
        DutyChannel::new(red),
        DutyChannel::new(green),
        DutyChannel::new(blue),
    );

    let mut buttons = ButtonBank::new([
        (Button::Up, p.PIN_23.into()),
        (Button::Down, p.PIN_20.into()),
        (Button::Left, p.PIN_22.into()),
        (Button::Right, p.PIN_21.into()),
        (Button::A, p.PIN_18.into()),
        (Button::B, p.PIN_19.into()),
        (Button::X, p.PIN_17.into()),
        (Button::Y, p.PIN_16.into()),
    ]);

    // Panel bring-up over SPI0. SCK and MOSI are only lent to the SPI
    // block; the screen PIO takes them over afterwards.
    let mut sck = p.PIN_6;
    let mut mosi = p.PIN_7;
    let mut reset = OutputLine::new(p.PIN_4, Level::High);
    let cs = OutputLine::new(p.PIN_5, Level::High);
    let dc = OutputLine::new(p.PIN_9, Level::Low);

    let mut spi_config = SpiConfig::default();
    spi_config.frequency = config.panel_spi_hz;
    let spi = Spi::new_blocking_txonly(p.SPI0, sck.reborrow(), mosi.reborrow(), spi_config);

    reset_panel(&mut reset, &mut clock);
    let mut bus = SpiCommandBus::new(BlockingSpi::new(spi), cs, dc);
    if let Err(e) = init_panel(&mut bus, &mut clock) {
        defmt::panic!("Panel init failed: {}", e);
    }
    // CS and DC must hold their levels for as long as pixels flow
    let (spi, _cs, _dc) = bus.enter_data_mode();
    drop(spi);
    info!("Panel initialized");

    let mut vsync = InputLine::new(p.PIN_8, Pull::None);

    let frame = FRAME.take();
    let frame_ptr = frame.as_ptr();
    let frame_len = mode.screen_pixels();
    let screen = unwrap!(PixelBuffer::borrowed(width, height, frame));

    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);

    // SAFETY: FRAME is 'static and the stream only reads from it
    let stream = unsafe {
        ScreenStream::new(
            &mut common,
            sm0,
            mosi,
            sck,
            p.DMA_CH0,
            &config,
            frame_ptr,
            frame_len,
        )
    };
    info!(
        "Screen stream: {}x{} {}, pixel clock {} Hz",
        width,
        height,
        mode,
        pixel_clock_hz(
            embassy_rp::clocks::clk_sys_freq(),
            config.pio_clock_divider()
        )
    );

    let engine: &'static FlipEngine = ENGINE.init(FlipEngine::for_screen(mode));
    spawner
        .spawn(tasks::screen_task(stream, &BURSTS, engine))
        .unwrap();

    let mut display = unwrap!(Display::new(screen, engine, QueueTransport::new(&BURSTS)));

    // Keep the backlight off until a blank frame is on the panel
    display.clear(Color::BLACK);
    display.flip();
    display.idle().await;
    wait_vsync(&mut vsync).await;
    wait_vsync(&mut vsync).await;
    backlight.set(config.backlight);
    info!("Backlight on at {}%", backlight.level());

    let mut bounce = Bounce::new(width);
    let mut timer = FrameTimer::new();
    let mut sampler = InputSampler::new();
    sampler.sample(&mut buttons);

    loop {
        let start_us = clock.now_us();

        sampler.sample(&mut buttons);
        for event in sampler.events() {
            debug!("{}", event);
        }
        let any_held = Button::ALL.iter().any(|&b| sampler.button_held(b));
        led.set(0, 0, if any_held { 50 } else { 0 });

        display.idle().await;

        display.clear(Color::BLACK);
        let (x1, y1, x2, y2) = bounce.line(height);
        if let Err(e) = display.draw_line(None, x1, y1, x2, y2, Color::WHITE) {
            warn!("Line ({}, {})-({}, {}) rejected: {}", x1, y1, x2, y2, e);
        }
        bounce.advance();

        wait_vsync(&mut vsync).await;
        if display.flip() == FlipOutcome::Dropped {
            warn!("Frame dropped ({} total)", engine.dropped_frames());
        }

        let elapsed_us = clock.now_us().wrapping_sub(start_us);
        if let Some(average) = timer.record(elapsed_us) {
            debug!(
                "Frame time {} us (average of {}), {} frames sent",
                average,
                REPORT_INTERVAL,
                engine.frames_sent()
            );
        }
    }
}

/// Wait for the start of a fresh vsync pulse
async fn wait_vsync(vsync: &mut InputLine<'_>) {
    // embassy inputs cannot fail
    let _ = wait_vsync_async(vsync.inner_mut()).await;
}

fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
