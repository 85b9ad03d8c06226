//! RP2040-specific HAL for the Scanline display pipeline
//!
//! This crate provides RP2040 implementations of the `scanline-hal`
//! traits, plus the chip-specific pieces of the display path:
//!
//! - GPIO lines and the button bank
//! - PWM duty channels (backlight, RGB LED)
//! - Blocking SPI for panel commands
//! - Embassy-backed clock
//! - PIO + DMA screen stream with pixel doubling
//! - System clock setup (250 MHz overclock)
//!
//! # PicoSystem wiring
//!
//! ```text
//! LCD   CS 5  SCK 6  MOSI 7  VSYNC 8  DC 9  RESET 4  BACKLIGHT 12
//! LED   R 14  G 13   B 15
//! KEYS  Y 16  X 17   A 18    B 19     DOWN 20  RIGHT 21  LEFT 22  UP 23
//! ```

#![no_std]

pub mod clocks;
pub mod gpio;
pub mod pwm;
pub mod screen;
pub mod spi;
pub mod time;

pub use gpio::{ButtonBank, InputLine, OutputLine};
pub use pwm::DutyChannel;
pub use screen::{BurstQueue, QueueTransport, ScreenStream};
pub use spi::BlockingSpi;
pub use time::EmbassyClock;
