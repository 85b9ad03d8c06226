//! Scanline Hardware Abstraction Layer
//!
//! This crate defines the peripheral contracts the display pipeline is
//! written against. Chip-specific HALs (currently RP2040) implement them,
//! and host tests implement them with fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  scanline-firmware (composition root)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scanline-core (buffer, raster, flip)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scanline-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ scanline-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::InputPort`] - Digital I/O
//! - [`pwm::PwmOutput`] - 16-bit PWM duty output (LEDs, backlight)
//! - [`spi::SpiBus`] - Write-only panel command link
//! - [`transport::BurstTransport`] - Non-blocking pixel burst transfers
//! - [`time::Clock`] - Monotonic clock and blocking sleep

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pwm;
pub mod spi;
pub mod time;
pub mod transport;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, InputPort, OutputPin};
pub use pwm::PwmOutput;
pub use spi::SpiBus;
pub use time::Clock;
pub use transport::{Burst, BurstTransport};
