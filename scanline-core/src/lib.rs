//! Board-agnostic display pipeline for the PicoSystem
//!
//! This crate contains everything between "the application wants a line
//! on screen" and "the transport moves pixels to the panel" that does not
//! depend on a specific chip:
//!
//! - Color codec (4-bit RGBA packed into 16-bit pixels)
//! - Pixel buffers with owned or borrowed storage
//! - Fixed-point line rasterizer
//! - Flip engine driving chained burst transfers, with pixel doubling
//! - Vsync gate
//! - Button sampler with edge detection
//! - Backlight and LED gamma mapping
//! - ST7789 panel bring-up sequence
//! - Configuration types and parser
//!
//! # Frame protocol
//!
//! ```text
//!  draw ──► wait_vsync ──► flip ──► (poll is_transferring) ──► draw ...
//!                           │
//!                           ▼
//!                     first burst ──► completion IRQ ──► next burst ──► ...
//! ```
//!
//! There is a single screen buffer. Drawing into it while a flip is in
//! flight tears the frame, so the application polls
//! [`flip::FlipEngine::is_transferring`] before drawing again.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod backlight;
pub mod buffer;
pub mod color;
pub mod config;
pub mod display;
pub mod flip;
pub mod input;
pub mod panel;
pub mod raster;
pub mod vsync;

pub use buffer::{BufferError, PixelBuffer};
pub use color::{Color, Pixel};
pub use display::Display;
pub use flip::{FlipEngine, FlipState};
