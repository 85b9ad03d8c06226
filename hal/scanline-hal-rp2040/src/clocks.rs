//! System clock setup

use embassy_rp::clocks::ClockConfig;

/// Overclocked system frequency
pub const OVERCLOCK_HZ: u32 = 250_000_000;

/// PicoSystem crystal
pub const XOSC_HZ: u32 = 12_000_000;

/// Clock tree for the requested speed
///
/// The overclocked tree also raises the core voltage, which a stable
/// 250 MHz needs on some parts. If it cannot be derived, the stock
/// 125 MHz tree is used and the PIO divider is then merely conservative.
pub fn clock_config(overclock: bool) -> ClockConfig {
    if overclock {
        if let Ok(config) = ClockConfig::system_freq(OVERCLOCK_HZ) {
            return config;
        }
    }
    ClockConfig::crystal(XOSC_HZ)
}
