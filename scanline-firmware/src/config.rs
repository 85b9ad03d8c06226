//! Display configuration loading
//!
//! The configuration is compiled in from `display.toml`, which build.rs
//! has already validated. Parsing can therefore only fail if the two
//! validators disagree; the firmware then falls back to defaults rather
//! than refusing to boot.

use defmt::*;
use scanline_core::config::{parse_config, DisplayConfig};

/// Embedded configuration (compiled into firmware)
/// Edit display.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../display.toml");

/// Load the embedded configuration
pub fn load() -> DisplayConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config: mode={}, backlight={}%, panel_spi={}Hz, overclock={}",
                config.pixel_mode, config.backlight, config.panel_spi_hz, config.overclock
            );
            config
        }
        Err(e) => {
            warn!("display.toml rejected ({}), using defaults", e);
            DisplayConfig::default()
        }
    }
}
