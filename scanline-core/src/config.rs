//! Display configuration
//!
//! The firmware embeds a small TOML file describing how the screen is
//! driven. This module holds the configuration types and a minimal
//! parser for the subset of TOML the file uses.
//!
//! Supported:
//! - `[display]` and `[system]` section headers
//! - `key = value` pairs with integer and boolean values
//! - Comments (`# ...`) and blank lines
//!
//! Anything else, including unknown keys, is rejected so that a typo in
//! the file never silently falls back to a default.

use crate::buffer::{DOUBLED_HEIGHT, DOUBLED_WIDTH, NATIVE_HEIGHT, NATIVE_WIDTH};

/// Default startup backlight brightness (percent)
pub const DEFAULT_BACKLIGHT: u8 = 75;

/// Default panel command link clock (Hz)
pub const DEFAULT_PANEL_SPI_HZ: u32 = 8_000_000;

/// Highest accepted panel command link clock (Hz)
pub const MAX_PANEL_SPI_HZ: u32 = 62_500_000;

/// How the screen buffer maps onto the 240x240 panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelMode {
    /// 120x120 buffer, every pixel sent as a 2x2 block
    #[default]
    Doubled,
    /// 240x240 buffer, sent as-is
    Native,
}

impl PixelMode {
    pub const fn screen_width(self) -> u16 {
        match self {
            PixelMode::Doubled => DOUBLED_WIDTH,
            PixelMode::Native => NATIVE_WIDTH,
        }
    }

    pub const fn screen_height(self) -> u16 {
        match self {
            PixelMode::Doubled => DOUBLED_HEIGHT,
            PixelMode::Native => NATIVE_HEIGHT,
        }
    }

    /// Pixels in a full screen buffer
    pub const fn screen_pixels(self) -> usize {
        self.screen_width() as usize * self.screen_height() as usize
    }

    pub const fn is_doubled(self) -> bool {
        matches!(self, PixelMode::Doubled)
    }
}

/// Display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Buffer to panel mapping
    pub pixel_mode: PixelMode,
    /// Backlight brightness once the first frame is on screen (0-100)
    pub backlight: u8,
    /// Clock of the SPI link used for panel commands
    pub panel_spi_hz: u32,
    /// Run the system clock at 250 MHz (halves the PIO clock to compensate)
    pub overclock: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pixel_mode: PixelMode::Doubled,
            backlight: DEFAULT_BACKLIGHT,
            panel_spi_hz: DEFAULT_PANEL_SPI_HZ,
            overclock: true,
        }
    }
}

impl DisplayConfig {
    /// Clock divider for the screen PIO state machine as
    /// `(integer, 256ths)`
    ///
    /// Keeps the pixel clock near the ST7789's 62.5 MHz limit when the
    /// system clock is overclocked.
    pub fn pio_clock_divider(&self) -> (u16, u8) {
        if self.overclock {
            (2, 1)
        } else {
            (1, 0)
        }
    }

    /// System clock in kHz implied by the overclock setting
    pub fn sys_clock_khz(&self) -> u32 {
        if self.overclock {
            250_000
        } else {
            125_000
        }
    }
}

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Section header not recognized (1-based line number)
    UnknownSection(usize),
    /// Key not recognized in its section
    UnknownKey(usize),
    /// Key outside any section
    MissingSection(usize),
    /// Line is neither a header nor `key = value`
    Syntax(usize),
    /// Value has the wrong type or is out of range
    InvalidValue(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    System,
}

/// Parse configuration text, starting from defaults
pub fn parse_config(text: &str) -> Result<DisplayConfig, ConfigError> {
    let mut config = DisplayConfig::default();
    let mut section = Section::Root;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ConfigError::Syntax(line_no))?
                .trim();
            section = match name {
                "display" => Section::Display,
                "system" => Section::System,
                _ => return Err(ConfigError::UnknownSection(line_no)),
            };
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ConfigError::Syntax(line_no))?;
        let key = key.trim();
        let value = value.trim();

        match (section, key) {
            (Section::Root, _) => return Err(ConfigError::MissingSection(line_no)),
            (Section::Display, "pixel_double") => {
                config.pixel_mode = if parse_bool(value, line_no)? {
                    PixelMode::Doubled
                } else {
                    PixelMode::Native
                };
            }
            (Section::Display, "backlight") => {
                let level = parse_int(value, line_no)?;
                if level > 100 {
                    return Err(ConfigError::InvalidValue(line_no));
                }
                config.backlight = level as u8;
            }
            (Section::Display, "panel_spi_hz") => {
                let hz = parse_int(value, line_no)?;
                if hz == 0 || hz > MAX_PANEL_SPI_HZ {
                    return Err(ConfigError::InvalidValue(line_no));
                }
                config.panel_spi_hz = hz;
            }
            (Section::System, "overclock") => {
                config.overclock = parse_bool(value, line_no)?;
            }
            _ => return Err(ConfigError::UnknownKey(line_no)),
        }
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_bool(value: &str, line_no: usize) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue(line_no)),
    }
}

fn parse_int(value: &str, line_no: usize) -> Result<u32, ConfigError> {
    // TOML allows underscores as digit separators
    let mut result: u32 = 0;
    let mut digits = 0;
    for ch in value.chars() {
        if ch == '_' {
            continue;
        }
        let digit = ch.to_digit(10).ok_or(ConfigError::InvalidValue(line_no))?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(ConfigError::InvalidValue(line_no))?;
        digits += 1;
    }
    if digits == 0 {
        return Err(ConfigError::InvalidValue(line_no));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# PicoSystem display settings

[display]
pixel_double = true   # 120x120 buffer
backlight = 60
panel_spi_hz = 8_000_000

[system]
overclock = false
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.pixel_mode, PixelMode::Doubled);
        assert_eq!(config.backlight, 60);
        assert_eq!(config.panel_spi_hz, 8_000_000);
        assert!(!config.overclock);
    }

    #[test]
    fn test_empty_text_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), DisplayConfig::default());
        assert_eq!(parse_config("# nothing\n\n").unwrap(), DisplayConfig::default());
    }

    #[test]
    fn test_native_mode() {
        let config = parse_config("[display]\npixel_double = false\n").unwrap();
        assert_eq!(config.pixel_mode, PixelMode::Native);
        assert_eq!(config.pixel_mode.screen_width(), 240);
        assert_eq!(config.pixel_mode.screen_pixels(), 240 * 240);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_config("[display]\nbacklite = 10\n").unwrap_err();
        assert_eq!(err, ConfigError::UnknownKey(2));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = parse_config("[audio]\n").unwrap_err();
        assert_eq!(err, ConfigError::UnknownSection(1));
    }

    #[test]
    fn test_key_before_section_rejected() {
        let err = parse_config("backlight = 10\n").unwrap_err();
        assert_eq!(err, ConfigError::MissingSection(1));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[display]\nbacklight = 101").unwrap_err(),
            ConfigError::InvalidValue(2)
        );
        assert_eq!(
            parse_config("[display]\npixel_double = yes").unwrap_err(),
            ConfigError::InvalidValue(2)
        );
        assert_eq!(
            parse_config("[display]\npanel_spi_hz = 0").unwrap_err(),
            ConfigError::InvalidValue(2)
        );
        assert_eq!(
            parse_config("[display]\nbacklight = -5").unwrap_err(),
            ConfigError::InvalidValue(2)
        );
        assert_eq!(
            parse_config("[display]\nbacklight = 99999999999").unwrap_err(),
            ConfigError::InvalidValue(2)
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            parse_config("[display\n").unwrap_err(),
            ConfigError::Syntax(1)
        );
        assert_eq!(
            parse_config("[display]\nbacklight\n").unwrap_err(),
            ConfigError::Syntax(2)
        );
    }

    #[test]
    fn test_pio_divider_follows_overclock() {
        let mut config = DisplayConfig::default();
        assert_eq!(config.pio_clock_divider(), (2, 1));
        assert_eq!(config.sys_clock_khz(), 250_000);
        config.overclock = false;
        assert_eq!(config.pio_clock_divider(), (1, 0));
        assert_eq!(config.sys_clock_khz(), 125_000);
    }
}
