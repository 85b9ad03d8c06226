//! Build script for scanline-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Highest SPI clock the ST7789 accepts
const MAX_PANEL_SPI_HZ: i64 = 62_500_000;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate display.toml at compile time
///
/// The firmware parses the same file with a small no_std parser at boot;
/// catching mistakes here turns them into build errors instead of a
/// silent fall back to defaults on the device.
fn validate_config() {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: display.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds display.toml at build time.                 ║\n\
            ║  Please create one in the scanline-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read display.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in display.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_system(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid display configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=display.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only `[display]` and `[system]` tables are understood
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        match (name.as_str(), value) {
            ("display" | "system", toml::Value::Table(_)) => {}
            ("display" | "system", _) => errors.push(format!("[{}] must be a table", name)),
            _ => errors.push(format!("unknown section [{}]", name)),
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display").and_then(|d| d.as_table()) else {
        return;
    };

    for (key, value) in display {
        match (key.as_str(), value) {
            ("pixel_double", toml::Value::Boolean(_)) => {}
            ("pixel_double", _) => errors.push("[display] pixel_double must be a boolean".into()),
            ("backlight", toml::Value::Integer(level)) => {
                if !(0..=100).contains(level) {
                    errors.push("[display] backlight must be 0-100".into());
                }
            }
            ("backlight", _) => errors.push("[display] backlight must be an integer".into()),
            ("panel_spi_hz", toml::Value::Integer(hz)) => {
                if *hz <= 0 || *hz > MAX_PANEL_SPI_HZ {
                    errors.push(format!(
                        "[display] panel_spi_hz must be 1-{}",
                        MAX_PANEL_SPI_HZ
                    ));
                }
            }
            ("panel_spi_hz", _) => errors.push("[display] panel_spi_hz must be an integer".into()),
            _ => errors.push(format!("[display] unknown key '{}'", key)),
        }
    }
}

fn validate_system(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(system) = config.get("system").and_then(|s| s.as_table()) else {
        return;
    };

    for (key, value) in system {
        match (key.as_str(), value) {
            ("overclock", toml::Value::Boolean(_)) => {}
            ("overclock", _) => errors.push("[system] overclock must be a boolean".into()),
            _ => errors.push(format!("[system] unknown key '{}'", key)),
        }
    }
}
