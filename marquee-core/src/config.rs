//! Display configuration
//!
//! The firmware embeds a `display.toml` file and parses it at boot with
//! [`parse_config`], a minimal line-oriented parser for the TOML subset the
//! file uses. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - `[display]` section header (keys may also appear before it)
//! - Key = value pairs (integer, basic string without escapes)
//! - Comments (# ...)

use core::fmt;

use heapless::String;

/// Maximum default message length in bytes
pub const DEFAULT_MESSAGE_CAPACITY: usize = 64;

/// Shortest allowed flip interval in seconds
pub const MIN_FLIP_TIMEOUT_S: u16 = 1;

/// Longest allowed flip interval in seconds
pub const MAX_FLIP_TIMEOUT_S: u16 = 60;

/// Message content that renders live status instead of literal text
pub const STATUS_SENTINEL: &str = "%%%%";

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not recognized
    UnknownKey,
    /// Value has the wrong type or does not parse
    InvalidValue,
    /// Value outside the allowed range
    OutOfRange,
    /// String value does not fit
    TooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::InvalidSection => "invalid section",
            ConfigError::UnknownKey => "unknown key",
            ConfigError::InvalidValue => "invalid value",
            ConfigError::OutOfRange => "value out of range",
            ConfigError::TooLong => "value too long",
        };
        f.write_str(msg)
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Seconds between automatic slot rotations (1-60)
    pub flip_timeout_s: u16,
    /// Message shown when no slot is active
    pub default_message: String<DEFAULT_MESSAGE_CAPACITY>,
    /// Brightness applied at boot, if any
    pub brightness: Option<u8>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut default_message = String::new();
        let _ = default_message.push_str(STATUS_SENTINEL);

        Self {
            flip_timeout_s: 10,
            default_message,
            brightness: None,
        }
    }
}

impl DisplayConfig {
    /// Set the flip interval, rejecting values outside 1-60 seconds
    pub fn set_flip_timeout(&mut self, seconds: u16) -> Result<(), ConfigError> {
        if !(MIN_FLIP_TIMEOUT_S..=MAX_FLIP_TIMEOUT_S).contains(&seconds) {
            return Err(ConfigError::OutOfRange);
        }
        self.flip_timeout_s = seconds;
        Ok(())
    }

    /// Set the fallback message, truncating on a character boundary
    pub fn set_default_message(&mut self, text: &str) {
        self.default_message = crate::slots::truncated(text);
    }

    /// Flip interval in milliseconds
    pub fn flip_interval_ms(&self) -> u64 {
        u64::from(self.flip_timeout_s) * 1000
    }
}

/// Parse `display.toml` content into a [`DisplayConfig`]
///
/// Keys not given keep their default values.
pub fn parse_config(input: &str) -> Result<DisplayConfig, ConfigError> {
    let mut config = DisplayConfig::default();

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if line != "[display]" {
                return Err(ConfigError::InvalidSection);
            }
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ConfigError::InvalidValue)?;
        let key = key.trim();
        let value = value.trim();

        match key {
            "flip_timeout" => config.set_flip_timeout(parse_int(value)?)?,
            "default_message" => {
                let text = parse_string(value)?;
                if text.len() > DEFAULT_MESSAGE_CAPACITY {
                    return Err(ConfigError::TooLong);
                }
                config.set_default_message(text);
            }
            "brightness" => config.brightness = Some(parse_int(value)?),
            _ => return Err(ConfigError::UnknownKey),
        }
    }

    Ok(config)
}

/// Remove a trailing `# comment`, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_string(value: &str) -> Result<&str, ConfigError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|v| !v.contains('"'))
        .ok_or(ConfigError::InvalidValue)
}
