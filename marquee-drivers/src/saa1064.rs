//! SAA1064 LED driver
//!
//! Driver for a 4-digit seven-segment LED display multiplexed by an SAA1064.
//! The chip has no frame buffer of its own worth diffing, so content is
//! written immediately on [`set_content`](DisplayDriver::set_content) and the
//! driver has no `show` step. Only the first line of text is shown; the tag
//! is ignored.

use embedded_hal::i2c::I2c;
use marquee_core::traits::Capabilities;
use marquee_core::{DisplayDriver, DisplayError, DisplayInfo};

/// SAA1064 I2C address (ADR pin to ground)
pub const SAA1064_ADDR: u8 = 0x38;

/// Number of digits
const DIGITS: usize = 4;

/// Subaddress of the control register; digit registers follow it
const SUBADDR_CONTROL: u8 = 0x00;

/// Dynamic (multiplexed) mode with all four digits enabled
const CONTROL_DYNAMIC: u8 = 0x07;

/// Segment output current bits (3, 6 and 12 mA) per brightness level
const CURRENT: [u8; 5] = [0x00, 0x10, 0x20, 0x40, 0x70];

/// Brightness level applied by `init`
const DEFAULT_BRIGHTNESS: u8 = 2;

/// Decimal point segment
const SEG_DP: u8 = 0x80;

static INFO: DisplayInfo = DisplayInfo {
    capacity: DIGITS as u8,
    name: "saa1064",
    type_label: "4 digit led display",
    capabilities: Capabilities {
        brightness: true,
        show: false,
    },
};

/// Seven-segment pattern for a character (bit 0 = a ... bit 6 = g)
fn segments(ch: u8) -> u8 {
    match ch.to_ascii_uppercase() {
        b'0' | b'O' => 0x3f,
        b'1' | b'I' => 0x06,
        b'2' | b'Z' => 0x5b,
        b'3' => 0x4f,
        b'4' => 0x66,
        b'5' | b'S' => 0x6d,
        b'6' | b'G' => 0x7d,
        b'7' => 0x07,
        b'8' | b'B' => 0x7f,
        b'9' => 0x6f,
        b'A' => 0x77,
        b'C' => 0x39,
        b'D' => 0x5e,
        b'E' => 0x79,
        b'F' => 0x71,
        b'H' => 0x76,
        b'J' => 0x1e,
        b'L' => 0x38,
        b'N' => 0x54,
        b'P' => 0x73,
        b'R' => 0x50,
        b'T' => 0x78,
        b'U' | b'V' => 0x3e,
        b'Y' => 0x6e,
        b'-' => 0x40,
        b'_' => 0x08,
        b'=' => 0x48,
        b'\'' => 0x20,
        _ => 0x00,
    }
}

/// Map the first line of text to digit patterns
///
/// A `.` lights the decimal point of the digit before it; a leading or
/// repeated `.` takes a digit of its own.
fn encode(text: &str) -> [u8; DIGITS] {
    let mut digits = [0u8; DIGITS];
    let mut used = 0;

    for ch in text.chars() {
        if ch == '\n' {
            break;
        }

        if ch == '.' && used > 0 && digits[used - 1] & SEG_DP == 0 {
            digits[used - 1] |= SEG_DP;
            continue;
        }

        if used == DIGITS {
            break;
        }

        digits[used] = match ch {
            '.' => SEG_DP,
            ch if ch.is_ascii() => segments(ch as u8),
            _ => 0,
        };
        used += 1;
    }

    digits
}

/// SAA1064 LED driver
pub struct Saa1064<I2C> {
    i2c: I2C,
    digits: [u8; DIGITS],
    brightness: u8,
}

impl<I2C: I2c> Saa1064<I2C> {
    /// Create a new SAA1064 driver
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            digits: [0; DIGITS],
            brightness: DEFAULT_BRIGHTNESS,
        }
    }

    /// Write control register and all digits in one transfer
    fn flush(&mut self) -> Result<(), DisplayError> {
        let control = CONTROL_DYNAMIC | CURRENT[usize::from(self.brightness)];
        let [d1, d2, d3, d4] = self.digits;
        self.i2c
            .write(SAA1064_ADDR, &[SUBADDR_CONTROL, control, d1, d2, d3, d4])
            .map_err(|_| DisplayError::Communication)
    }
}

impl<I2C: I2c> DisplayDriver for Saa1064<I2C> {
    fn info(&self) -> &'static DisplayInfo {
        &INFO
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.digits = [0; DIGITS];
        self.flush().map_err(|_| DisplayError::NotDetected)
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        if usize::from(level) >= CURRENT.len() {
            return Err(DisplayError::InvalidValue);
        }
        self.brightness = level;
        self.flush()
    }

    fn set_content(&mut self, _tag: Option<&str>, text: &str) -> Result<(), DisplayError> {
        self.digits = encode(text);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    #[test]
    fn test_encode_digits() {
        assert_eq!(encode("1234"), [0x06, 0x5b, 0x4f, 0x66]);
        assert_eq!(encode("12"), [0x06, 0x5b, 0, 0]);
        assert_eq!(encode("123456"), [0x06, 0x5b, 0x4f, 0x66]);
    }

    #[test]
    fn test_encode_decimal_point() {
        // Clock format from the status line
        assert_eq!(encode("01.05 saa1064"), [0x3f, 0x06 | SEG_DP, 0x3f, 0x6d]);
        assert_eq!(encode(".5"), [SEG_DP, 0x6d, 0, 0]);
        assert_eq!(encode("1..2"), [0x06 | SEG_DP, SEG_DP, 0x5b, 0]);
        // Trailing point after the last digit still fits
        assert_eq!(encode("12.34."), [0x06, 0x5b | SEG_DP, 0x4f, 0x66 | SEG_DP]);
    }

    #[test]
    fn test_encode_first_line_only() {
        assert_eq!(encode("1\n2"), [0x06, 0, 0, 0]);
        assert_eq!(encode("°C"), [0, 0x39, 0, 0]);
    }

    #[test]
    fn test_init_absent() {
        let mut led = Saa1064::new(MockBus::new(SAA1064_ADDR, false));
        assert_eq!(led.init(), Err(DisplayError::NotDetected));
    }

    #[test]
    fn test_set_content_writes_frame() {
        let mut led = Saa1064::new(MockBus::new(SAA1064_ADDR, true));
        led.init().unwrap();
        led.set_content(Some("ignored"), "42").unwrap();

        let frame = led.i2c.writes.last().unwrap();
        assert_eq!(
            frame.as_slice(),
            &[SUBADDR_CONTROL, CONTROL_DYNAMIC | 0x20, 0x66, 0x5b, 0, 0]
        );
        assert_eq!(led.show(), Ok(false));
    }

    #[test]
    fn test_brightness_levels() {
        let mut led = Saa1064::new(MockBus::new(SAA1064_ADDR, true));
        led.init().unwrap();
        led.set_content(None, "8").unwrap();

        led.set_brightness(4).unwrap();
        let frame = led.i2c.writes.last().unwrap();
        assert_eq!(frame[1], CONTROL_DYNAMIC | 0x70);
        assert_eq!(frame[2], 0x7f);

        led.set_brightness(0).unwrap();
        assert_eq!(led.i2c.writes.last().unwrap()[1], CONTROL_DYNAMIC);

        assert_eq!(led.set_brightness(5), Err(DisplayError::InvalidValue));
    }
}
