//! HD44780 character LCD driver
//!
//! Driver for 20x4 HD44780-compatible LCDs behind a PCF8574 I2C backpack,
//! driven in 4-bit mode. The user-defined glyphs are uploaded to CGRAM once
//! during [`init`](DisplayDriver::init). Content is rendered into a
//! [`RenderBuffer`] and pushed one changed row per [`show`](DisplayDriver::show)
//! call, so a frame takes at most four periodic ticks to appear.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use marquee_core::codepage::GLYPHS;
use marquee_core::render::COLUMNS;
use marquee_core::traits::Capabilities;
use marquee_core::{DisplayDriver, DisplayError, DisplayInfo, RenderBuffer};

/// PCF8574 I2C address (A0-A2 pulled high)
pub const PCF8574_ADDR: u8 = 0x27;

// PCF8574 pin mapping: P0=RS, P1=RW, P2=E, P3=Backlight, P4-P7=Data
const PIN_RS: u8 = 0x01;
const PIN_ENABLE: u8 = 0x04;
const PIN_BACKLIGHT: u8 = 0x08;

/// DDRAM address of the first column of each row
const ROW_ADDR: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// HD44780 commands
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_MODE_INCREMENT: u8 = 0x06;
    pub const DISPLAY_ON: u8 = 0x0C;
    /// 4-bit bus, 2 line mode (covers 4 physical rows), 5x8 font
    pub const FUNCTION_SET: u8 = 0x28;
    pub const SET_CGRAM_ADDR: u8 = 0x40;
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

static INFO: DisplayInfo = DisplayInfo {
    capacity: 80,
    name: "hd44780",
    type_label: "4x20 character LCD display",
    capabilities: Capabilities {
        brightness: true,
        show: true,
    },
};

/// HD44780 LCD driver
pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    buffer: RenderBuffer,
    backlight: bool,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a new HD44780 driver
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            buffer: RenderBuffer::new(),
            backlight: true,
        }
    }

    /// Get access to the frame being shown
    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    fn expander_bits(&self, rs: bool) -> u8 {
        let mut bits = 0;
        if rs {
            bits |= PIN_RS;
        }
        if self.backlight {
            bits |= PIN_BACKLIGHT;
        }
        bits
    }

    /// Clock one nibble into the controller
    fn write_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), DisplayError> {
        let data = (nibble << 4) | self.expander_bits(rs);
        self.i2c
            .write(PCF8574_ADDR, &[data | PIN_ENABLE])
            .map_err(|_| DisplayError::Communication)?;
        self.delay.delay_us(1);
        self.i2c
            .write(PCF8574_ADDR, &[data])
            .map_err(|_| DisplayError::Communication)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8, rs: bool) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4, rs)?;
        self.write_nibble(byte & 0x0F, rs)
    }

    fn command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.write_byte(command, false)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.write_byte(byte, true)
    }

    fn upload_glyphs(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::SET_CGRAM_ADDR)?;
        for glyph in GLYPHS.iter() {
            for &row in glyph.bitmap.iter() {
                self.data(row)?;
            }
        }
        Ok(())
    }

    fn push_row(&mut self, row: usize) -> Result<(), DisplayError> {
        let cells = *self.buffer.row(row).ok_or(DisplayError::InvalidValue)?;
        self.command(cmd::SET_DDRAM_ADDR | ROW_ADDR[row])?;
        for &cell in cells.iter().take(COLUMNS) {
            self.data(cell)?;
        }
        Ok(())
    }
}

impl<I2C, D> DisplayDriver for Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn info(&self) -> &'static DisplayInfo {
        &INFO
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // Bare presence check so an absent expander fails fast
        self.i2c
            .write(PCF8574_ADDR, &[0])
            .map_err(|_| DisplayError::NotDetected)?;

        self.delay.delay_ms(50);

        // Force 8-bit mode three times, then switch to 4-bit
        self.write_nibble(0x03, false)?;
        self.delay.delay_ms(5);
        self.write_nibble(0x03, false)?;
        self.delay.delay_us(150);
        self.write_nibble(0x03, false)?;
        self.write_nibble(0x02, false)?;

        self.command(cmd::FUNCTION_SET)?;
        self.command(cmd::DISPLAY_ON)?;
        self.command(cmd::CLEAR)?;
        self.delay.delay_ms(2);
        self.command(cmd::ENTRY_MODE_INCREMENT)?;

        self.upload_glyphs()
    }

    /// 0 switches the backlight off, 1-4 switch it on
    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        if level > 4 {
            return Err(DisplayError::InvalidValue);
        }
        self.backlight = level > 0;
        // The backlight pin is latched on every expander write
        self.i2c
            .write(PCF8574_ADDR, &[self.expander_bits(false)])
            .map_err(|_| DisplayError::Communication)
    }

    fn set_content(&mut self, tag: Option<&str>, text: &str) -> Result<(), DisplayError> {
        self.buffer.render(tag, text);
        Ok(())
    }

    fn show(&mut self) -> Result<bool, DisplayError> {
        let Some(row) = self.buffer.take_dirty() else {
            return Ok(false);
        };

        if let Err(e) = self.push_row(row) {
            self.buffer.mark_dirty(row);
            return Err(e);
        }
        Ok(true)
    }
}
