//! Matrix Orbital VFD driver
//!
//! Driver for 20x4 Matrix Orbital VFD modules in I2C mode. The module has
//! its own controller that takes text bytes directly and `0xFE`-prefixed
//! commands. Like the LCD driver, content goes through a [`RenderBuffer`]
//! and each `show` call pushes one changed row.

use embedded_hal::i2c::I2c;
use marquee_core::codepage::GLYPHS;
use marquee_core::render::COLUMNS;
use marquee_core::traits::Capabilities;
use marquee_core::{DisplayDriver, DisplayError, DisplayInfo, RenderBuffer};

/// Module I2C address (0x50 in 8-bit notation)
pub const ORBITAL_ADDR: u8 = 0x28;

/// Command prefix
const CMD: u8 = 0xFE;

/// Matrix Orbital commands
mod cmd {
    pub const AUTO_LINE_WRAP_OFF: u8 = 0x44;
    pub const AUTO_SCROLL_OFF: u8 = 0x52;
    pub const BLOCK_CURSOR_OFF: u8 = 0x54;
    pub const UNDERLINE_CURSOR_OFF: u8 = 0x4B;
    pub const CLEAR: u8 = 0x58;
    /// Followed by column and row, both 1-based
    pub const GOTO: u8 = 0x47;
    /// Followed by glyph index and 8 bitmap rows
    pub const DEFINE_GLYPH: u8 = 0x4E;
    /// Followed by minutes, 0 = stay on
    pub const DISPLAY_ON: u8 = 0x42;
    pub const DISPLAY_OFF: u8 = 0x46;
    /// Followed by level 0-3
    pub const BRIGHTNESS: u8 = 0x59;
}

static INFO: DisplayInfo = DisplayInfo {
    capacity: 80,
    name: "matrix orbital",
    type_label: "4x20 character VFD display",
    capabilities: Capabilities {
        brightness: true,
        show: true,
    },
};

/// Matrix Orbital VFD driver
pub struct MatrixOrbital<I2C> {
    i2c: I2C,
    buffer: RenderBuffer,
}

impl<I2C: I2c> MatrixOrbital<I2C> {
    /// Create a new Matrix Orbital driver
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            buffer: RenderBuffer::new(),
        }
    }

    /// Get access to the frame being shown
    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.i2c
            .write(ORBITAL_ADDR, bytes)
            .map_err(|_| DisplayError::Communication)
    }

    fn push_row(&mut self, row: usize) -> Result<(), DisplayError> {
        let cells = *self.buffer.row(row).ok_or(DisplayError::InvalidValue)?;

        let mut frame = [0u8; 4 + COLUMNS];
        frame[..4].copy_from_slice(&[CMD, cmd::GOTO, 1, row as u8 + 1]);
        frame[4..].copy_from_slice(&cells);
        self.write(&frame)
    }
}

impl<I2C: I2c> DisplayDriver for MatrixOrbital<I2C> {
    fn info(&self) -> &'static DisplayInfo {
        &INFO
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.write(&[CMD, cmd::CLEAR])
            .map_err(|_| DisplayError::NotDetected)?;

        for command in [
            cmd::AUTO_LINE_WRAP_OFF,
            cmd::AUTO_SCROLL_OFF,
            cmd::BLOCK_CURSOR_OFF,
            cmd::UNDERLINE_CURSOR_OFF,
        ] {
            self.write(&[CMD, command])?;
        }

        for (index, glyph) in GLYPHS.iter().enumerate() {
            let mut frame = [0u8; 3 + 8];
            frame[..3].copy_from_slice(&[CMD, cmd::DEFINE_GLYPH, index as u8]);
            frame[3..].copy_from_slice(&glyph.bitmap);
            self.write(&frame)?;
        }

        self.write(&[CMD, cmd::DISPLAY_ON, 0])
    }

    /// 0 switches the display off, 1-4 select brightness 0-3
    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        match level {
            0 => self.write(&[CMD, cmd::DISPLAY_OFF]),
            1..=4 => {
                self.write(&[CMD, cmd::DISPLAY_ON, 0])?;
                self.write(&[CMD, cmd::BRIGHTNESS, level - 1])
            }
            _ => Err(DisplayError::InvalidValue),
        }
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
