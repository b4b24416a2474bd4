//! Character render buffer
//!
//! Holds the current frame as device characters for text-mode displays.
//! Drivers for hardware with partial refresh consume the per-row dirty
//! flags to push only changed rows.

use crate::codepage::{Decoded, Decoder};

/// Number of character rows
pub const ROWS: usize = 4;

/// Number of character columns
pub const COLUMNS: usize = 20;

/// Filler for cleared cells and undecodable input
pub const FILLER: u8 = b' ';

/// First byte outside the printable ASCII range
const ESCAPE_START: u8 = 0x80;

/// Character grid of device codes with per-row dirty tracking
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    cells: [[u8; COLUMNS]; ROWS],
    dirty: [bool; ROWS],
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Write cursor; `row == ROWS` means output is being dropped
struct Cursor {
    row: usize,
    col: usize,
}

impl RenderBuffer {
    /// Create a blank buffer
    pub const fn new() -> Self {
        Self {
            cells: [[FILLER; COLUMNS]; ROWS],
            dirty: [false; ROWS],
        }
    }

    /// Render a tag line and message text into the buffer
    ///
    /// A present tag is written on row 0 and the text starts on row 1;
    /// without a tag the text starts on row 0. Output past the last row
    /// or column is dropped. Every row is marked dirty afterwards.
    pub fn render(&mut self, tag: Option<&str>, text: &str) {
        for row in self.cells.iter_mut() {
            row.fill(FILLER);
        }

        let mut cursor = Cursor { row: 0, col: 0 };
        let mut decoder = Decoder::new();

        if let Some(tag) = tag {
            for &byte in tag.as_bytes() {
                if self.feed(&mut cursor, &mut decoder, byte) {
                    // Line feed ends the tag; the text continues from there
                    break;
                }
            }
            cursor = Cursor { row: 1, col: 0 };
            decoder.reset();
        }

        for &byte in text.as_bytes() {
            self.feed(&mut cursor, &mut decoder, byte);
        }

        self.dirty = [true; ROWS];
    }

    /// Process one input byte; returns true on line feed
    fn feed(&mut self, cursor: &mut Cursor, decoder: &mut Decoder, byte: u8) -> bool {
        let device = match decoder.feed(byte) {
            Decoded::Pending => return false,
            Decoded::Device(device) => device,
            Decoded::Byte(b'\r') => {
                cursor.col = 0;
                return false;
            }
            Decoded::Byte(b'\n') => {
                cursor.col = 0;
                if cursor.row < ROWS {
                    cursor.row += 1;
                }
                return true;
            }
            Decoded::Byte(b) if b < b' ' || b >= ESCAPE_START => FILLER,
            Decoded::Byte(b) => b,
        };

        if let Some(cell) = self
            .cells
            .get_mut(cursor.row)
            .and_then(|row| row.get_mut(cursor.col))
        {
            *cell = device;
            cursor.col += 1;
        }

        false
    }

    /// Device characters of a row
    pub fn row(&self, row: usize) -> Option<&[u8; COLUMNS]> {
        self.cells.get(row)
    }

    /// Check whether a row changed since it was last taken
    pub fn is_dirty(&self, row: usize) -> bool {
        self.dirty.get(row).copied().unwrap_or(false)
    }

    /// Take the first dirty row, clearing its flag
    pub fn take_dirty(&mut self) -> Option<usize> {
        let row = self.dirty.iter().position(|dirty| *dirty)?;
        self.dirty[row] = false;
        Some(row)
    }

    /// Mark a row for another push (e.g. after a failed transfer)
    pub fn mark_dirty(&mut self, row: usize) {
        if let Some(dirty) = self.dirty.get_mut(row) {
            *dirty = true;
        }
    }
}
