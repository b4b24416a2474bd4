//! Codepage mapping
//!
//! Translates UTF-8 encoded text into the 8-bit character set of HD44780
//! compatible display controllers (ROM code A00). Characters the ROM lacks
//! are served from the eight user-defined glyphs (UDGs), which are uploaded
//! to the hardware once at startup and referenced by their index 0..7.

/// Number of user-defined glyphs supported by the hardware
pub const GLYPH_COUNT: usize = 8;

/// Rows per glyph bitmap (5 bits used per row)
pub const GLYPH_ROWS: usize = 8;

/// Direct mapping from a code point to a device character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepageEntry {
    pub code_point: u16,
    pub device: u8,
}

/// User-defined glyph; its device character is its index in [`GLYPHS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub code_point: u16,
    pub bitmap: [u8; GLYPH_ROWS],
}

/// Code points present in the device ROM
pub const CODEPAGE: [CodepageEntry; 15] = [
    CodepageEntry { code_point: 0x00b0, device: 0xdf }, // °
    CodepageEntry { code_point: 0x03b1, device: 0xe0 }, // α
    CodepageEntry { code_point: 0x00e4, device: 0xe1 }, // ä
    CodepageEntry { code_point: 0x03b2, device: 0xe2 }, // β
    CodepageEntry { code_point: 0x03b5, device: 0xe3 }, // ε
    CodepageEntry { code_point: 0x03bc, device: 0xe4 }, // μ
    CodepageEntry { code_point: 0x03c3, device: 0xe5 }, // σ
    CodepageEntry { code_point: 0x03c1, device: 0xe6 }, // ρ
    CodepageEntry { code_point: 0x00f1, device: 0xee }, // ñ
    CodepageEntry { code_point: 0x00f6, device: 0xef }, // ö
    CodepageEntry { code_point: 0x03b8, device: 0xf2 }, // θ
    CodepageEntry { code_point: 0x221e, device: 0xf3 }, // ∞
    CodepageEntry { code_point: 0x03a9, device: 0xf4 }, // Ω
    CodepageEntry { code_point: 0x03a3, device: 0xf6 }, // Σ
    CodepageEntry { code_point: 0x03c0, device: 0xf7 }, // π
];

/// User-defined glyphs, uploaded to CGRAM in this order
pub const GLYPHS: [Glyph; GLYPH_COUNT] = [
    Glyph {
        code_point: 0x00e9, // é
        bitmap: [
            0b00100, 0b01000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110, 0b00000,
        ],
    },
    Glyph {
        code_point: 0x00e8, // è
        bitmap: [
            0b01000, 0b00100, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110, 0b00000,
        ],
    },
    Glyph {
        code_point: 0x00ea, // ê
        bitmap: [
            0b00100, 0b01010, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110, 0b00000,
        ],
    },
    Glyph {
        code_point: 0x00eb, // ë
        bitmap: [
            0b01010, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110, 0b00000,
        ],
    },
    Glyph {
        code_point: 0x00fc, // ü
        bitmap: [
            0b01010, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101, 0b00000,
        ],
    },
    Glyph {
        code_point: 0x00e7, // ç
        bitmap: [
            0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10101, 0b01110, 0b00100,
        ],
    },
    Glyph {
        code_point: 0x20ac, // €
        bitmap: [
            0b01000, 0b00100, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001, 0b00000,
        ],
    },
    Glyph {
        code_point: 0x00ef, // ï
        bitmap: [
            0b01010, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110, 0b00000,
        ],
    },
];

/// Look up the device character for a code point
///
/// The ROM codepage wins over the glyph table.
pub fn lookup(code_point: u16) -> Option<u8> {
    CODEPAGE
        .iter()
        .find(|entry| entry.code_point == code_point)
        .map(|entry| entry.device)
        .or_else(|| {
            GLYPHS
                .iter()
                .position(|glyph| glyph.code_point == code_point)
                .map(|index| index as u8)
        })
}

/// Result of feeding one byte to the [`Decoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Byte consumed as part of an unfinished multi-byte sequence
    Pending,
    /// Complete sequence mapped to a device character
    Device(u8),
    /// Byte not part of a mapped sequence; subject to the control rules
    Byte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Not inside a multi-byte sequence
    Idle,
    /// Lead byte seen, waiting for `remaining` continuation bytes
    Continuation { partial: u16, remaining: u8 },
}

/// Byte-at-a-time UTF-8 decoder for the display codepage
///
/// Two- and three-byte sequences are assembled; anything malformed or
/// unmapped comes back as [`Decoded::Byte`] so the caller degrades it
/// to a filler character.
#[derive(Debug, Clone)]
pub struct Decoder {
    state: DecodeState,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a new decoder
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Idle,
        }
    }

    /// Drop any partially assembled sequence
    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
    }

    /// Feed a single byte to the decoder
    pub fn feed(&mut self, byte: u8) -> Decoded {
        if let DecodeState::Continuation { partial, remaining } = self.state {
            self.state = DecodeState::Idle;

            if byte & 0xc0 == 0x80 {
                let partial = partial | (u16::from(byte & 0x3f) << (6 * (remaining - 1)));

                if remaining > 1 {
                    self.state = DecodeState::Continuation {
                        partial,
                        remaining: remaining - 1,
                    };
                    return Decoded::Pending;
                }

                return match lookup(partial) {
                    Some(device) => Decoded::Device(device),
                    None => Decoded::Byte(byte),
                };
            }
            // Truncated sequence: start over with this byte
        }

        if byte & 0xe0 == 0xc0 {
            self.state = DecodeState::Continuation {
                partial: u16::from(byte & 0x1f) << 6,
                remaining: 1,
            };
            return Decoded::Pending;
        }

        if byte & 0xf0 == 0xe0 {
            self.state = DecodeState::Continuation {
                partial: u16::from(byte & 0x0f) << 12,
                remaining: 2,
            };
            return Decoded::Pending;
        }

        Decoded::Byte(byte)
    }
}
