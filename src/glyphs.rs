//! Glyphs uploaded into CGRAM by `begin()`
//!
//! Slots 0 ~ 3 are left aligned vertical bars 1 ~ 4 pixels wide, handy for horizontal bar graphs.
//! Slots 4 ~ 6 are bottom aligned blocks, slot 7 is blank.

/// One 5x8 glyph, lower 5 bits of each row are used
pub type Glyph = [u8; 8];

#[allow(missing_docs)]
pub const DEFAULT_GLYPHS: [Glyph; 8] = [
    [0b10000; 8],
    [0b11000; 8],
    [0b11100; 8],
    [0b11110; 8],
    [
        0b00000, 0b00000, 0b00000, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111,
    ],
    [
        0b00000, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111,
    ],
    [
        0b00000, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111,
    ],
    [0b00000; 8],
];
