//! Glyph and string rendering

use crate::buffer::PixelBuffer;
use crate::font::FontTable;
use crate::op::Op;

/// Blank columns between consecutive glyphs
pub const GLYPH_SPACING: i32 = 1;

/// Text rendering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextError {
    /// The loaded font has no glyph for this character
    GlyphNotFound(char),
}

impl core::fmt::Display for TextError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TextError::GlyphNotFound(ch) => write!(f, "no glyph for {ch:?}"),
        }
    }
}

/// Draw one glyph with its top-left corner at `(x0, y0)`
///
/// Returns the x coordinate just past the glyph.
pub fn draw_glyph(
    buf: &mut PixelBuffer,
    font: &FontTable,
    ch: char,
    x0: i32,
    y0: i32,
    op: Op,
) -> Result<i32, TextError> {
    let glyph = font.glyph(ch).ok_or(TextError::GlyphNotFound(ch))?;
    let g = buf.geometry();
    let (x0, y0) = (g.clamp_x(x0), g.clamp_y(y0));

    let bytes_per_line = glyph.len() / usize::from(font.height());
    let width = usize::from(font.width());
    let mut x = x0;

    for (row, scan_line) in glyph.chunks(bytes_per_line).enumerate() {
        let y = y0 + row as i32;
        x = x0;
        let mut emitted = 0;

        'line: for &byte in scan_line {
            for bit in 0..8 {
                if emitted >= width {
                    break 'line;
                }
                if byte & (1 << bit) != 0 {
                    buf.set_pixel(x, y, op);
                }
                x += 1;
                emitted += 1;
            }
        }
    }

    Ok(x)
}

/// Draw a string left to right starting at `(x0, y0)`
///
/// Rendering stops before the first glyph that would reach the right edge;
/// the rest of the string is dropped rather than wrapped. Glyphs drawn
/// before a missing character stay drawn.
///
/// Returns the cursor x after the last rendered glyph and its spacing.
pub fn draw_string(
    buf: &mut PixelBuffer,
    font: &FontTable,
    text: &str,
    x0: i32,
    y0: i32,
    op: Op,
) -> Result<i32, TextError> {
    let g = buf.geometry();
    let (mut x, y0) = (g.clamp_x(x0), g.clamp_y(y0));
    let width = i32::from(font.width());

    for ch in text.chars() {
        if x + width >= buf.width() {
            break;
        }
        x = draw_glyph(buf, font, ch, x, y0, op)? + GLYPH_SPACING;
    }

    Ok(x)
}
