//! Font tables
//!
//! A font is described externally as JSON:
//!
//! ```json
//! { "width": 7, "height": 12, "chars": { "A": [12, 0, 30, 0, ...] } }
//! ```
//!
//! Each glyph is a flat list of bytes, `len / height` bytes per scan line,
//! pixels packed least-significant bit first. Older font files spell the
//! height key `hight`; both are accepted.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

use crate::text::GLYPH_SPACING;

/// Font loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontError {
    /// Source is not a valid font document
    Parse,
    /// Glyph width missing or zero
    MissingWidth,
    /// Glyph height missing or zero
    MissingHeight,
    /// No glyphs defined
    NoGlyphs,
    /// A `chars` key is not exactly one character
    InvalidKey,
    /// Glyph length is not a non-zero multiple of the glyph height
    MalformedGlyph(char),
}

impl core::fmt::Display for FontError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FontError::Parse => f.write_str("font source is malformed"),
            FontError::MissingWidth => f.write_str("font width missing or zero"),
            FontError::MissingHeight => f.write_str("font height missing or zero"),
            FontError::NoGlyphs => f.write_str("font defines no glyphs"),
            FontError::InvalidKey => f.write_str("glyph key is not a single character"),
            FontError::MalformedGlyph(ch) => write!(f, "glyph {ch:?} has a malformed bitmap"),
        }
    }
}

/// Wire form of a font description
#[derive(Deserialize)]
struct FontDescription {
    width: Option<u8>,
    #[serde(alias = "hight")]
    height: Option<u8>,
    #[serde(default)]
    chars: BTreeMap<String, Vec<u8>>,
}

/// Immutable glyph table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    width: u8,
    height: u8,
    glyphs: BTreeMap<char, Vec<u8>>,
}

impl FontTable {
    /// Build a table from glyph bitmaps
    pub fn new(
        width: u8,
        height: u8,
        glyphs: impl IntoIterator<Item = (char, Vec<u8>)>,
    ) -> Result<Self, FontError> {
        if width == 0 {
            return Err(FontError::MissingWidth);
        }
        if height == 0 {
            return Err(FontError::MissingHeight);
        }

        let glyphs: BTreeMap<char, Vec<u8>> = glyphs.into_iter().collect();
        if glyphs.is_empty() {
            return Err(FontError::NoGlyphs);
        }
        for (&ch, bitmap) in &glyphs {
            if bitmap.is_empty() || bitmap.len() % usize::from(height) != 0 {
                return Err(FontError::MalformedGlyph(ch));
            }
        }

        Ok(Self {
            width,
            height,
            glyphs,
        })
    }

    /// Parse a JSON font description
    pub fn from_json(source: &str) -> Result<Self, FontError> {
        Self::from_slice(source.as_bytes())
    }

    /// Parse a JSON font description from raw bytes
    pub fn from_slice(source: &[u8]) -> Result<Self, FontError> {
        let desc: FontDescription =
            serde_json::from_slice(source).map_err(|_| FontError::Parse)?;

        let width = desc.width.ok_or(FontError::MissingWidth)?;
        let height = desc.height.ok_or(FontError::MissingHeight)?;

        let mut glyphs = Vec::with_capacity(desc.chars.len());
        for (key, bitmap) in desc.chars {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(FontError::InvalidKey),
            };
            glyphs.push((ch, bitmap));
        }

        Self::new(width, height, glyphs)
    }

    /// Glyph width in pixels
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Glyph height in pixels
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Bitmap for a character
    pub fn glyph(&self, ch: char) -> Option<&[u8]> {
        self.glyphs.get(&ch).map(Vec::as_slice)
    }

    /// Check whether a character has a glyph
    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Number of glyphs
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Characters with glyphs, in order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.keys().copied()
    }

    /// Rendered width of `text` including inter-glyph spacing
    pub fn text_width(&self, text: &str) -> i32 {
        let n = text.chars().count() as i32;
        if n == 0 {
            return 0;
        }
        n * i32::from(self.width) + (n - 1) * GLYPH_SPACING
    }
}
