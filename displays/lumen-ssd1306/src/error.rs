//! Driver errors

use lumen_core::text::TextError;
use lumen_core::FontError;

use crate::config::ConfigError;

/// Errors surfaced by [`Display`](crate::Display)
///
/// `E` is the transport's bus error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// No device answered at the configured address
    DeviceNotFound(u8),
    /// Bus write failed
    Transfer(E),
    /// Invalid configuration
    Config(ConfigError),
    /// Font source could not be loaded
    Font(FontError),
    /// Text drawn before a font was loaded
    NoFont,
    /// The loaded font has no glyph for this character
    GlyphNotFound(char),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl<E> From<FontError> for Error<E> {
    fn from(e: FontError) -> Self {
        Error::Font(e)
    }
}

impl<E> From<TextError> for Error<E> {
    fn from(e: TextError) -> Self {
        match e {
            TextError::GlyphNotFound(ch) => Error::GlyphNotFound(ch),
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::DeviceNotFound(addr) => write!(f, "no device at address {addr:#04x}"),
            Error::Transfer(e) => write!(f, "bus transfer failed: {e:?}"),
            Error::Config(e) => write!(f, "{e}"),
            Error::Font(e) => write!(f, "{e}"),
            Error::NoFont => f.write_str("no font loaded"),
            Error::GlyphNotFound(ch) => write!(f, "no glyph for {ch:?}"),
        }
    }
}
