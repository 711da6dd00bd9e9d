//! Display configuration
//!
//! Loaded from the `[display]` table of a TOML file:
//!
//! ```toml
//! [display]
//! address = 0x3C
//! width = 128
//! height = 64
//! refresh_ms = 40
//! contrast = 0x4F
//! ```
//!
//! Every key is optional and falls back to the 128x64 defaults.

use embassy_time::Duration;
use lumen_core::Geometry;
use serde::Deserialize;

use crate::transport::{DEFAULT_ADDRESS, FIRST_ADDRESS, LAST_ADDRESS};

/// Largest panel the controller can drive
const MAX_WIDTH: u16 = 128;
const MAX_HEIGHT: u16 = 64;

/// Default refresh period in milliseconds
pub const DEFAULT_REFRESH_MS: u64 = 40;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML could not be parsed into a configuration
    Parse,
    /// Width/height unsupported by the controller
    InvalidGeometry,
    /// Refresh period of zero
    InvalidRefreshPeriod,
    /// Address outside the non-reserved 7-bit range
    InvalidAddress(u8),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Parse => f.write_str("display configuration is malformed"),
            ConfigError::InvalidGeometry => f.write_str("unsupported panel geometry"),
            ConfigError::InvalidRefreshPeriod => f.write_str("refresh period must be non-zero"),
            ConfigError::InvalidAddress(addr) => write!(f, "invalid I2C address {addr:#04x}"),
        }
    }
}

/// Panel and refresh settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DisplayConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels (multiple of 8)
    pub height: u16,
    /// Refresh task period in milliseconds
    pub refresh_ms: u64,
    /// Contrast (0-255)
    pub contrast: u8,
    /// Use the internal charge pump
    pub charge_pump: bool,
    /// Start with inverted pixels
    pub inverted: bool,
    /// Rotate 180 degrees (segment remap + reversed COM scan)
    pub flip: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
            refresh_ms: DEFAULT_REFRESH_MS,
            contrast: 0x4F,
            charge_pump: true,
            inverted: false,
            flip: true,
        }
    }
}

/// Top-level file layout
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    display: DisplayConfig,
}

impl DisplayConfig {
    /// Parse and validate the `[display]` table of a TOML document
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(input).map_err(|_| ConfigError::Parse)?;
        file.display.validate()?;
        Ok(file.display)
    }

    /// Check the settings, returning the panel geometry
    pub fn validate(&self) -> Result<Geometry, ConfigError> {
        if !(FIRST_ADDRESS..=LAST_ADDRESS).contains(&self.address) {
            return Err(ConfigError::InvalidAddress(self.address));
        }
        if self.refresh_ms == 0 {
            return Err(ConfigError::InvalidRefreshPeriod);
        }
        if self.width > MAX_WIDTH || self.height > MAX_HEIGHT {
            return Err(ConfigError::InvalidGeometry);
        }
        Geometry::new(self.width, self.height).ok_or(ConfigError::InvalidGeometry)
    }

    /// Refresh task period
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}
