//! Display geometry

/// Pixel dimensions of a page-addressed panel
///
/// The height is always a whole number of 8-row pages, so the packed
/// buffer length is exactly `width * height / 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    width: u16,
    height: u16,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::SSD1306_128X64
    }
}

impl Geometry {
    /// 128x64 panel (8 pages)
    pub const SSD1306_128X64: Self = Self {
        width: 128,
        height: 64,
    };

    /// 128x32 panel (4 pages)
    pub const SSD1306_128X32: Self = Self {
        width: 128,
        height: 32,
    };

    /// Create a geometry
    ///
    /// Returns `None` if either dimension is zero or the height is not a
    /// multiple of 8.
    pub const fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 || height % 8 != 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }

    /// Width in pixels
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages
    pub const fn pages(&self) -> u16 {
        self.height / 8
    }

    /// Packed buffer length in bytes
    pub const fn buffer_len(&self) -> usize {
        self.width as usize * self.pages() as usize
    }

    /// Clamp an x coordinate into `[0, width - 1]`
    pub fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(0, i32::from(self.width) - 1)
    }

    /// Clamp a y coordinate into `[0, height - 1]`
    pub fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(0, i32::from(self.height) - 1)
    }

    /// Check whether a point lies on the panel
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..i32::from(self.width)).contains(&x) && (0..i32::from(self.height)).contains(&y)
    }
}
