//! Packed page-layout framebuffer
//!
//! One byte holds eight vertically stacked pixels of a single column:
//! pixel `(x, y)` lives in byte `(y >> 3) * W + x` at bit `y & 7`.
//! This is the layout the controller expects in horizontal addressing
//! mode, so the whole buffer can be sent as a single data frame.

use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::Geometry;
use crate::op::Op;

/// In-memory bitmap mirroring the panel
///
/// The length never changes after construction. Coordinates passed to
/// [`set_pixel`](Self::set_pixel) are clamped onto the panel rather than
/// rejected.
pub struct PixelBuffer {
    geometry: Geometry,
    data: Vec<u8>,
    // Stencil storage reused by `composite`, empty until first needed
    scratch: Vec<u8>,
}

impl Clone for PixelBuffer {
    fn clone(&self) -> Self {
        Self {
            geometry: self.geometry,
            data: self.data.clone(),
            scratch: Vec::new(),
        }
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.geometry == other.geometry && self.data == other.data
    }
}

impl Eq for PixelBuffer {}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new(Geometry::default())
    }
}

impl core::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("geometry", &self.geometry)
            .field("len", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            data: vec![0; geometry.buffer_len()],
            scratch: Vec::new(),
        }
    }

    /// Wrap existing page-layout bytes
    ///
    /// Returns `None` if the length does not match the geometry.
    pub fn from_bytes(geometry: Geometry, data: Vec<u8>) -> Option<Self> {
        (data.len() == geometry.buffer_len()).then_some(Self {
            geometry,
            data,
            scratch: Vec::new(),
        })
    }

    /// Buffer geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Width in pixels
    pub fn width(&self) -> i32 {
        i32::from(self.geometry.width())
    }

    /// Height in pixels
    pub fn height(&self) -> i32 {
        i32::from(self.geometry.height())
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a valid geometry
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw page-layout bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Byte address and bit mask of an on-panel pixel
    fn locate(&self, x: i32, y: i32) -> (usize, u8) {
        let address = (y >> 3) as usize * usize::from(self.geometry.width()) + x as usize;
        (address, 1 << (y & 7))
    }

    /// Apply `op` to a single pixel
    ///
    /// Out-of-range coordinates are clamped to the nearest edge pixel.
    pub fn set_pixel(&mut self, x: i32, y: i32, op: Op) {
        let x = self.geometry.clamp_x(x);
        let y = self.geometry.clamp_y(y);
        let (address, mask) = self.locate(x, y);
        if let Some(byte) = self.data.get_mut(address) {
            *byte = op.apply_masked(*byte, mask, mask);
        }
    }

    /// Read a pixel, `false` when off the panel
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if !self.geometry.contains(x, y) {
            return false;
        }
        let (address, mask) = self.locate(x, y);
        self.data.get(address).is_some_and(|b| b & mask != 0)
    }

    /// Apply `op` byte-wise to `count` bytes starting at `address`
    ///
    /// Stops at the end of the buffer.
    pub fn set_run(&mut self, address: usize, value: u8, count: usize, op: Op) {
        self.set_masked_run(address, value, 0xFF, count, op);
    }

    /// Like [`set_run`](Self::set_run), touching only the bits in `mask`
    pub fn set_masked_run(&mut self, address: usize, value: u8, mask: u8, count: usize, op: Op) {
        let len = self.data.len();
        let start = address.min(len);
        let end = address.saturating_add(count).min(len);
        for byte in &mut self.data[start..end] {
            *byte = op.apply_masked(*byte, value, mask);
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.set_run(0, 0, self.data.len(), Op::Set);
    }

    /// Set every byte to `value`
    pub fn fill(&mut self, value: u8) {
        self.set_run(0, value, self.data.len(), Op::Set);
    }

    /// Blank buffer of the same geometry, used to collect coverage
    pub fn stencil(&self) -> Self {
        Self::new(self.geometry)
    }

    /// Apply `op` once to every pixel that is on in `stencil`
    pub fn blend(&mut self, stencil: &PixelBuffer, op: Op) {
        for (byte, &mask) in self.data.iter_mut().zip(stencil.data.iter()) {
            if mask != 0 {
                *byte = op.apply_masked(*byte, mask, mask);
            }
        }
    }

    /// Collect coverage with `draw` on a blank stencil, then [`blend`](Self::blend) it
    ///
    /// The stencil storage stays with the buffer, so only the first
    /// composite on a buffer allocates.
    pub fn composite(&mut self, op: Op, draw: impl FnOnce(&mut PixelBuffer)) {
        let mut data = core::mem::take(&mut self.scratch);
        data.clear();
        data.resize(self.data.len(), 0);

        let mut stencil = Self {
            geometry: self.geometry,
            data,
            scratch: Vec::new(),
        };
        draw(&mut stencil);
        self.blend(&stencil, op);
        self.scratch = stencil.data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buf = PixelBuffer::default();
        assert_eq!(buf.len(), 1024);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_page_addressing() {
        let mut buf = PixelBuffer::default();
        buf.set_pixel(3, 10, Op::Set);
        // page 1, column 3, bit 2
        assert_eq!(buf.as_bytes()[128 + 3], 0b0000_0100);
        assert!(buf.pixel(3, 10));
        assert!(!buf.pixel(3, 11));
    }

    #[test]
    fn test_set_pixel_keeps_neighbours() {
        let mut buf = PixelBuffer::default();
        buf.set_pixel(0, 0, Op::Set);
        buf.set_pixel(0, 1, Op::Set);
        assert_eq!(buf.as_bytes()[0], 0b11);
        buf.set_pixel(0, 0, Op::AndNot);
        assert_eq!(buf.as_bytes()[0], 0b10);
        buf.set_pixel(0, 1, Op::Xor);
        assert_eq!(buf.as_bytes()[0], 0);
    }

    #[test]
    fn test_set_pixel_clamps() {
        let mut buf = PixelBuffer::default();
        buf.set_pixel(-10, 200, Op::Set);
        assert!(buf.pixel(0, 63));
        buf.set_pixel(1000, -3, Op::Set);
        assert!(buf.pixel(127, 0));
        assert_eq!(buf.as_bytes().iter().map(|b| b.count_ones()).sum::<u32>(), 2);
    }

    #[test]
    fn test_run_stops_at_end() {
        let mut buf = PixelBuffer::default();
        buf.set_run(1020, 0xAA, 100, Op::Set);
        assert_eq!(buf.len(), 1024);
        assert_eq!(&buf.as_bytes()[1019..], &[0, 0xAA, 0xAA, 0xAA, 0xAA]);
        buf.set_run(5000, 0xFF, 10, Op::Set);
        assert_eq!(buf.as_bytes()[0], 0);
    }

    #[test]
    fn test_masked_run() {
        let mut buf = PixelBuffer::default();
        buf.fill(0x0F);
        buf.set_masked_run(0, 0xFF, 0xF0, 2, Op::Set);
        assert_eq!(&buf.as_bytes()[..3], &[0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_clear() {
        let mut buf = PixelBuffer::default();
        buf.fill(0xFF);
        buf.clear();
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_composite_reuses_stencil() {
        let mut buf = PixelBuffer::default();
        buf.composite(Op::Xor, |s| {
            s.set_pixel(2, 2, Op::Set);
            s.set_pixel(2, 2, Op::Set);
        });
        assert!(buf.pixel(2, 2));
        assert_eq!(buf.scratch.len(), 1024);

        // Stale coverage from the first call must not leak into the second
        buf.composite(Op::Xor, |s| s.set_pixel(3, 3, Op::Set));
        assert!(buf.pixel(2, 2));
        assert!(buf.pixel(3, 3));
        assert_eq!(buf, buf.clone());
    }

    #[test]
    fn test_blend_applies_once() {
        let mut buf = PixelBuffer::default();
        let mut stencil = buf.stencil();
        stencil.set_pixel(5, 5, Op::Set);
        stencil.set_pixel(5, 5, Op::Or);
        buf.blend(&stencil, Op::Xor);
        assert!(buf.pixel(5, 5));
        buf.blend(&stencil, Op::Xor);
        assert!(!buf.pixel(5, 5));
    }
}
