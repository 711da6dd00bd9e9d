//! Geometric primitives
//!
//! All rasterization is integer-only. Entry points clamp their endpoints
//! and centers onto the panel before stepping, and circle radii shrink
//! until the whole circle fits.
//!
//! Shapes that visit some pixels more than once (rectangle corners, the
//! axis points of a circle, fill chords overlapping each other) combine
//! each covered pixel exactly once with the caller's `op`. Idempotent
//! operations plot directly; XOR coverage is first collected in a stencil
//! with [`Op::Set`] and then blended into the target.

use core::mem::swap;
use core::ops::BitOr;

use crate::buffer::PixelBuffer;
use crate::op::Op;

/// Octant selection for [`arc`]
///
/// One bit per symmetric point of the midpoint circle, in this order:
/// `(+x,-y) (+y,-x) (-y,-x) (-x,-y) (-x,+y) (-y,+x) (+y,+x) (+x,+y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sectors(u8);

impl Sectors {
    /// No octants
    pub const NONE: Self = Self(0x00);
    /// Upper-left quarter
    pub const TOP_LEFT: Self = Self(0x0C);
    /// Upper-right quarter
    pub const TOP_RIGHT: Self = Self(0x03);
    /// Lower-left quarter
    pub const BOTTOM_LEFT: Self = Self(0x30);
    /// Lower-right quarter
    pub const BOTTOM_RIGHT: Self = Self(0xC0);
    /// Full circle
    pub const ALL: Self = Self(0xFF);

    /// Build from a raw bit mask
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bit mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if no octant is selected
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Sectors {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Draw a straight line, endpoints inclusive
pub fn line(buf: &mut PixelBuffer, x0: i32, y0: i32, x1: i32, y1: i32, op: Op) {
    let g = buf.geometry();
    plot_line(
        buf,
        g.clamp_x(x0),
        g.clamp_y(y0),
        g.clamp_x(x1),
        g.clamp_y(y1),
        op,
    );
}

/// Draw a shape that may revisit pixels, combining each covered pixel once
///
/// Idempotent operations are plotted straight into `buf`; XOR goes through
/// the buffer's reusable stencil.
fn composite(buf: &mut PixelBuffer, op: Op, draw: impl FnOnce(&mut PixelBuffer, Op)) {
    if op.is_idempotent() {
        draw(buf, op);
    } else {
        buf.composite(op, |stencil| draw(stencil, Op::Set));
    }
}

/// Bresenham stepping along the major axis
fn plot_line(buf: &mut PixelBuffer, mut x0: i32, mut y0: i32, mut x1: i32, mut y1: i32, op: Op) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        swap(&mut x0, &mut y0);
        swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        swap(&mut x0, &mut x1);
        swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let y_step = if y0 < y1 { 1 } else { -1 };
    let mut err = dx >> 1;
    let mut y = y0;

    for x in x0..=x1 {
        if steep {
            buf.set_pixel(y, x, op);
        } else {
            buf.set_pixel(x, y, op);
        }
        err -= dy;
        if err < 0 {
            y += y_step;
            err += dx;
        }
    }
}

/// Draw the border of a rectangle
///
/// Corners are not sorted; each edge clamps its own endpoints.
pub fn rectangle_outline(buf: &mut PixelBuffer, x0: i32, y0: i32, x1: i32, y1: i32, op: Op) {
    composite(buf, op, |target, op| {
        line(target, x0, y0, x1, y0, op);
        line(target, x0, y0, x0, y1, op);
        line(target, x1, y0, x1, y1, op);
        line(target, x0, y1, x1, y1, op);
    });
}

/// Fill a rectangle, one byte run per page
pub fn fill_rectangle(buf: &mut PixelBuffer, x0: i32, y0: i32, x1: i32, y1: i32, op: Op) {
    let g = buf.geometry();
    let (mut x0, mut y0, mut x1, mut y1) = (g.clamp_x(x0), g.clamp_y(y0), g.clamp_x(x1), g.clamp_y(y1));
    if x1 < x0 {
        swap(&mut x0, &mut x1);
    }
    if y1 < y0 {
        swap(&mut y0, &mut y1);
    }

    let width = usize::from(g.width());
    let count = (x1 - x0 + 1) as usize;
    let mut address = (y0 >> 3) as usize * width + x0 as usize;
    let mut top = y0;

    while top <= y1 && address < buf.len() {
        // Last row of this page that belongs to the rectangle
        let bottom = (top | 7).min(y1);
        let mask = (0xFFu8 << (top & 7)) & (0xFFu8 >> (7 - (bottom & 7)));
        buf.set_masked_run(address, 0xFF, mask, count, op);
        address += width;
        top = bottom + 1;
    }
}

/// Shrink `r` until a circle centered at `(x0, y0)` fits on the panel
///
/// Returns `None` for a non-positive radius.
fn fit_radius(buf: &PixelBuffer, x0: i32, y0: i32, r: i32) -> Option<i32> {
    if r <= 0 {
        return None;
    }
    Some(
        r.min(x0)
            .min(y0)
            .min(buf.width() - 1 - x0)
            .min(buf.height() - 1 - y0),
    )
}

/// Midpoint circle stepping, plotting the selected octant points
fn plot_arc(buf: &mut PixelBuffer, x0: i32, y0: i32, r: i32, sectors: Sectors, op: Op) {
    let s = sectors.bits();
    let mut xd = 1 - (r << 1);
    let mut yd = 0;
    let mut e = 0;
    let mut x = r;
    let mut y = 0;

    while x >= y {
        let points = [
            (0x01, x0 + x, y0 - y),
            (0x02, x0 + y, y0 - x),
            (0x04, x0 - y, y0 - x),
            (0x08, x0 - x, y0 - y),
            (0x10, x0 - x, y0 + y),
            (0x20, x0 - y, y0 + x),
            (0x40, x0 + y, y0 + x),
            (0x80, x0 + x, y0 + y),
        ];
        for (bit, px, py) in points {
            if s & bit != 0 {
                buf.set_pixel(px, py, op);
            }
        }

        y += 1;
        e += yd;
        yd += 2;
        if (e << 1) + xd > 0 {
            x -= 1;
            e += xd;
            xd += 2;
        }
    }
}

/// Draw the outline of a circle
pub fn circle_outline(buf: &mut PixelBuffer, x0: i32, y0: i32, r: i32, op: Op) {
    arc(buf, x0, y0, r, Sectors::ALL, op);
}

/// Draw the selected octants of a circle
pub fn arc(buf: &mut PixelBuffer, x0: i32, y0: i32, r: i32, sectors: Sectors, op: Op) {
    if sectors.is_empty() {
        return;
    }
    let g = buf.geometry();
    let (x0, y0) = (g.clamp_x(x0), g.clamp_y(y0));
    let Some(r) = fit_radius(buf, x0, y0, r) else {
        return;
    };

    composite(buf, op, |target, op| {
        plot_arc(target, x0, y0, r, sectors, op);
    });
}

/// Draw a filled disk
///
/// Vertical chords between symmetric points cover the interior, then the
/// midpoint outline is overlaid so the edge matches [`circle_outline`].
pub fn fill_circle(buf: &mut PixelBuffer, x0: i32, y0: i32, r: i32, op: Op) {
    let g = buf.geometry();
    let (x0, y0) = (g.clamp_x(x0), g.clamp_y(y0));
    let Some(r) = fit_radius(buf, x0, y0, r) else {
        return;
    };

    composite(buf, op, |target, op| {
        let mut xd = 3 - (r << 1);
        let mut x = 0;
        let mut y = r;

        while x <= y {
            if y > 0 {
                plot_line(target, x0 - x, y0 - y, x0 - x, y0 + y, op);
                plot_line(target, x0 + x, y0 - y, x0 + x, y0 + y, op);
            }
            if x > 0 {
                plot_line(target, x0 - y, y0 - x, x0 - y, y0 + x, op);
                plot_line(target, x0 + y, y0 - x, x0 + y, y0 + x, op);
            }
            if xd < 0 {
                xd += (x << 2) + 6;
            } else {
                xd += ((x - y) << 2) + 10;
                y -= 1;
            }
            x += 1;
        }
        plot_arc(target, x0, y0, r, Sectors::ALL, op);
    });
}

/// Sorted, clamped corners and a radius that fits inside them
fn rounded_bounds(
    buf: &PixelBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    r: i32,
) -> (i32, i32, i32, i32, i32) {
    let g = buf.geometry();
    let (mut x0, mut y0, mut x1, mut y1) = (g.clamp_x(x0), g.clamp_y(y0), g.clamp_x(x1), g.clamp_y(y1));
    if x1 < x0 {
        swap(&mut x0, &mut x1);
    }
    if y1 < y0 {
        swap(&mut y0, &mut y1);
    }
    let r = r.clamp(0, (x1 - x0).min(y1 - y0) / 2);
    (x0, y0, x1, y1, r)
}

/// Draw the border of a rectangle with rounded corners
pub fn rounded_rect_outline(
    buf: &mut PixelBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    r: i32,
    op: Op,
) {
    let (x0, y0, x1, y1, r) = rounded_bounds(buf, x0, y0, x1, y1, r);

    composite(buf, op, |target, op| {
        plot_line(target, x0 + r, y0, x1 - r, y0, op);
        plot_line(target, x0 + r, y1, x1 - r, y1, op);
        plot_line(target, x0, y0 + r, x0, y1 - r, op);
        plot_line(target, x1, y0 + r, x1, y1 - r, op);
        plot_arc(target, x0 + r, y0 + r, r, Sectors::TOP_LEFT, op);
        plot_arc(target, x1 - r, y0 + r, r, Sectors::TOP_RIGHT, op);
        plot_arc(target, x0 + r, y1 - r, r, Sectors::BOTTOM_LEFT, op);
        plot_arc(target, x1 - r, y1 - r, r, Sectors::BOTTOM_RIGHT, op);
    });
}

/// Fill a rectangle with rounded corners
///
/// The horizontally inset body is filled page-wise; the left and right
/// bands are filled with vertical chords stepped like [`fill_circle`].
pub fn rounded_rect_fill(
    buf: &mut PixelBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    r: i32,
    op: Op,
) {
    let (x0, y0, x1, y1, r) = rounded_bounds(buf, x0, y0, x1, y1, r);

    composite(buf, op, |target, op| {
        fill_rectangle(target, x0 + r, y0, x1 - r, y1, op);

        let mut xd = 3 - (r << 1);
        let mut x = 0;
        let mut y = r;

        while x <= y {
            if y > 0 {
                plot_line(target, x1 + x - r, y0 - y + r, x1 + x - r, y1 + y - r, op);
                plot_line(target, x0 - x + r, y0 - y + r, x0 - x + r, y1 + y - r, op);
            }
            if x > 0 {
                plot_line(target, x0 - y + r, y0 - x + r, x0 - y + r, y1 + x - r, op);
                plot_line(target, x1 + y - r, y0 - x + r, x1 + y - r, y1 + x - r, op);
            }
            if xd < 0 {
                xd += (x << 2) + 6;
            } else {
                xd += ((x - y) << 2) + 10;
                y -= 1;
            }
            x += 1;
        }
    });
}
