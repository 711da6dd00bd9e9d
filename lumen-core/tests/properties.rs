//! Property tests for the pixel model and rasterizer

use lumen_core::raster::{circle_outline, fill_rectangle, line};
use lumen_core::{Geometry, Op, PixelBuffer};
use proptest::prelude::*;

const W: i32 = 128;
const H: i32 = 64;

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Set),
        Just(Op::Or),
        Just(Op::And),
        Just(Op::AndNot),
        Just(Op::Xor),
    ]
}

fn any_buffer() -> impl Strategy<Value = PixelBuffer> {
    prop::collection::vec(any::<u8>(), 1024).prop_map(|bytes| {
        PixelBuffer::from_bytes(Geometry::SSD1306_128X64, bytes).expect("length matches")
    })
}

fn lit(buf: &PixelBuffer) -> usize {
    buf.as_bytes().iter().map(|b| b.count_ones() as usize).sum()
}

proptest! {
    #[test]
    fn set_pixel_touches_one_bit(mut buf in any_buffer(), x in 0..W, y in 0..H, op in any_op()) {
        let before = buf.clone();
        let was = before.pixel(x, y);
        buf.set_pixel(x, y, op);

        let expected = match op {
            Op::Set | Op::Or => true,
            Op::And => was,
            Op::AndNot => false,
            Op::Xor => !was,
        };
        prop_assert_eq!(buf.pixel(x, y), expected);

        for px in 0..W {
            for py in 0..H {
                if (px, py) != (x, y) {
                    prop_assert_eq!(buf.pixel(px, py), before.pixel(px, py));
                }
            }
        }
    }

    #[test]
    fn clear_turns_everything_off(mut buf in any_buffer()) {
        buf.clear();
        prop_assert_eq!(buf.len(), 1024);
        for x in 0..W {
            for y in 0..H {
                prop_assert!(!buf.pixel(x, y));
            }
        }
    }

    #[test]
    fn degenerate_line_is_one_pixel(x in 0..W, y in 0..H) {
        let mut buf = PixelBuffer::default();
        line(&mut buf, x, y, x, y, Op::Set);
        prop_assert_eq!(lit(&buf), 1);
        prop_assert!(buf.pixel(x, y));
    }

    #[test]
    fn line_is_symmetric(
        start in any_buffer(),
        x0 in 0..W, y0 in 0..H, x1 in 0..W, y1 in 0..H,
        op in prop_oneof![Just(Op::Set), Just(Op::Or), Just(Op::Xor)],
    ) {
        let mut forward = start.clone();
        let mut backward = start;
        line(&mut forward, x0, y0, x1, y1, op);
        line(&mut backward, x1, y1, x0, y0, op);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn xor_fill_is_self_inverse(
        start in any_buffer(),
        x0 in -10..W + 10, y0 in -10..H + 10, x1 in -10..W + 10, y1 in -10..H + 10,
    ) {
        let mut buf = start.clone();
        fill_rectangle(&mut buf, x0, y0, x1, y1, Op::Xor);
        fill_rectangle(&mut buf, x0, y0, x1, y1, Op::Xor);
        prop_assert_eq!(buf, start);
    }

    #[test]
    fn fill_covers_exactly_the_rectangle(x0 in 0..W, y0 in 0..H, x1 in 0..W, y1 in 0..H) {
        let mut buf = PixelBuffer::default();
        fill_rectangle(&mut buf, x0, y0, x1, y1, Op::Set);
        let (lx, hx) = (x0.min(x1), x0.max(x1));
        let (ly, hy) = (y0.min(y1), y0.max(y1));
        for x in 0..W {
            for y in 0..H {
                let inside = (lx..=hx).contains(&x) && (ly..=hy).contains(&y);
                prop_assert_eq!(buf.pixel(x, y), inside);
            }
        }
    }

    #[test]
    fn circle_has_eightfold_symmetry(cx in 0..W, cy in 0..H, r in 1..24i32, op in prop_oneof![Just(Op::Set), Just(Op::Xor)]) {
        // Only circles that fit without shrinking
        prop_assume!(r <= cx && r <= cy && cx + r < W && cy + r < H);

        let mut buf = PixelBuffer::default();
        circle_outline(&mut buf, cx, cy, r, op);
        prop_assert!(lit(&buf) > 0);

        for px in 0..W {
            for py in 0..H {
                if !buf.pixel(px, py) {
                    continue;
                }
                let (dx, dy) = (px - cx, py - cy);
                for (mx, my) in [(dx, dy), (-dx, dy), (dx, -dy), (-dx, -dy)] {
                    prop_assert!(buf.pixel(cx + mx, cy + my));
                    prop_assert!(buf.pixel(cx + my, cy + mx));
                }
            }
        }
    }
}

#[test]
fn full_fill_sets_every_pixel() {
    let mut buf = PixelBuffer::default();
    fill_rectangle(&mut buf, 0, 0, W - 1, H - 1, Op::Set);
    assert!(buf.as_bytes().iter().all(|&b| b == 0xFF));
}
