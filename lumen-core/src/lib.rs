//! Board-agnostic pixel model for page-addressed monochrome displays
//!
//! This crate contains everything that can be computed without talking to
//! the panel:
//!
//! - Display geometry and the packed page-layout [`PixelBuffer`]
//! - Combine operations ([`Op`]) used by every mutation
//! - Rasterization of lines, rectangles, circles, arcs and rounded rectangles
//! - Font tables loaded from JSON descriptions and the text renderer
//!
//! # Page layout
//!
//! ```text
//! byte (y >> 3) * W + x          bit (y & 7)
//! ┌──────┬──────┬──────┬─────┐
//! │ x=0  │ x=1  │ x=2  │ ... │   page 0: rows 0..=7
//! ├──────┼──────┼──────┼─────┤
//! │ W+0  │ W+1  │ W+2  │ ... │   page 1: rows 8..=15
//! └──────┴──────┴──────┴─────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod buffer;
pub mod font;
pub mod geometry;
pub mod op;
pub mod raster;
pub mod text;

pub use buffer::PixelBuffer;
pub use font::{FontError, FontTable};
pub use geometry::Geometry;
pub use op::Op;
pub use raster::Sectors;
pub use text::TextError;
