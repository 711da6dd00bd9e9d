//! SSD1306 OLED driver
//!
//! Drives 128x64 (and 128x32) SSD1306 panels over I2C. Drawing calls only
//! touch an in-memory framebuffer under a shared lock; a separate refresh
//! task pushes the buffer to the panel whenever it is dirty.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   lock, draw, mark dirty   ┌─────────────────────┐
//! │ client calls │ ─────────────────────────▶ │ Display (Mutex)     │
//! └──────────────┘                            │  PixelBuffer, dirty │
//!                                             │  FontTable          │
//! ┌──────────────┐   every tick, if dirty     │  Transport          │
//! │ run_refresh  │ ─────────────────────────▶ └─────────────────────┘
//! └──────────────┘        one data frame                │
//!                                                       ▼
//!                                               I2C: [0x40, ...]
//! ```
//!
//! # Example
//!
//! ```ignore
//! let config = DisplayConfig::default();
//! let transport = I2cTransport::new(i2c, config.address);
//! let display: Display<CriticalSectionRawMutex, _> = Display::init(transport, &config).await?;
//!
//! display.fill_rectangle(0, 0, 127, 63, Op::Xor).await;
//! join(display.run_refresh(), app(&display)).await;
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod transport;

pub use command::{ScrollDirection, ScrollSpeed};
pub use config::{ConfigError, DisplayConfig};
pub use display::Display;
pub use error::Error;
pub use transport::{BlockingI2cTransport, I2cTransport, Transport};

pub use lumen_core::{FontTable, Geometry, Op, PixelBuffer, Sectors};
