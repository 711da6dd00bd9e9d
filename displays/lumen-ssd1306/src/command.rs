//! SSD1306 command set
//!
//! Command bytes and the fixed sequences built from them. Every byte in
//! these sequences is sent as its own `[0x00, byte]` command frame.

use lumen_core::Geometry;

use crate::config::DisplayConfig;

/// SSD1306 commands
pub mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const DISPLAY_ALL_ON: u8 = 0xA5;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const COM_SCAN_INC: u8 = 0xC0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const CHARGE_PUMP_ON: u8 = 0x14;
    pub const CHARGE_PUMP_OFF: u8 = 0x10;
    pub const ACTIVATE_SCROLL: u8 = 0x2F;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
    pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;
}

/// Memory addressing modes for [`cmd::MEMORY_MODE`]
const HORIZONTAL_ADDRESSING: u8 = 0x00;

/// Length of the bring-up sequence
pub const INIT_SEQUENCE_LEN: usize = 31;

/// Controller bring-up sequence for a panel
///
/// Leaves the controller in horizontal addressing mode with the column and
/// page window covering the whole panel, so one data frame of
/// `geometry.buffer_len()` bytes rewrites the entire display.
pub fn init_sequence(config: &DisplayConfig, geometry: Geometry) -> [u8; INIT_SEQUENCE_LEN] {
    let last_row = (geometry.height() - 1) as u8;
    let last_column = (geometry.width() - 1) as u8;
    let last_page = (geometry.pages() - 1) as u8;

    let (charge_pump, precharge) = if config.charge_pump {
        (cmd::CHARGE_PUMP_ON, 0xF1)
    } else {
        (cmd::CHARGE_PUMP_OFF, 0x22)
    };
    let (seg_remap, com_scan) = if config.flip {
        (cmd::SEG_REMAP | 0x01, cmd::COM_SCAN_DEC)
    } else {
        (cmd::SEG_REMAP, cmd::COM_SCAN_INC)
    };
    // Alternative COM pin layout on 64-row panels, sequential otherwise
    let com_pins = if geometry.height() == 64 { 0x12 } else { 0x02 };

    [
        cmd::DISPLAY_OFF,
        cmd::SET_CLOCK_DIV,
        0x80, // Default clock
        cmd::SET_MUX_RATIO,
        last_row,
        cmd::SET_DISPLAY_OFFSET,
        0x00,
        cmd::SET_START_LINE | 0x00,
        cmd::CHARGE_PUMP,
        charge_pump,
        cmd::MEMORY_MODE,
        HORIZONTAL_ADDRESSING,
        seg_remap,
        com_scan,
        cmd::SET_COM_PINS,
        com_pins,
        cmd::SET_CONTRAST,
        config.contrast,
        cmd::SET_PRECHARGE,
        precharge,
        cmd::SET_VCOM_DETECT,
        0x40,
        cmd::DISPLAY_ALL_ON_RESUME,
        inversion(config.inverted),
        cmd::SET_COLUMN_ADDR,
        0,
        last_column,
        cmd::SET_PAGE_ADDR,
        0,
        last_page,
        cmd::DISPLAY_ON,
    ]
}

/// Column and page window covering the whole panel
///
/// Also rewinds the RAM write pointer to the top-left corner, so a data
/// frame sent after it always lands at the origin.
pub fn address_window(geometry: Geometry) -> [u8; 6] {
    [
        cmd::SET_COLUMN_ADDR,
        0,
        (geometry.width() - 1) as u8,
        cmd::SET_PAGE_ADDR,
        0,
        (geometry.pages() - 1) as u8,
    ]
}

/// Normal or inverse display command
pub const fn inversion(inverted: bool) -> u8 {
    if inverted {
        cmd::INVERT_DISPLAY
    } else {
        cmd::NORMAL_DISPLAY
    }
}

/// Display on or off command
pub const fn power(on: bool) -> u8 {
    if on {
        cmd::DISPLAY_ON
    } else {
        cmd::DISPLAY_OFF
    }
}

/// Horizontal scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    /// Content moves left
    Left,
    /// Content moves right
    Right,
}

/// Interval between scroll steps, in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollSpeed {
    Frames2,
    Frames3,
    Frames4,
    #[default]
    Frames5,
    Frames25,
    Frames64,
    Frames128,
    Frames256,
}

impl ScrollSpeed {
    /// Register encoding of the interval
    pub const fn bits(self) -> u8 {
        match self {
            ScrollSpeed::Frames5 => 0b000,
            ScrollSpeed::Frames64 => 0b001,
            ScrollSpeed::Frames128 => 0b010,
            ScrollSpeed::Frames256 => 0b011,
            ScrollSpeed::Frames3 => 0b100,
            ScrollSpeed::Frames4 => 0b101,
            ScrollSpeed::Frames25 => 0b110,
            ScrollSpeed::Frames2 => 0b111,
        }
    }
}

/// Set up and start a continuous horizontal scroll over a page range
///
/// Any running scroll is stopped first, as the controller requires.
pub fn horizontal_scroll(
    direction: ScrollDirection,
    start_page: u8,
    end_page: u8,
    speed: ScrollSpeed,
) -> [u8; 9] {
    let setup = match direction {
        ScrollDirection::Left => cmd::LEFT_HORIZONTAL_SCROLL,
        ScrollDirection::Right => cmd::RIGHT_HORIZONTAL_SCROLL,
    };
    [
        cmd::DEACTIVATE_SCROLL,
        setup,
        0x00, // Dummy
        start_page & 0x07,
        speed.bits(),
        end_page & 0x07,
        0x00, // Dummy
        0xFF, // Dummy
        cmd::ACTIVATE_SCROLL,
    ]
}
