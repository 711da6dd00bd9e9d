//! Combine operations
//!
//! Every buffer mutation merges new content into existing content with one
//! of these bitwise rules.

/// Bitwise rule used to merge new pixel data into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Op {
    /// Replace existing content
    #[default]
    Set,
    /// Turn pixels on
    Or,
    /// Keep only pixels present in both
    And,
    /// Erase pixels
    AndNot,
    /// Toggle pixels
    Xor,
}

impl Op {
    /// Combine a whole byte
    pub const fn combine(self, old: u8, bits: u8) -> u8 {
        match self {
            Op::Set => bits,
            Op::Or => old | bits,
            Op::And => old & bits,
            Op::AndNot => old & !bits,
            Op::Xor => old ^ bits,
        }
    }

    /// Applying twice gives the same result as applying once
    pub const fn is_idempotent(self) -> bool {
        !matches!(self, Op::Xor)
    }

    /// Combine only the bits selected by `mask`, leaving the rest untouched
    pub const fn apply_masked(self, old: u8, bits: u8, mask: u8) -> u8 {
        (old & !mask) | (self.combine(old, bits) & mask)
    }
}
