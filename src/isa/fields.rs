//! Bitfield extraction from raw instruction words.
//!
//! Every function here is total over `u32` and side-effect free. Fields are
//! re-extracted on demand; nothing decoded is cached between cycles.
//!
//! The cast warnings below are allowed because each field is masked to at
//! most 6 bits before narrowing.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

/// Opcode, bits [31:26].
#[inline]
#[must_use]
pub fn opcode(word: u32) -> u8 {
    ((word >> 26) & 0x3F) as u8
}

/// Function code, bits [5:0].
#[inline]
#[must_use]
pub fn funct(word: u32) -> u8 {
    (word & 0x3F) as u8
}

/// First source register, bits [25:21].
#[inline]
#[must_use]
pub fn rs(word: u32) -> u8 {
    ((word >> 21) & 0x1F) as u8
}

/// Second source (or I-format destination) register, bits [20:16].
#[inline]
#[must_use]
pub fn rt(word: u32) -> u8 {
    ((word >> 16) & 0x1F) as u8
}

/// R-format destination register, bits [15:11].
#[inline]
#[must_use]
pub fn rd(word: u32) -> u8 {
    ((word >> 11) & 0x1F) as u8
}

/// Shift amount, bits [10:6].
#[inline]
#[must_use]
pub fn shamt(word: u32) -> u32 {
    (word >> 6) & 0x1F
}

/// Immediate, bits [15:0], sign-extended from bit 15.
#[inline]
#[must_use]
pub fn imm_signed(word: u32) -> i32 {
    i32::from(word as u16 as i16)
}

/// Immediate, bits [15:0], zero-extended. Used by andi/ori/xori/lui.
#[inline]
#[must_use]
pub fn imm_unsigned(word: u32) -> u32 {
    word & 0xFFFF
}

/// Jump target field, bits [25:0].
#[inline]
#[must_use]
pub fn target(word: u32) -> u32 {
    word & 0x03FF_FFFF
}
