//! CRC-8 used by the sensor to protect measurement frames.
//!
//! The generator is `x⁸ + x⁵ + x⁴ + 1` (`0x131`, bit pattern `1 0011 0001`),
//! initial value zero, no reflection. A frame is validated by long division
//! of the 24-bit word `data_high | data_low | checksum`: for each of the 16
//! data bit positions (23 down to 8), a set bit is cleared by XOR-ing the
//! generator aligned on that position. A valid frame leaves no residue.
//!
//! # Reference values
//!
//! ```text
//! 0x683A -> 0x7C
//! 0x4E85 -> 0x6B
//! ```
use crate::core::RawFrame;


/// Generator polynomial, including the implicit x⁸ term.
pub const GENERATOR: u32 = 0x131;

/// Generator aligned so that its top bit sits on bit 23 of the register.
const ALIGNED_GENERATOR: u32 = GENERATOR << 15;

/// Divide a 24-bit register by the generator and return the remainder.
///
/// Only the 16 most significant positions are reduced, so the remainder
/// always fits in the low 8 bits.
#[inline]
pub const fn residue(register: u32) -> u8 {
    let mut message = register & 0x00FF_FFFF;
    let mut divisor = ALIGNED_GENERATOR;
    let mut bit = 23;
    while bit > 7 {
        if message & (1 << bit) != 0 {
            message ^= divisor;
        }
        divisor >>= 1;
        bit -= 1;
    }
    message as u8
}

/// Checksum the sensor appends after `value`.
#[inline]
pub const fn checksum(value: u16) -> u8 {
    residue((value as u32) << 8)
}

/// Build the 3-byte frame the sensor would send for `value`.
#[inline]
pub const fn encode(value: u16) -> RawFrame {
    RawFrame::new(value, checksum(value))
}

/// Residue of a received frame; zero means the frame is intact.
#[inline]
pub const fn frame_residue(frame: &RawFrame) -> u8 {
    residue(frame.as_register())
}

/// `true` when the frame's checksum matches its payload.
#[inline]
pub const fn is_valid(frame: &RawFrame) -> bool {
    frame_residue(frame) == 0
}
