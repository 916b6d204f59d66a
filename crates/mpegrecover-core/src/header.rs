//! Pack header detection.
//!
//! Only the leading nine bytes of a program-stream pack header matter here:
//!
//! ```text
//!    [4]      [5]      [6]      [7]      [8]
//! 01000100 00000000 00000100 00000000 00000100   marker bits
//!   ^^^ ^^ ^^^^^^^^ ^^^^^ ^^ ^^^^^^^^ ^^^^^      SCR bits 32..0
//! ```
//!
//! Bytes 0..4 hold the `00 00 01 BA` start code. Nothing else in the pack is
//! inspected; this is a cheap syntactic filter, not a parser.

use crate::timestamp::Timestamp;
use crate::{Error, Result};

/// Pack start code.
pub const PACK_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xBA];

/// Number of leading bytes needed to check markers and read the SCR.
pub const PACK_HEADER_LEN: usize = 9;

/// Check whether a block begins with a valid pack header.
pub fn is_valid(block: &[u8]) -> bool {
    if block.len() < PACK_HEADER_LEN || block[..4] != PACK_START_CODE {
        return false;
    }

    (block[4] >> 6) & 0b11 == 0b01
        && (block[4] >> 2) & 1 == 1
        && (block[6] >> 2) & 1 == 1
        && (block[8] >> 2) & 1 == 1
}

/// Read the SCR of a block, or `None` when the block has no valid pack header.
pub fn extract(block: &[u8]) -> Option<Timestamp> {
    if !is_valid(block) {
        return None;
    }
    Timestamp::from_bits(block)
}

/// Write a minimal pack header carrying `scr` into the start of `buf`.
///
/// Sets the start code, the marker bits and the SCR bits; all other header
/// bits are cleared. Used to synthesize test streams.
pub fn write_pack_header(buf: &mut [u8], scr: Timestamp) -> Result<()> {
    if buf.len() < PACK_HEADER_LEN {
        return Err(Error::BufferUnderflow {
            need: PACK_HEADER_LEN,
            have: buf.len(),
        });
    }

    buf[..4].copy_from_slice(&PACK_START_CODE);
    buf[4] = 0b0100_0100;
    buf[5] = 0;
    buf[6] = 0b0000_0100;
    buf[7] = 0;
    buf[8] = 0b0000_0100;
    scr.write_bits(buf)
}
