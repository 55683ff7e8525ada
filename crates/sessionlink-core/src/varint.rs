//! Variable-length u32 encoding over the carrier alphabet.
//!
//! Each emitted symbol carries 5 value bits (high) plus a continuation bit
//! (low; 1 = more symbols follow). Encoding starts at the most significant
//! non-zero 5-bit group, so every value has exactly one minimal encoding:
//! zero is a single symbol and a 32-bit value never needs more than 7.
//!
//! Decoding caps the symbol count at 7 and rejects any accumulation that
//! would shift value bits off the top, so a corrupt run of
//! continuation-bit-set symbols fails fast instead of looping or silently
//! wrapping.

use crate::alphabet;
use crate::error::{LinkError, Result};

/// Most symbols a 32-bit varint may occupy (ceil(32 / 5)).
const MAX_SYMBOLS: usize = 7;

/// Append the canonical varint encoding of `value` to `out`.
pub fn write_u32(out: &mut String, value: u32) {
    let bits = (32 - value.leading_zeros()).max(1);
    let groups = bits.div_ceil(5);
    for i in (0..groups).rev() {
        let group = ((value >> (i * 5)) & 0x1f) as u8;
        let more = u8::from(i > 0);
        out.push(alphabet::encode(group << 1 | more) as char);
    }
}

/// Read one varint from `input` starting at `*pos`, advancing `*pos` past it.
pub fn read_u32(input: &[u8], pos: &mut usize) -> Result<u32> {
    let mut value: u32 = 0;
    for _ in 0..MAX_SYMBOLS {
        let byte = *input.get(*pos).ok_or(LinkError::TruncatedInput)?;
        *pos += 1;
        let symbol = alphabet::decode(byte).ok_or(LinkError::InvalidSymbol(byte))?;
        if value >> 27 != 0 {
            return Err(LinkError::VarIntOverflow);
        }
        value = (value << 5) | u32::from(symbol >> 1);
        if symbol & 1 == 0 {
            return Ok(value);
        }
    }
    Err(LinkError::VarIntOverflow)
}
