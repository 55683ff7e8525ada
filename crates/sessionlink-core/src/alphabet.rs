//! The 64-symbol carrier alphabet.
//!
//! A fixed bijection between the values 0–63 and the ASCII characters
//! `0-9A-Za-z+/`, in that order. It carries two unrelated things: the digits
//! of the 5-bit varint encoding (`varint`) and small fixed-width codes such
//! as the flags bitset and the compiler/kind bytes. It is *not* the standard
//! base64 value order; the checksum header and the double window use the
//! real base64 engine instead.
//!
//! Decoding goes through a 128-entry table indexed by ASCII code point; any
//! code point outside the alphabet (including everything >= 0x80) maps to an
//! invalid marker.

/// Encode table: value -> ASCII character.
const ENCODE: [u8; 64] = *b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz+/";

/// Marker for positions in `DECODE` with no alphabet value.
const INV: u8 = 64;

/// Decode table: ASCII code point -> value, or `INV`.
const DECODE: [u8; 128] = {
    let mut table = [INV; 128];
    let mut value = 0;
    while value < 64 {
        table[ENCODE[value as usize] as usize] = value;
        value += 1;
    }
    table
};

/// Encode a 6-bit value as its alphabet character.
///
/// Values >= 64 are a programming error on the write path; the value is
/// masked so release builds still emit *some* symbol rather than panic.
#[must_use]
pub fn encode(value: u8) -> u8 {
    debug_assert!(value < 64, "alphabet value out of range: {value}");
    ENCODE[(value & 0x3f) as usize]
}

/// Decode an alphabet character back to its 6-bit value.
#[must_use]
pub fn decode(ch: u8) -> Option<u8> {
    if ch < 0x80 {
        let value = DECODE[ch as usize];
        if value != INV {
            return Some(value);
        }
    }
    None
}
