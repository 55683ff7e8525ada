//! Integrity checksum and its 6-character header.
//!
//! Long URLs get mangled in transit (pasted with bytes missing, wrapped,
//! truncated), so everything after the header is covered by a CRC-32
//! (reversed polynomial `0xEDB88320`, init `0xFFFFFFFF`, final complement —
//! i.e. the plain IEEE CRC-32 that `crc32fast` computes). The four checksum
//! bytes travel big-endian through standard base64 with the padding
//! stripped: four bytes are exactly six symbols, so no `=` discrimination is
//! needed.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;

use crate::error::{LinkError, Result};

/// Length of the encoded checksum header in characters.
pub const HEADER_LEN: usize = 6;

/// CRC-32 over a contiguous byte range.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Encode a checksum as the 6-character link header.
#[must_use]
pub fn encode_header(crc: u32) -> String {
    STANDARD_NO_PAD.encode(crc.to_be_bytes())
}

/// Decode a 6-character link header back to its checksum.
pub fn decode_header(header: &str) -> Result<u32> {
    if header.len() != HEADER_LEN {
        return Err(LinkError::TruncatedInput);
    }
    let bytes = STANDARD_NO_PAD
        .decode(header)
        .map_err(|err| match err {
            base64::DecodeError::InvalidByte(_, byte)
            | base64::DecodeError::InvalidLastSymbol(_, byte) => LinkError::InvalidSymbol(byte),
            _ => LinkError::TruncatedInput,
        })?;
    let bytes: [u8; 4] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| LinkError::TruncatedInput)?;
    Ok(u32::from_be_bytes(bytes))
}
