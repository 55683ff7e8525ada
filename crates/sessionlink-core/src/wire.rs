//! Scalar codecs over the structural stream and the string table.
//!
//! `Writer` accumulates two buffers: the structural stream (typed fields and
//! lengths, all ASCII) and the string table (every string's raw bytes, in
//! the order their lengths were emitted). The table is compressed separately
//! by the assembler, which is the whole point of the split: the bulk text
//! compresses well, the structural symbols would only get in its way.
//!
//! `Reader` walks the structural stream; `Table` hands out string bytes
//! strictly sequentially. Strings are never stored inline in the stream.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;

use crate::alphabet;
use crate::error::{LinkError, Result};
use crate::varint;

/// Width of an encoded double in stream characters: 8 bytes of IEEE-754
/// through base64 is 11 symbols once the padding character is dropped.
const DOUBLE_LEN: usize = 11;

// =============================================================================
// Writer
// =============================================================================

/// Write-side accumulator for the structural stream and the string table.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    /// Structural stream: flags, double, varints, code symbols.
    pub(crate) stream: String,
    /// Raw string bytes, concatenated in emission order.
    pub(crate) table: String,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Emit one alphabet symbol (a 6-bit code) into the stream.
    pub(crate) fn put_symbol(&mut self, value: u8) {
        self.stream.push(alphabet::encode(value) as char);
    }

    /// Emit a varint into the stream.
    pub(crate) fn put_varint(&mut self, value: u32) {
        varint::write_u32(&mut self.stream, value);
    }

    /// Emit the UI flag bitset as one symbol. Bits 2..6 are reserved zero.
    pub(crate) fn put_flags(&mut self, console: bool, auto_reload: bool) {
        self.put_symbol(u8::from(console) | u8::from(auto_reload) << 1);
    }

    /// Emit a double as its 11-character base64 window (little-endian bits).
    pub(crate) fn put_double(&mut self, value: f64) {
        let encoded = STANDARD_NO_PAD.encode(value.to_le_bytes());
        debug_assert_eq!(encoded.len(), DOUBLE_LEN);
        self.stream.push_str(&encoded);
    }

    /// Emit a string: its byte length goes into the stream as a varint, its
    /// bytes go to the table.
    pub(crate) fn put_string(&mut self, text: &str) {
        debug_assert!(u32::try_from(text.len()).is_ok(), "string exceeds u32 bytes");
        self.put_varint(text.len() as u32);
        self.table.push_str(text);
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Read-side cursor over the structural stream.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes consumed so far; once the walk completes this is where the
    /// structural stream ends and the compressed table begins.
    pub(crate) fn consumed(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Read one alphabet symbol.
    pub(crate) fn take_symbol(&mut self) -> Result<u8> {
        let byte = *self.bytes.get(self.pos).ok_or(LinkError::TruncatedInput)?;
        self.pos += 1;
        alphabet::decode(byte).ok_or(LinkError::InvalidSymbol(byte))
    }

    /// Read one varint.
    pub(crate) fn take_varint(&mut self) -> Result<u32> {
        varint::read_u32(self.bytes, &mut self.pos)
    }

    /// Read the flag bitset: `(console, auto_reload)`. Reserved bits are
    /// ignored.
    pub(crate) fn take_flags(&mut self) -> Result<(bool, bool)> {
        let flags = self.take_symbol()?;
        Ok((flags & 1 != 0, flags & 2 != 0))
    }

    /// Read a double from its fixed 11-character window.
    pub(crate) fn take_double(&mut self) -> Result<f64> {
        if self.remaining() < DOUBLE_LEN {
            return Err(LinkError::TruncatedInput);
        }
        let window = &self.bytes[self.pos..self.pos + DOUBLE_LEN];
        self.pos += DOUBLE_LEN;
        let decoded = STANDARD_NO_PAD.decode(window).map_err(|err| match err {
            base64::DecodeError::InvalidByte(_, byte)
            | base64::DecodeError::InvalidLastSymbol(_, byte) => LinkError::InvalidSymbol(byte),
            _ => LinkError::TruncatedInput,
        })?;
        let bits: [u8; 8] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| LinkError::TruncatedInput)?;
        Ok(f64::from_le_bytes(bits))
    }
}

// =============================================================================
// Table
// =============================================================================

/// Sequential cursor over the decompressed string table.
///
/// Table bytes are consumed strictly in stream order and never randomly
/// addressed; after the last string, `finish` checks that nothing is left.
#[derive(Debug)]
pub(crate) struct Table {
    text: String,
    pos: usize,
}

impl Table {
    pub(crate) fn new(text: String) -> Self {
        Self { text, pos: 0 }
    }

    /// Slice the next `len` bytes off the table as an owned string.
    ///
    /// Fails with `TruncatedInput` when the table is too short or the slice
    /// would split a UTF-8 sequence (possible only for corrupt input).
    pub(crate) fn take(&mut self, len: u32) -> Result<String> {
        let end = self
            .pos
            .checked_add(len as usize)
            .ok_or(LinkError::TruncatedInput)?;
        let slice = self
            .text
            .get(self.pos..end)
            .ok_or(LinkError::TruncatedInput)?;
        self.pos = end;
        Ok(slice.to_owned())
    }

    /// Assert the table was consumed exactly.
    pub(crate) fn finish(self) -> Result<()> {
        let unread = self.text.len() - self.pos;
        if unread == 0 {
            Ok(())
        } else {
            Err(LinkError::TrailingTableBytes { unread })
        }
    }
}
