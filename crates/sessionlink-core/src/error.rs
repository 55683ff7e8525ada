//! Error types for sessionlink-core.
//!
//! Every decode failure is terminal for the whole operation: there is no
//! partial-state recovery. The link dispatcher (`link::read_link`) catches
//! all of these and degrades to "no state recovered", so a hand-edited or
//! corrupted URL can lose a session but never crash the consumer.

use thiserror::Error;

/// Result type alias using the library's error type
pub type Result<T> = std::result::Result<T, LinkError>;

/// Decode-side failures for the LinkV1 wire format
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The 6-character header does not match the CRC-32 of the payload
    #[error("checksum mismatch: header {expected:#010x}, payload {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum decoded from the header
        expected: u32,
        /// Checksum computed over everything after the header
        computed: u32,
    },

    /// The input ended before a length-prefixed field or list was complete
    #[error("input truncated mid-structure")]
    TruncatedInput,

    /// A byte outside the 64-symbol alphabet where a symbol was expected
    #[error("byte {0:#04x} is not an alphabet symbol")]
    InvalidSymbol(u8),

    /// A varint ran past the 7-symbol cap or past 32 bits of value
    #[error("varint exceeds 32 bits")]
    VarIntOverflow,

    /// A compiler/kind/op code with no corresponding lookup-table entry
    #[error("{what} code {code} out of range (table holds {limit} entries)")]
    InvalidTableIndex {
        /// Which table the code indexed
        what: &'static str,
        /// The raw code read from the stream
        code: u8,
        /// Number of entries in the table
        limit: usize,
    },

    /// The external collaborator rejected the compressed string table
    #[error("string table failed to decompress")]
    Decompression,

    /// The decompressed table was longer than the summed string lengths
    #[error("{unread} table bytes left unread")]
    TrailingTableBytes {
        /// Bytes remaining after the last string was sliced
        unread: usize,
    },
}
