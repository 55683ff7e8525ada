//! sessionlink-core: a compact, self-checking codec for editor session
//! state, packed into a single URL-fragment-safe string.
//!
//! The state is stored as follows:
//!
//! - a CRC-32 checksum of the rest, as a 6-character header — a sanity
//!   check, because long pasted URLs routinely gain or lose bytes;
//! - `console` | `autoReload` as one flag symbol;
//! - `middle` as the 11-character base64 window over its bit pattern;
//! - `selected` as a string;
//! - each file: compiler code, `name`, `content`;
//! - each shared link: kind code, `name`, `url`, and per patch group the
//!   edit script plus its four positional integers;
//! - all string *bytes*, concatenated in order of appearance and
//!   compressed separately (lz-string); only their lengths live in the
//!   structural stream above.
//!
//! All this density is so a whole session fits in a URL fragment without
//! blowing up the code base's complexity.
//!
//! # Modules
//!
//! - [`alphabet`]: the 64-symbol carrier alphabet
//! - [`varint`]: 5-bit-per-symbol u32 varints over that alphabet
//! - [`checksum`]: CRC-32 and the 6-character header
//! - [`compress`]: the external table-compression collaborator
//! - [`state`]: the round-tripped session model
//! - [`link`]: assembler and the tagged-container dispatcher
//! - [`detect`]: filename/URL classification helpers
//!
//! Encode and decode are pure functions of their input plus immutable
//! process-wide tables; calls from multiple threads are safe without
//! locking.
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod alphabet;
pub mod checksum;
mod codec;
pub mod compress;
pub mod detect;
pub mod error;
pub mod link;
pub mod state;
pub mod varint;
mod wire;

pub use compress::{Identity, LzString, TableCompressor};
pub use error::{LinkError, Result};
pub use link::{
    LinkReport, TAG_LEGACY, TAG_V1, V1Report, inspect_link, read_link, read_v1, read_v1_with,
    write_link, write_link_legacy, write_v1, write_v1_with,
};
pub use state::{Compiler, Edit, EditOp, LinkKind, PatchGroup, Session, SharedLink, SourceFile};
