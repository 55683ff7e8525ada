//! Link assembly and the top-level format dispatcher.
//!
//! A link payload is laid out as:
//!
//! - a 6-character checksum header: the CRC-32 of everything after it,
//!   big-endian through standard base64 (four bytes are exactly six
//!   symbols, so the padding can go);
//! - the structural stream (see `codec`);
//! - the compressed string table.
//!
//! The structural stream is self-describing: walking its typed fields pins
//! down exactly where it ends, and whatever remains is the compressed
//! table. The checksum exists because long URLs routinely lose or gain
//! characters in transit; a mismatch is fatal and reported before anything
//! is decoded.
//!
//! Above that sits the tagged container `"<tag>=<payload>"`: tag `0` is the
//! legacy compressed-JSON format (no checksum), tag `1` is the format
//! above. [`read_link`] tolerates every failure by returning `None` — a
//! mangled link loses the session, it never crashes the consumer.

use serde::Serialize;
use tracing::debug;

use crate::checksum;
use crate::codec;
use crate::compress::{LzString, TableCompressor};
use crate::error::{LinkError, Result};
use crate::state::Session;

/// Format tag for the legacy compressed-JSON payload.
pub const TAG_LEGACY: u32 = 0;
/// Format tag for the checksummed binary payload.
pub const TAG_V1: u32 = 1;

// =============================================================================
// LinkV1 assembler
// =============================================================================

/// Encode a session as a LinkV1 payload (no tag prefix).
#[must_use]
pub fn write_v1(session: &Session) -> String {
    write_v1_with(session, &LzString)
}

/// [`write_v1`] with an explicit compression collaborator.
#[must_use]
pub fn write_v1_with(session: &Session, compressor: &impl TableCompressor) -> String {
    let (stream, table) = codec::encode(session);
    let mut payload = stream;
    if !table.is_empty() {
        payload.push_str(&compressor.compress(&table));
    }
    let mut link = checksum::encode_header(checksum::checksum(payload.as_bytes()));
    link.push_str(&payload);
    link
}

/// Decode a LinkV1 payload (no tag prefix) back into a session.
pub fn read_v1(link: &str) -> Result<Session> {
    read_v1_with(link, &LzString)
}

/// [`read_v1`] with an explicit compression collaborator.
pub fn read_v1_with(link: &str, compressor: &impl TableCompressor) -> Result<Session> {
    let (header, rest) = link
        .split_at_checked(checksum::HEADER_LEN)
        .ok_or(LinkError::TruncatedInput)?;
    let expected = checksum::decode_header(header)?;
    let computed = checksum::checksum(rest.as_bytes());
    if expected != computed {
        return Err(LinkError::ChecksumMismatch { expected, computed });
    }

    let (raw, consumed) = codec::walk(rest.as_bytes())?;
    // The walk only advances over validated ASCII, so this slice is safe.
    let packed_table = &rest[consumed..];
    let table = if packed_table.is_empty() {
        String::new()
    } else {
        compressor
            .decompress(packed_table)
            .ok_or(LinkError::Decompression)?
    };
    codec::materialize(raw, table)
}

// =============================================================================
// Tagged container
// =============================================================================

/// Encode a session as a tagged link, current format.
#[must_use]
pub fn write_link(session: &Session) -> String {
    format!("{TAG_V1}={}", write_v1(session))
}

/// Encode a session in the legacy compressed-JSON format.
///
/// Write-path failures are programming errors (the only way `Session` can
/// refuse JSON serialization is a non-finite `middle`), so this fails
/// loudly instead of returning a result.
#[must_use]
pub fn write_link_legacy(session: &Session) -> String {
    let json = serde_json::to_string(session)
        .expect("session state must be JSON-serializable (is `middle` non-finite?)");
    format!("{TAG_LEGACY}={}", LzString.compress(&json))
}

/// Decode any supported link into a session.
///
/// Accepts a bare `"<tag>=<payload>"` as well as a full share URL; anything
/// up to and including a `#` is ignored (no payload character can be `#`).
/// Unknown tags and every decode failure degrade to `None`.
#[must_use]
pub fn read_link(link: &str) -> Option<Session> {
    let link = link.split_once('#').map_or(link, |(_, fragment)| fragment);
    let Some((tag, payload)) = link.split_once('=') else {
        debug!("link has no format tag");
        return None;
    };
    match tag.parse::<u32>() {
        Ok(TAG_LEGACY) => read_legacy(payload),
        Ok(TAG_V1) => match read_v1(payload) {
            Ok(session) => Some(session),
            Err(err) => {
                debug!(%err, "unreadable v1 link");
                None
            }
        },
        _ => {
            debug!(tag, "unknown link format tag");
            None
        }
    }
}

fn read_legacy(payload: &str) -> Option<Session> {
    let json = LzString.decompress(payload)?;
    match serde_json::from_str(&json) {
        Ok(session) => Some(session),
        Err(err) => {
            debug!(%err, "unreadable legacy link");
            None
        }
    }
}

// =============================================================================
// Inspection
// =============================================================================

/// Diagnostic breakdown of a link, for the CLI's `inspect` command.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    /// Parsed format tag
    pub tag: u32,
    /// Payload length in characters (after the tag and `=`)
    pub payload_len: usize,
    /// Present for tag-1 links
    pub v1: Option<V1Report>,
}

/// Tag-1 specifics of a [`LinkReport`].
#[derive(Debug, Clone, Serialize)]
pub struct V1Report {
    /// Checksum decoded from the header, when the header itself parses
    pub header_checksum: Option<u32>,
    /// Checksum computed over everything after the header
    pub computed_checksum: u32,
    pub checksum_ok: bool,
    /// Structural-stream length in characters, when the stream walks
    pub stream_len: Option<usize>,
    /// Compressed-table length in characters, when the stream walks
    pub packed_table_len: Option<usize>,
}

/// Break a link down without fully decoding it. `None` when the container
/// shape (`"<tag>=<payload>"`) is missing.
#[must_use]
pub fn inspect_link(link: &str) -> Option<LinkReport> {
    let link = link.split_once('#').map_or(link, |(_, fragment)| fragment);
    let (tag, payload) = link.split_once('=')?;
    let tag: u32 = tag.parse().ok()?;
    let v1 = (tag == TAG_V1).then(|| {
        let (header, rest) = payload
            .split_at_checked(checksum::HEADER_LEN)
            .unwrap_or(("", payload));
        let header_checksum = checksum::decode_header(header).ok();
        let computed_checksum = checksum::checksum(rest.as_bytes());
        let walked = codec::walk(rest.as_bytes()).ok().map(|(_, consumed)| consumed);
        V1Report {
            header_checksum,
            computed_checksum,
            checksum_ok: header_checksum == Some(computed_checksum),
            stream_len: walked,
            packed_table_len: walked.map(|consumed| rest.len() - consumed),
        }
    });
    Some(LinkReport {
        tag,
        payload_len: payload.len(),
        v1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Identity;
    use crate::state::{Compiler, Edit, LinkKind, PatchGroup, SharedLink, SourceFile};

    fn scenario() -> Session {
        Session {
            console: true,
            auto_reload: false,
            middle: 0.5,
            selected: "main".into(),
            files: vec![SourceFile {
                compiler: Compiler::TypeScript,
                name: "main.ts".into(),
                content: "let x=1".into(),
            }],
            links: vec![],
        }
    }

    fn busy() -> Session {
        Session {
            console: false,
            auto_reload: true,
            middle: 0.75,
            selected: "app.js".into(),
            files: vec![
                SourceFile {
                    compiler: Compiler::None,
                    name: "index.html".into(),
                    content: "<main></main>".into(),
                },
                SourceFile {
                    compiler: Compiler::Babel,
                    name: "app.js".into(),
                    content: "render()".into(),
                },
            ],
            links: vec![SharedLink {
                kind: LinkKind::Js,
                name: "util".into(),
                url: "https://example.com/util.js".into(),
                patches: vec![PatchGroup {
                    edits: vec![Edit::equal("fn "), Edit::delete(), Edit::insert("g")],
                    length1: 40,
                    length2: 38,
                    start1: 3,
                    start2: 3,
                }],
            }],
        }
    }

    // -- Round trips ------------------------------------------------------------

    #[test]
    fn concrete_scenario_round_trips() {
        let session = scenario();
        let decoded = read_v1(&write_v1(&session)).unwrap();
        assert_eq!(decoded, session);
        assert_eq!(decoded.files[0].compiler, Compiler::TypeScript);
        assert_eq!(decoded.middle.to_bits(), session.middle.to_bits());
    }

    #[test]
    fn busy_session_round_trips() {
        let session = busy();
        assert_eq!(read_v1(&write_v1(&session)).unwrap(), session);
    }

    #[test]
    fn empty_session_round_trips() {
        let session = Session {
            console: false,
            auto_reload: false,
            middle: 0.0,
            selected: String::new(),
            files: vec![],
            links: vec![],
        };
        let link = write_v1(&session);
        // Nothing in the table: header + structural stream only.
        assert_eq!(read_v1(&link).unwrap(), session);
    }

    #[test]
    fn identity_compressor_round_trips() {
        let session = scenario();
        let link = write_v1_with(&session, &Identity);
        assert_eq!(read_v1_with(&link, &Identity).unwrap(), session);
        // The raw table is visible at the end of the payload.
        assert!(link.ends_with("mainmain.tslet x=1"));
    }

    // -- Checksum sensitivity ---------------------------------------------------

    #[test]
    fn any_payload_substitution_is_a_checksum_mismatch() {
        let link = write_v1(&scenario());
        let bytes = link.as_bytes();
        for pos in checksum::HEADER_LEN..link.len() {
            for replacement in [b'0', b'z', b'+'] {
                if bytes[pos] == replacement {
                    continue;
                }
                let mut corrupt = bytes.to_vec();
                corrupt[pos] = replacement;
                let corrupt = String::from_utf8(corrupt).unwrap();
                assert!(
                    matches!(
                        read_v1(&corrupt),
                        Err(LinkError::ChecksumMismatch { .. })
                    ),
                    "substitution at {pos} slipped past the checksum"
                );
            }
        }
    }

    #[test]
    fn header_corruption_fails() {
        let link = write_v1(&scenario());
        let mut corrupt = link.into_bytes();
        corrupt[0] = if corrupt[0] == b'A' { b'B' } else { b'A' };
        let corrupt = String::from_utf8(corrupt).unwrap();
        assert!(read_v1(&corrupt).is_err());
    }

    // -- Truncation -------------------------------------------------------------

    #[test]
    fn every_truncation_fails_and_never_misdecodes() {
        let link = write_v1(&busy());
        for len in 0..link.len() {
            let err = read_v1(&link[..len]).unwrap_err();
            assert!(
                matches!(
                    err,
                    LinkError::TruncatedInput | LinkError::ChecksumMismatch { .. }
                ),
                "truncation to {len} failed with unexpected {err:?}"
            );
        }
    }

    // -- Dispatcher -------------------------------------------------------------

    #[test]
    fn tagged_link_round_trips() {
        let session = busy();
        let link = write_link(&session);
        assert!(link.starts_with("1="));
        assert_eq!(read_link(&link), Some(session));
    }

    #[test]
    fn legacy_link_round_trips() {
        let session = scenario();
        let link = write_link_legacy(&session);
        assert!(link.starts_with("0="));
        assert_eq!(read_link(&link), Some(session));
    }

    #[test]
    fn full_share_url_is_accepted() {
        let session = scenario();
        let url = format!("https://flems.io/#{}", write_link(&session));
        assert_eq!(read_link(&url), Some(session));
    }

    #[test]
    fn unknown_tag_is_unreadable() {
        assert_eq!(read_link("7=whatever"), None);
        assert_eq!(read_link("x=whatever"), None);
    }

    #[test]
    fn missing_tag_is_unreadable() {
        assert_eq!(read_link("no-separator"), None);
        assert_eq!(read_link(""), None);
    }

    #[test]
    fn corrupted_payload_is_unreadable_not_partial() {
        let link = write_link(&busy());
        let truncated = &link[..link.len() - 1];
        assert_eq!(read_link(truncated), None);
        assert_eq!(read_link("0=!!!not-lz!!!"), None);
    }

    // -- Inspection -------------------------------------------------------------

    #[test]
    fn inspect_reports_a_healthy_link() {
        let link = write_link(&busy());
        let report = inspect_link(&link).unwrap();
        assert_eq!(report.tag, TAG_V1);
        let v1 = report.v1.unwrap();
        assert!(v1.checksum_ok);
        assert_eq!(v1.header_checksum, Some(v1.computed_checksum));
        assert!(v1.stream_len.unwrap() > 0);
        assert!(v1.packed_table_len.unwrap() > 0);
    }

    #[test]
    fn inspect_flags_a_corrupt_link() {
        let link = write_link(&busy());
        let mut corrupt = link.into_bytes();
        let last = corrupt.len() - 1;
        corrupt[last] = if corrupt[last] == b'a' { b'b' } else { b'a' };
        let corrupt = String::from_utf8(corrupt).unwrap();
        let report = inspect_link(&corrupt).unwrap();
        assert!(!report.v1.unwrap().checksum_ok);
    }

    #[test]
    fn inspect_legacy_has_no_v1_section() {
        let report = inspect_link(&write_link_legacy(&scenario())).unwrap();
        assert_eq!(report.tag, TAG_LEGACY);
        assert!(report.v1.is_none());
    }
}
