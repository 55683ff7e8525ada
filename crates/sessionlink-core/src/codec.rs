//! The structural codec: record shapes and stream order.
//!
//! Write order (reads mirror it exactly):
//!
//! - flags symbol
//! - `middle` as an 11-character double window
//! - `selected` string length
//! - file list: compiler symbol, name length, content length
//! - link list: kind symbol, name length, url length, patch-group list
//!
//! Lists are a varint count followed by that many elements. A patch group is
//! one list whose body is the edit script (op symbol + text length each)
//! with the four positional integers `length1 length2 start1 start2`
//! appended as plain varints right after the declared elements. The trailer
//! is not counted in the list header; readers consume exactly the declared
//! number of edits and then always exactly four more integers. Deliberate
//! layout: it saves a second length prefix per group.
//!
//! Decoding is two-phase. Phase one walks the structural stream into a raw
//! skeleton of codes and lengths, which also pins down the exact byte where
//! the stream ends and the compressed table begins. Phase two slices every
//! string sequentially out of the decompressed table.

use crate::error::{LinkError, Result};
use crate::state::{Compiler, Edit, EditOp, LinkKind, PatchGroup, Session, SharedLink, SourceFile};
use crate::wire::{Reader, Table, Writer};

// =============================================================================
// Encode
// =============================================================================

/// Encode a session into `(structural_stream, string_table)`.
pub(crate) fn encode(session: &Session) -> (String, String) {
    let mut w = Writer::new();
    w.put_flags(session.console, session.auto_reload);
    w.put_double(session.middle);
    w.put_string(&session.selected);

    w.put_varint(session.files.len() as u32);
    for file in &session.files {
        w.put_symbol(file.compiler.wire_code());
        w.put_string(&file.name);
        w.put_string(&file.content);
    }

    w.put_varint(session.links.len() as u32);
    for link in &session.links {
        w.put_symbol(link.kind.wire_code());
        w.put_string(&link.name);
        w.put_string(&link.url);
        w.put_varint(link.patches.len() as u32);
        for patch in &link.patches {
            w.put_varint(patch.edits.len() as u32);
            for edit in &patch.edits {
                w.put_symbol(edit.op.wire_code());
                // Deleted text is implied by the source snapshot and never
                // stored; only insert/equal carry literal text.
                match edit.op {
                    EditOp::Delete => {
                        debug_assert!(edit.text.is_empty(), "delete edits carry no text");
                        w.put_string("");
                    }
                    EditOp::Equal | EditOp::Insert => w.put_string(&edit.text),
                }
            }
            w.put_varint(patch.length1);
            w.put_varint(patch.length2);
            w.put_varint(patch.start1);
            w.put_varint(patch.start2);
        }
    }

    (w.stream, w.table)
}

// =============================================================================
// Decode, phase one: walk the structural stream
// =============================================================================

/// Skeleton of a session: every code validated, every string still just a
/// length pointing into the not-yet-located table.
#[derive(Debug)]
pub(crate) struct RawSession {
    console: bool,
    auto_reload: bool,
    middle: f64,
    selected_len: u32,
    files: Vec<RawFile>,
    links: Vec<RawLink>,
}

#[derive(Debug)]
struct RawFile {
    compiler: Compiler,
    name_len: u32,
    content_len: u32,
}

#[derive(Debug)]
struct RawLink {
    kind: LinkKind,
    name_len: u32,
    url_len: u32,
    patches: Vec<RawPatchGroup>,
}

#[derive(Debug)]
struct RawPatchGroup {
    edits: Vec<RawEdit>,
    length1: u32,
    length2: u32,
    start1: u32,
    start2: u32,
}

#[derive(Debug)]
struct RawEdit {
    op: EditOp,
    text_len: u32,
}

/// Walk the structural stream. Returns the skeleton and the number of bytes
/// the stream occupied; whatever follows is the compressed table.
pub(crate) fn walk(stream: &[u8]) -> Result<(RawSession, usize)> {
    let mut r = Reader::new(stream);
    let (console, auto_reload) = r.take_flags()?;
    let middle = r.take_double()?;
    let selected_len = r.take_varint()?;

    let files = walk_list(&mut r, |r| {
        Ok(RawFile {
            compiler: Compiler::from_wire(r.take_symbol()?)?,
            name_len: r.take_varint()?,
            content_len: r.take_varint()?,
        })
    })?;

    let links = walk_list(&mut r, |r| {
        Ok(RawLink {
            kind: LinkKind::from_wire(r.take_symbol()?)?,
            name_len: r.take_varint()?,
            url_len: r.take_varint()?,
            patches: walk_list(r, walk_patch_group)?,
        })
    })?;

    let raw = RawSession {
        console,
        auto_reload,
        middle,
        selected_len,
        files,
        links,
    };
    Ok((raw, r.consumed()))
}

fn walk_patch_group(r: &mut Reader) -> Result<RawPatchGroup> {
    let edits = walk_list(r, |r| {
        Ok(RawEdit {
            op: EditOp::from_wire(r.take_symbol()?)?,
            text_len: r.take_varint()?,
        })
    })?;
    // The fixed four-integer trailer, always present after the edit script.
    Ok(RawPatchGroup {
        edits,
        length1: r.take_varint()?,
        length2: r.take_varint()?,
        start1: r.take_varint()?,
        start2: r.take_varint()?,
    })
}

/// Read a varint count and then that many elements.
///
/// Every element occupies at least one stream byte, so a count larger than
/// the remaining input can never be satisfied; reject it before reserving
/// anything.
fn walk_list<'a, T>(
    r: &mut Reader<'a>,
    mut element: impl FnMut(&mut Reader<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = r.take_varint()? as usize;
    if count > r.remaining() {
        return Err(LinkError::TruncatedInput);
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(element(r)?);
    }
    Ok(items)
}

// =============================================================================
// Decode, phase two: materialize from the table
// =============================================================================

/// Fill the skeleton's strings from the decompressed table, consuming it
/// exactly.
pub(crate) fn materialize(raw: RawSession, table: String) -> Result<Session> {
    let mut table = Table::new(table);

    let selected = table.take(raw.selected_len)?;

    let mut files = Vec::with_capacity(raw.files.len());
    for file in raw.files {
        files.push(SourceFile {
            compiler: file.compiler,
            name: table.take(file.name_len)?,
            content: table.take(file.content_len)?,
        });
    }

    let mut links = Vec::with_capacity(raw.links.len());
    for link in raw.links {
        let name = table.take(link.name_len)?;
        let url = table.take(link.url_len)?;
        let mut patches = Vec::with_capacity(link.patches.len());
        for patch in link.patches {
            let mut edits = Vec::with_capacity(patch.edits.len());
            for edit in patch.edits {
                edits.push(Edit {
                    op: edit.op,
                    text: table.take(edit.text_len)?,
                });
            }
            patches.push(PatchGroup {
                edits,
                length1: patch.length1,
                length2: patch.length2,
                start1: patch.start1,
                start2: patch.start2,
            });
        }
        links.push(SharedLink {
            kind: link.kind,
            name,
            url,
            patches,
        });
    }

    table.finish()?;

    Ok(Session {
        console: raw.console,
        auto_reload: raw.auto_reload,
        middle: raw.middle,
        selected,
        files,
        links,
    })
}
