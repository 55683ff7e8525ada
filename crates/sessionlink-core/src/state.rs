//! The round-tripped session state and its wire-code lookup tables.
//!
//! A `Session` is constructed fresh by the editor before a write and
//! reconstructed fresh on every read; the codec keeps no state between
//! calls. The serde derives exist for the legacy tag-0 JSON format and for
//! the CLI's JSON surface, and keep the original field names
//! (`autoReload`, `middle`, compiler strings `"ts"`/`"babel"`/... with JSON
//! `null` for no compiler).
//!
//! Both code tables are wider than their enum: compiler codes 0 and 1 are
//! both "no compiler", and link-kind codes 2 through 6 are all `Js`. The raw
//! stored value distinguishes sub-kinds for forward compatibility even
//! though only the logical value is exposed, so the aliases must stay.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LinkError, Result};

/// Editable-session state: everything one shareable link round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Console pane visible
    #[serde(default)]
    pub console: bool,
    /// Re-run on edit
    #[serde(default, rename = "autoReload")]
    pub auto_reload: bool,
    /// Split-pane divider position
    #[serde(default)]
    pub middle: f64,
    /// Name of the active file
    #[serde(default)]
    pub selected: String,
    /// Editable files, in tab order
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Shared external resources
    #[serde(default)]
    pub links: Vec<SharedLink>,
}

/// One editable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Compiler applied to the file, if any
    #[serde(default)]
    pub compiler: Compiler,
    /// Tab name
    pub name: String,
    /// File contents
    #[serde(default)]
    pub content: String,
}

/// One shared external resource with its diff annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLink {
    /// What the resource is loaded as
    #[serde(rename = "type")]
    pub kind: LinkKind,
    /// Display name
    pub name: String,
    /// Resource URL
    pub url: String,
    /// Local edits relative to the fetched resource
    #[serde(default)]
    pub patches: Vec<PatchGroup>,
}

/// Compiler applied to a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compiler {
    /// Plain source, no compile step
    #[default]
    None,
    TypeScript,
    Babel,
    LiveScript,
    CoffeeScript,
}

/// Code table for `Compiler`. Codes 0 and 1 both decode to `None`.
const COMPILER_TABLE: [Compiler; 6] = [
    Compiler::None,
    Compiler::None,
    Compiler::TypeScript,
    Compiler::Babel,
    Compiler::LiveScript,
    Compiler::CoffeeScript,
];

impl Compiler {
    /// Canonical code written to the stream.
    #[must_use]
    pub(crate) fn wire_code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::TypeScript => 2,
            Self::Babel => 3,
            Self::LiveScript => 4,
            Self::CoffeeScript => 5,
        }
    }

    /// Decode a raw stream code; out-of-table codes are malformed.
    pub(crate) fn from_wire(code: u8) -> Result<Self> {
        COMPILER_TABLE
            .get(code as usize)
            .copied()
            .ok_or(LinkError::InvalidTableIndex {
                what: "compiler",
                code,
                limit: COMPILER_TABLE.len(),
            })
    }

    /// The JSON tag: `null` for `None`, a short name otherwise.
    #[must_use]
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::TypeScript => Some("ts"),
            Self::Babel => Some("babel"),
            Self::LiveScript => Some("ls"),
            Self::CoffeeScript => Some("coffee"),
        }
    }

    /// Look a JSON tag back up. Unknown tags fall back to `None`, matching
    /// the original writer's tolerance for unrecognized compilers.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("ts") => Self::TypeScript,
            Some("babel") => Self::Babel,
            Some("ls") => Self::LiveScript,
            Some("coffee") => Self::CoffeeScript,
            _ => Self::None,
        }
    }
}

impl Serialize for Compiler {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.tag().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Compiler {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_tag(tag.as_deref()))
    }
}

/// How a shared resource is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Html,
    Css,
    Js,
}

/// Code table for `LinkKind`. Codes 2..=6 are all script sub-kinds and
/// decode to `Js`.
const KIND_TABLE: [LinkKind; 7] = [
    LinkKind::Html,
    LinkKind::Css,
    LinkKind::Js,
    LinkKind::Js,
    LinkKind::Js,
    LinkKind::Js,
    LinkKind::Js,
];

impl LinkKind {
    /// Canonical code written to the stream.
    #[must_use]
    pub(crate) fn wire_code(self) -> u8 {
        match self {
            Self::Html => 0,
            Self::Css => 1,
            Self::Js => 2,
        }
    }

    /// Decode a raw stream code; out-of-table codes are malformed.
    pub(crate) fn from_wire(code: u8) -> Result<Self> {
        KIND_TABLE
            .get(code as usize)
            .copied()
            .ok_or(LinkError::InvalidTableIndex {
                what: "link kind",
                code,
                limit: KIND_TABLE.len(),
            })
    }
}

/// One diff between two text snapshots.
///
/// `length1`/`length2` are the lengths of the two snapshots; `start1`/
/// `start2` are the offsets where the edit script begins. Unchanged
/// prefixes and suffixes outside those windows are not part of `edits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchGroup {
    /// The edit script
    pub edits: Vec<Edit>,
    pub length1: u32,
    pub length2: u32,
    pub start1: u32,
    pub start2: u32,
}

/// One operation within an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What the operation does
    pub op: EditOp,
    /// Literal text for `Insert`/`Equal`; always empty for `Delete`, whose
    /// text is recoverable only from the original snapshot.
    #[serde(default)]
    pub text: String,
}

impl Edit {
    /// An insertion of `text`.
    #[must_use]
    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            op: EditOp::Insert,
            text: text.into(),
        }
    }

    /// An unchanged run of `text`.
    #[must_use]
    pub fn equal(text: impl Into<String>) -> Self {
        Self {
            op: EditOp::Equal,
            text: text.into(),
        }
    }

    /// A deletion. The deleted text is not stored.
    #[must_use]
    pub fn delete() -> Self {
        Self {
            op: EditOp::Delete,
            text: String::new(),
        }
    }
}

/// Edit operation, in diff convention: delete -1, equal 0, insert 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Delete,
    Equal,
    Insert,
}

impl EditOp {
    /// Stream symbol: the op shifted into 0..=2.
    pub(crate) fn wire_code(self) -> u8 {
        match self {
            Self::Delete => 0,
            Self::Equal => 1,
            Self::Insert => 2,
        }
    }

    /// Decode a raw stream symbol.
    pub(crate) fn from_wire(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Delete),
            1 => Ok(Self::Equal),
            2 => Ok(Self::Insert),
            _ => Err(LinkError::InvalidTableIndex {
                what: "edit op",
                code,
                limit: 3,
            }),
        }
    }

    /// The diff-convention integer for this op.
    #[must_use]
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Delete => -1,
            Self::Equal => 0,
            Self::Insert => 1,
        }
    }
}

impl Serialize for EditOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_i8().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EditOp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match i8::deserialize(deserializer)? {
            -1 => Ok(Self::Delete),
            0 => Ok(Self::Equal),
            1 => Ok(Self::Insert),
            other => Err(D::Error::custom(format!("edit op out of range: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Wire code tables -------------------------------------------------------

    #[test]
    fn compiler_codes_round_trip_canonically() {
        for compiler in [
            Compiler::None,
            Compiler::TypeScript,
            Compiler::Babel,
            Compiler::LiveScript,
            Compiler::CoffeeScript,
        ] {
            assert_eq!(Compiler::from_wire(compiler.wire_code()), Ok(compiler));
        }
    }

    #[test]
    fn compiler_code_one_aliases_to_none() {
        assert_eq!(Compiler::from_wire(1), Ok(Compiler::None));
    }

    #[test]
    fn compiler_code_out_of_table_fails() {
        assert_eq!(
            Compiler::from_wire(6),
            Err(LinkError::InvalidTableIndex {
                what: "compiler",
                code: 6,
                limit: 6,
            })
        );
    }

    #[test]
    fn script_subkind_codes_alias_to_js() {
        for code in 2..=6 {
            assert_eq!(LinkKind::from_wire(code), Ok(LinkKind::Js));
        }
        assert_eq!(LinkKind::from_wire(0), Ok(LinkKind::Html));
        assert_eq!(LinkKind::from_wire(1), Ok(LinkKind::Css));
        assert!(LinkKind::from_wire(7).is_err());
    }

    #[test]
    fn edit_op_codes_are_op_plus_one() {
        assert_eq!(EditOp::Delete.wire_code(), 0);
        assert_eq!(EditOp::Equal.wire_code(), 1);
        assert_eq!(EditOp::Insert.wire_code(), 2);
        assert!(EditOp::from_wire(3).is_err());
        for op in [EditOp::Delete, EditOp::Equal, EditOp::Insert] {
            assert_eq!(EditOp::from_wire(op.wire_code()), Ok(op));
            assert_eq!(op.wire_code() as i8, op.as_i8() + 1);
        }
    }

    // -- Legacy JSON shape ------------------------------------------------------

    #[test]
    fn session_json_uses_original_field_names() {
        let session = Session {
            console: true,
            auto_reload: false,
            middle: 0.5,
            selected: "main".into(),
            files: vec![SourceFile {
                compiler: Compiler::TypeScript,
                name: "main.ts".into(),
                content: String::new(),
            }],
            links: vec![],
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["autoReload"], false);
        assert_eq!(json["middle"], 0.5);
        assert_eq!(json["files"][0]["compiler"], "ts");
    }

    #[test]
    fn no_compiler_serializes_as_null() {
        let file = SourceFile {
            compiler: Compiler::None,
            name: "index.html".into(),
            content: String::new(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert!(json["compiler"].is_null());
        let back: SourceFile = serde_json::from_value(json).unwrap();
        assert_eq!(back.compiler, Compiler::None);
    }

    #[test]
    fn unknown_compiler_tag_falls_back_to_none() {
        let file: SourceFile =
            serde_json::from_str(r#"{"compiler":"elm","name":"a","content":""}"#).unwrap();
        assert_eq!(file.compiler, Compiler::None);
    }

    #[test]
    fn link_kind_uses_lowercase_type_field() {
        let link = SharedLink {
            kind: LinkKind::Js,
            name: "lib".into(),
            url: "https://example.com/lib.js".into(),
            patches: vec![],
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "js");
    }

    #[test]
    fn edit_op_json_is_diff_convention() {
        assert_eq!(serde_json::to_value(EditOp::Delete).unwrap(), -1);
        assert_eq!(serde_json::to_value(EditOp::Insert).unwrap(), 1);
        let op: EditOp = serde_json::from_str("0").unwrap();
        assert_eq!(op, EditOp::Equal);
        assert!(serde_json::from_str::<EditOp>("2").is_err());
    }

    #[test]
    fn missing_optional_fields_default() {
        let session: Session = serde_json::from_str(r#"{"selected":"a"}"#).unwrap();
        assert!(!session.console);
        assert!(!session.auto_reload);
        assert_eq!(session.middle, 0.0);
        assert!(session.files.is_empty());
    }
}
