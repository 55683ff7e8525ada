//! The external compression collaborator for the string table.
//!
//! The format does not define the compression algorithm; it only relies on a
//! reversible transform from text to URL-safe text. Production links use
//! lz-string's encoded-URI-component variant (the `lz-str` crate), whose
//! output alphabet (`A-Za-z0-9+-$`) is fragment-safe. Tests can swap in
//! `Identity` to keep table bytes readable in the encoded output.

/// A reversible text transform producing URL-safe text.
///
/// Implementations must satisfy `decompress(compress(x)) == Some(x)` for
/// every string `x`; the codec relies on it and does not re-verify.
pub trait TableCompressor {
    /// Compress to URL-safe text.
    fn compress(&self, table: &str) -> String;

    /// Reverse [`compress`](Self::compress). `None` when the payload is not
    /// a valid compression of anything.
    fn decompress(&self, payload: &str) -> Option<String>;
}

/// The production collaborator: lz-string in URI-component encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzString;

impl TableCompressor for LzString {
    fn compress(&self, table: &str) -> String {
        lz_str::compress_to_encoded_uri_component(table)
    }

    fn decompress(&self, payload: &str) -> Option<String> {
        let wide = lz_str::decompress_from_encoded_uri_component(payload)?;
        String::from_utf16(&wide).ok()
    }
}

/// Pass-through collaborator for tests and debugging.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TableCompressor for Identity {
    fn compress(&self, table: &str) -> String {
        table.to_owned()
    }

    fn decompress(&self, payload: &str) -> Option<String> {
        Some(payload.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lz_round_trips() {
        // The assembler never hands an empty table to the collaborator, so
        // the empty string's edge behavior is deliberately not relied upon.
        let samples = [
            "a",
            "let x = 1\nlet y = 2\n",
            "<!doctype html><html><body></body></html>",
            "héllo wörld ✓",
        ];
        for sample in samples {
            let packed = LzString.compress(sample);
            assert_eq!(LzString.decompress(&packed).as_deref(), Some(sample));
        }
    }

    #[test]
    fn lz_output_is_url_fragment_safe() {
        let packed = LzString.compress("function add(a, b) { return a + b }\n".repeat(20).as_str());
        assert!(
            packed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+-$".contains(c)),
            "unexpected character in {packed:?}"
        );
    }

    #[test]
    fn identity_round_trips() {
        assert_eq!(Identity.decompress(&Identity.compress("abc")).as_deref(), Some("abc"));
    }
}
