//! Filename and URL classification helpers.
//!
//! Small predicates the editor boundary uses when deciding how to treat a
//! file or a pasted resource. They have no bearing on the wire format.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://").unwrap());
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w\-.]*$").unwrap());

/// The extension of a filename, without the dot.
#[must_use]
pub fn ext(name: &str) -> Option<&str> {
    let index = name.rfind('.')?;
    Some(&name[index + 1..])
}

#[must_use]
pub fn is_js(name: &str) -> bool {
    name.ends_with(".js")
}

#[must_use]
pub fn is_ts(name: &str) -> bool {
    name.ends_with(".ts")
}

#[must_use]
pub fn is_ls(name: &str) -> bool {
    name.ends_with(".ls")
}

#[must_use]
pub fn is_coffee(name: &str) -> bool {
    name.ends_with(".coffee")
}

#[must_use]
pub fn is_css(name: &str) -> bool {
    name.ends_with(".css")
}

#[must_use]
pub fn is_html(name: &str) -> bool {
    name.ends_with(".html")
}

/// Any of the script flavors the editor can run.
#[must_use]
pub fn is_script(name: &str) -> bool {
    is_js(name) || is_ts(name) || is_ls(name) || is_coffee(name)
}

/// Does the text look like an http(s) URL?
#[must_use]
pub fn is_url(text: &str) -> bool {
    URL_RE.is_match(text)
}

/// Is the text safe to use as a tab filename?
#[must_use]
pub fn is_valid_filename(name: &str) -> bool {
    FILENAME_RE.is_match(name)
}
