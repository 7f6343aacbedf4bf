//! Filesystem-safe names

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("filename regex is valid"));

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
///
/// The result can never contain a path separator or `.`, so it is safe to use
/// as a single path component.
pub fn safe_name(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}
