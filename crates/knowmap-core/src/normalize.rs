//! Text normalization applied before a document is stored.
//!
//! Every run of non-word characters (anything other than Unicode
//! alphanumerics and `_`) collapses to a single space, the result is
//! lowercased, and the stored copy is capped at [`TEXT_CAP`] characters.
//!
//! ```rust
//! use knowmap_core::normalize::clean;
//!
//! assert_eq!(clean("Hello, World!"), "hello world ");
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::models::TEXT_CAP;

static NON_WORD: OnceLock<Regex> = OnceLock::new();

fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| Regex::new(r"\W+").expect("static regex is valid"))
}

/// Collapse non-word runs to a single space and lowercase.
pub fn clean(text: &str) -> String {
    non_word().replace_all(text, " ").to_lowercase()
}

/// Return the longest prefix of `text` holding at most `max_chars` characters.
///
/// Cuts on a `char` boundary, never inside a multi-byte sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Clean `text` and cap it at [`TEXT_CAP`] characters for storage.
pub fn normalize_for_storage(text: &str) -> String {
    let cleaned = clean(text);
    truncate_chars(&cleaned, TEXT_CAP).to_string()
}
