//! Title sanitization.
//!
//! Turns a raw workshop title into something every mainstream filesystem
//! accepts as a file stem. The transformation is deliberately small:
//! - each forbidden symbol is replaced one-to-one by a replacement char
//! - the result is cut to a maximum number of characters
//!
//! Nothing else is touched, including surrounding whitespace.

use serde::{Deserialize, Serialize};

/// Characters that are not allowed in file names on Windows (and `/` everywhere)
pub const FORBIDDEN_CHARS: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Knobs for [`sanitize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeOptions {
    /// Max characters in the stem (the extension is not counted)
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Character substituted for every forbidden symbol
    #[serde(default = "default_replacement_char")]
    pub replacement_char: char,
}

fn default_max_length() -> usize {
    90
}
fn default_replacement_char() -> char {
    '_'
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            replacement_char: default_replacement_char(),
        }
    }
}

impl SanitizeOptions {
    /// Apply these options to a raw title
    pub fn apply(&self, raw_title: &str) -> String {
        sanitize(raw_title, self.max_length, self.replacement_char)
    }
}

/// Check whether a character is in [`FORBIDDEN_CHARS`]
pub fn is_forbidden(c: char) -> bool {
    FORBIDDEN_CHARS.contains(&c)
}

/// Make a raw title filesystem-safe.
///
/// Length is counted in `char`s, not bytes, so multi-byte titles are never
/// split inside a code point.
pub fn sanitize(raw_title: &str, max_length: usize, replacement_char: char) -> String {
    raw_title
        .chars()
        .map(|c| if is_forbidden(c) { replacement_char } else { c })
        .take(max_length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_forbidden_char() {
        assert_eq!(sanitize("A/B\\C?D", 90, '_'), "A_B_C_D");
        assert_eq!(sanitize(r#"%*:|"<>"#, 90, '-'), "-------");
    }

    #[test]
    fn test_preserves_other_characters() {
        assert_eq!(sanitize("  Cool Mod! [v1.2]  ", 90, '_'), "  Cool Mod! [v1.2]  ");
    }

    #[test]
    fn test_truncates_by_chars_not_bytes() {
        let title = "ÄÖÜ".repeat(10);
        let result = sanitize(&title, 4, '_');
        assert_eq!(result, "ÄÖÜÄ");
        assert_eq!(result.chars().count(), 4);
    }

    #[test]
    fn test_default_options() {
        let opts = SanitizeOptions::default();
        assert_eq!(opts.max_length, 90);
        assert_eq!(opts.replacement_char, '_');
        assert_eq!(opts.apply("a:b"), "a_b");
    }
}
