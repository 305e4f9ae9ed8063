//! Sanitizer Property Tests
//!
//! Idempotence, forbidden-character removal and length bounds for any input.

use modmover::core::{is_forbidden, sanitize, FORBIDDEN_CHARS};
use proptest::prelude::*;

/// Titles mixing forbidden symbols, ASCII and multi-byte characters
fn title_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            prop::sample::select(FORBIDDEN_CHARS.to_vec()),
            any::<char>(),
            prop::char::range('a', 'z'),
        ],
        0..200,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Replacement characters that are themselves allowed
fn replacement_strategy() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("must not be forbidden", |c| !is_forbidden(*c))
}

proptest! {
    #[test]
    fn prop_sanitize_is_idempotent(
        title in title_strategy(),
        max_length in 1usize..120,
        replacement in replacement_strategy(),
    ) {
        let once = sanitize(&title, max_length, replacement);
        let twice = sanitize(&once, max_length, replacement);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_output_has_no_forbidden_chars(
        title in title_strategy(),
        max_length in 1usize..120,
        replacement in replacement_strategy(),
    ) {
        let result = sanitize(&title, max_length, replacement);
        prop_assert!(!result.chars().any(is_forbidden));
    }

    #[test]
    fn prop_output_respects_max_length(
        title in title_strategy(),
        max_length in 1usize..120,
    ) {
        let result = sanitize(&title, max_length, '_');
        prop_assert!(result.chars().count() <= max_length);
    }

    #[test]
    fn prop_short_titles_keep_positions(title in title_strategy()) {
        let result = sanitize(&title, usize::MAX, '_');
        prop_assert_eq!(result.chars().count(), title.chars().count());
        for (original, sanitized) in title.chars().zip(result.chars()) {
            if is_forbidden(original) {
                prop_assert_eq!(sanitized, '_');
            } else {
                prop_assert_eq!(sanitized, original);
            }
        }
    }
}

#[test]
fn test_documented_example() {
    assert_eq!(sanitize("A/B\\C?D", 90, '_'), "A_B_C_D");
}

#[test]
fn test_whitespace_preserved() {
    assert_eq!(sanitize("  padded  ", 90, '_'), "  padded  ");
}

#[test]
fn test_extension_not_counted() {
    // Truncation applies to the stem only; callers append the extension
    let stem = sanitize(&"x".repeat(100), 90, '_');
    assert_eq!(stem.len(), 90);
    assert_eq!(format!("{}.pak", stem).len(), 94);
}
