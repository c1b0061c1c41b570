use std::sync::LazyLock;

use regex::Regex;

/// Trailing "... more" truncation marker appended by the feed UI.
static TRUNCATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:\.\.\.|…)\s*more$").expect("truncation marker regex is valid")
});

/// Clean raw comment text: strip the trailing truncation marker and trim.
///
/// Markers are removed until none is left so the function is idempotent even
/// for text like `"a ... more ... more"`.
pub fn normalize(raw: &str) -> String {
    let mut text = raw.trim();
    while let Some(m) = TRUNCATION_MARKER.find(text) {
        text = text[..m.start()].trim();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trailing_marker_case_insensitive() {
        assert_eq!(normalize("hello world ... More"), "hello world");
        assert_eq!(normalize("hello world...MORE"), "hello world");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("  hi  "), "hi");
        assert_eq!(normalize("\n\tline\n"), "line");
    }

    #[test]
    fn test_marker_must_be_at_end() {
        assert_eq!(normalize("a...more inside b"), "a...more inside b");
    }

    #[test]
    fn test_marker_across_lines() {
        assert_eq!(normalize("first line\nsecond\n...\nmore"), "first line\nsecond");
    }

    #[test]
    fn test_unicode_ellipsis() {
        assert_eq!(normalize("nice shot… more"), "nice shot");
    }

    #[test]
    fn test_marker_only_becomes_empty() {
        assert_eq!(normalize("... more"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_does_not_strip_word_ending_in_more() {
        assert_eq!(normalize("forever...evermore"), "forever...evermore");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "hello world ... More",
            "a ... more ... more",
            "  spaced  ",
            "a...more inside b",
            "plain",
            "",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
        assert_eq!(normalize("a ... more ... more"), "a");
    }
}
