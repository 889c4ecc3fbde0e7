//! Outbound text length handling.

use std::borrow::Cow;

/// WhatsApp text message size limit.
pub const WHATSAPP_MAX_MESSAGE_LEN: usize = 4096;

/// Appended to replies that had to be cut down to fit the size limit.
pub const TRUNCATION_MARKER: &str = "...";

#[must_use]
pub fn truncate_at_char_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    &text[..text.floor_char_boundary(max_len)]
}

/// Cap `text` at `max_len` bytes, marking the cut.
///
/// Text within the limit is returned unchanged. Oversized text is cut at a
/// char boundary so that the marker still fits, keeping the result at or
/// under `max_len`.
#[must_use]
pub fn truncate_with_marker(text: &str, max_len: usize) -> Cow<'_, str> {
    if text.len() <= max_len {
        return Cow::Borrowed(text);
    }
    if max_len <= TRUNCATION_MARKER.len() {
        return Cow::Borrowed(truncate_at_char_boundary(text, max_len));
    }

    let cut = text.floor_char_boundary(max_len - TRUNCATION_MARKER.len());
    Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("short", 10, "short")]
    #[case("exact", 5, "exact")]
    #[case("abcdefghij", 8, "abcde...")]
    #[case("ééééé", 8, "éé...")]
    #[case("hi", 2, "hi")]
    #[case("hello", 2, "he")]
    #[case("", 4, "")]
    fn truncate_cases(#[case] input: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(truncate_with_marker(input, max), expected);
    }

    #[test]
    fn truncated_text_never_exceeds_limit() {
        let long = "a".repeat(WHATSAPP_MAX_MESSAGE_LEN + 500);
        let capped = truncate_with_marker(&long, WHATSAPP_MAX_MESSAGE_LEN);
        assert_eq!(capped.len(), WHATSAPP_MAX_MESSAGE_LEN);
        assert!(capped.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn text_at_limit_is_untouched() {
        let exact = "b".repeat(WHATSAPP_MAX_MESSAGE_LEN);
        let kept = truncate_with_marker(&exact, WHATSAPP_MAX_MESSAGE_LEN);
        assert_eq!(kept, exact);
        assert!(matches!(kept, Cow::Borrowed(_)));
    }

    #[test]
    fn boundary_cut_never_splits_chars() {
        // 4 bytes per char; a naive byte cut at 4093 would land mid-char.
        let long = "𝄞".repeat(2000);
        let capped = truncate_with_marker(&long, WHATSAPP_MAX_MESSAGE_LEN);
        assert!(capped.len() <= WHATSAPP_MAX_MESSAGE_LEN);
        assert!(capped.ends_with(TRUNCATION_MARKER));
        assert!(capped.is_char_boundary(capped.len() - TRUNCATION_MARKER.len()));
    }

    #[test]
    fn truncate_at_char_boundary_respects_utf8() {
        assert_eq!(truncate_at_char_boundary("héllo", 2), "h");
        assert_eq!(truncate_at_char_boundary("héllo", 3), "hé");
        assert_eq!(truncate_at_char_boundary("héllo", 99), "héllo");
    }
}
