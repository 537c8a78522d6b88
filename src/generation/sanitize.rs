//! Strips fenced code blocks from raw backend output.

use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";

/// A language tag directly after an opening fence, ended by whitespace.
static FENCE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_+\-]+\s").expect("Failed to compile fence tag regex")
});

/// Returns the payload of the first fenced block in `raw`, preferring a
/// language-tagged block (` ```json `) over a plain one. Fences pair up in
/// order, so text after a closing fence is never read as a tag. Without a
/// complete block the trimmed input is returned.
pub fn sanitize(raw: &str) -> String {
    let raw = raw.trim();

    let fences: Vec<usize> = raw.match_indices(FENCE).map(|(idx, _)| idx).collect();
    let blocks: Vec<&str> = fences
        .chunks_exact(2)
        .map(|pair| &raw[pair[0] + FENCE.len()..pair[1]])
        .collect();

    let tagged = blocks
        .iter()
        .find_map(|block| FENCE_TAG.find(block).map(|tag| &block[tag.end()..]));

    let payload = tagged.or_else(|| blocks.first().copied());

    payload.unwrap_or(raw).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fence() {
        let raw = "Sure! Here you go:\n```json\n[{\"question\": \"q\", \"answer\": \"a\"}]\n```\nEnjoy.";
        assert_eq!(sanitize(raw), r#"[{"question": "q", "answer": "a"}]"#);
    }

    #[test]
    fn test_plain_fence() {
        assert_eq!(sanitize("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_tagged_fence_preferred_over_earlier_plain_text() {
        let raw = "Output:\n```\nnot this\n```\n```json\n{}\n```";
        assert_eq!(sanitize(raw), "{}");
    }

    #[test]
    fn test_text_after_closing_fence_is_not_a_tag() {
        let raw = "```\n[{\"question\": \"q\", \"answer\": \"a\"}]\n```Done";
        assert_eq!(sanitize(raw), r#"[{"question": "q", "answer": "a"}]"#);
    }

    #[test]
    fn test_word_touching_both_fences_is_payload() {
        assert_eq!(sanitize("```true```"), "true");
    }

    #[test]
    fn test_tag_on_same_line_as_payload() {
        assert_eq!(sanitize("```json {\"a\": 1}```"), r#"{"a": 1}"#);
    }

    #[test]
    fn test_unclosed_fence_returns_input() {
        assert_eq!(sanitize("  ```json\n[1, 2]  "), "```json\n[1, 2]");
    }

    #[test]
    fn test_unfenced_is_trimmed() {
        assert_eq!(sanitize("\n  [] \t"), "[]");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "  plain text  ",
            "```json\n[]\n```",
            "```\n{\"a\": 1}\n```",
            "```json unclosed",
            "",
        ] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "not idempotent for {raw:?}");
        }
    }
}
