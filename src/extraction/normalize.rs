//! Output normalization applied to every recovered tier.

use super::patterns::Patterns;

const ALLOWED_PUNCTUATION: &str = ".,!?;:()[]{}'\"@#$%^&*+=-_<>/\\|`~";

/// Normalize recovered text: strip characters outside the whitelist, collapse horizontal
/// whitespace, keep at most one blank line between paragraphs, and trim.
pub(crate) fn normalize(patterns: &Patterns, raw: &str) -> String {
    let filtered: String = raw.chars().filter(|c| is_allowed(*c)).collect();
    let spaced = patterns.horizontal_space.replace_all(&filtered, " ");
    let lines = patterns.padded_newline.replace_all(&spaced, "\n");
    let paragraphs = patterns.excess_newlines.replace_all(&lines, "\n\n");
    paragraphs.trim().to_string()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || ALLOWED_PUNCTUATION.contains(c)
}
