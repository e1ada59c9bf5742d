//! Compiled regular expressions shared by the extraction strategies.

use regex::Regex;

/// Pattern set compiled once per process by [`crate::extraction::init`].
#[derive(Debug)]
pub(crate) struct Patterns {
    /// `BT … ET` text object regions.
    pub(crate) text_object: Regex,
    /// A literal or hex string operand followed by the `Tj` operator.
    pub(crate) show_text: Regex,
    /// An operand array followed by the `TJ` operator.
    pub(crate) show_text_array: Regex,
    /// Body of a `stream … endstream` section.
    pub(crate) stream_body: Regex,
    /// Runs of printable ASCII.
    pub(crate) printable_run: Regex,
    /// Three or more consecutive ASCII letters.
    pub(crate) letter_run: Regex,
    /// Runs of whitespace other than newlines.
    pub(crate) horizontal_space: Regex,
    /// A newline with the spaces around it.
    pub(crate) padded_newline: Regex,
    /// Three or more consecutive newlines.
    pub(crate) excess_newlines: Regex,
}

impl Patterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            text_object: Regex::new(r"(?s)\bBT\b.*?\bET\b")?,
            show_text: Regex::new(r"(?s)(?:\((?:\\.|[^\\)])*\)|<[0-9A-Fa-f\s]*>)\s*Tj\b")?,
            show_text_array: Regex::new(r"(?s)\[[^\]]*\]\s*TJ\b")?,
            stream_body: Regex::new(r"(?s)\bstream(.*?)endstream")?,
            printable_run: Regex::new(r"[\x20-\x7E]+")?,
            letter_run: Regex::new(r"[A-Za-z]{3,}")?,
            horizontal_space: Regex::new(r"[^\S\n]+")?,
            padded_newline: Regex::new(r" ?\n ?")?,
            excess_newlines: Regex::new(r"\n{3,}")?,
        })
    }
}
