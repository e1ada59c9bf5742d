//! Tiered text recovery strategies.
//!
//! Each strategy inspects the whole Latin-1 decoded document and returns `None` when it found
//! nothing. Recovered text is grouped per content stream: the document is split at every
//! `endstream` keyword and each non-empty group becomes one paragraph of the output.

use super::{
    TextSource,
    literals::{recover_fragment, scan_operands},
    patterns::Patterns,
};

/// A single recovery tier.
pub(crate) type Strategy = fn(&Patterns, &str) -> Option<String>;

/// Recovery tiers in the order they are attempted.
pub(crate) const STRATEGIES: &[(TextSource, Strategy)] = &[
    (TextSource::TextObjects, text_objects),
    (TextSource::ShowTextOperators, show_text_operators),
    (TextSource::RawStreams, raw_streams),
];

const STREAM_DELIMITER: &str = "endstream";
const PAGE_SEPARATOR: &str = "\n\n";
const MIN_STREAM_RUN: usize = 6;

/// Recover string operands from `BT … ET` text objects.
pub(crate) fn text_objects(patterns: &Patterns, document: &str) -> Option<String> {
    per_stream(document, |segment| {
        patterns
            .text_object
            .find_iter(segment)
            .flat_map(|region| scan_operands(region.as_str()))
            .filter_map(recover_fragment)
            .collect()
    })
}

/// Recover operands of `Tj` and `TJ` invocations, wherever they appear.
pub(crate) fn show_text_operators(patterns: &Patterns, document: &str) -> Option<String> {
    per_stream(document, |segment| {
        let mut invocations: Vec<_> = patterns
            .show_text
            .find_iter(segment)
            .chain(patterns.show_text_array.find_iter(segment))
            .collect();
        invocations.sort_by_key(|invocation| invocation.start());

        invocations
            .into_iter()
            .flat_map(|invocation| scan_operands(invocation.as_str()))
            .filter_map(recover_fragment)
            .collect()
    })
}

/// Keep text-like printable runs from raw stream bodies.
pub(crate) fn raw_streams(patterns: &Patterns, document: &str) -> Option<String> {
    let pages: Vec<String> = patterns
        .stream_body
        .captures_iter(document)
        .filter_map(|captures| captures.get(1))
        .filter_map(|body| {
            let runs: Vec<&str> = patterns
                .printable_run
                .find_iter(body.as_str())
                .map(|run| run.as_str().trim())
                .filter(|run| looks_like_text(patterns, run))
                .collect();
            (!runs.is_empty()).then(|| runs.join(" "))
        })
        .collect();

    join_pages(pages)
}

/// Heuristic for printable runs found in binary data.
///
/// Requires a minimum length, a word-like run of letters, and a letter-or-space share of at
/// least 60%.
fn looks_like_text(patterns: &Patterns, run: &str) -> bool {
    if run.len() < MIN_STREAM_RUN || !patterns.letter_run.is_match(run) {
        return false;
    }
    let textual = run
        .bytes()
        .filter(|byte| byte.is_ascii_alphabetic() || *byte == b' ')
        .count();
    textual * 10 >= run.len() * 6
}

fn per_stream<F>(document: &str, mut fragments_of: F) -> Option<String>
where
    F: FnMut(&str) -> Vec<String>,
{
    let pages: Vec<String> = document
        .split(STREAM_DELIMITER)
        .filter_map(|segment| {
            let fragments = fragments_of(segment);
            (!fragments.is_empty()).then(|| fragments.join(" "))
        })
        .collect();

    join_pages(pages)
}

fn join_pages(pages: Vec<String>) -> Option<String> {
    if pages.is_empty() {
        None
    } else {
        Some(pages.join(PAGE_SEPARATOR))
    }
}
