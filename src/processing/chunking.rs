//! Boundary-aware chunking of extracted document text.
//!
//! Lengths are measured in characters. Text is split at the coarsest boundary that keeps every
//! chunk within the size limit:
//!
//! - Paragraphs (blank-line separated) are accumulated into a running chunk.
//! - A paragraph that alone exceeds the limit is split into sentences.
//! - A sentence that alone exceeds the limit is split into words; a word longer than the limit
//!   is cut into limit-sized pieces.
//!
//! Overlap is approximate: a closed chunk seeds the next one with its last `overlap / 6` words,
//! assuming roughly six characters per word including the separator. The seed loses leading
//! words until it fits alongside the next piece.
//!
//! Chunks shorter than [`MIN_CHUNK_CHARS`] are dropped as fragment noise, but at least one chunk
//! always survives for non-blank input.

use super::types::{Chunk, ChunkParams};

/// Chunks shorter than this are discarded unless nothing else remains.
pub const MIN_CHUNK_CHARS: usize = 50;

const AVERAGE_WORD_CHARS: usize = 6;
const PARAGRAPH_SEPARATOR: &str = "\n\n";
const WORD_SEPARATOR: &str = " ";

/// Chunk text with validated parameters.
pub fn chunk_text(text: &str, params: ChunkParams) -> Vec<Chunk> {
    tracing::debug!(
        max_size = params.max_size(),
        overlap = params.overlap(),
        overlap_words = params.overlap() / AVERAGE_WORD_CHARS,
        "Chunking text"
    );
    chunk(text, params.max_size(), params.overlap())
}

/// Chunk text into size-bounded, boundary-aware, overlapping pieces.
///
/// Never panics. A `max_size` of zero behaves like one; an `overlap` at or above `max_size`
/// carries as many words as fit. Validate parameters with [`ChunkParams::new`] beforehand.
pub fn chunk(text: &str, max_size: usize, overlap: usize) -> Vec<Chunk> {
    let max_size = max_size.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }
    if char_len(text) <= max_size {
        return vec![Chunk::new(0, text.to_string())];
    }

    let mut builder = ChunkBuilder::new(max_size, overlap / AVERAGE_WORD_CHARS);
    for paragraph in split_paragraphs(text) {
        builder.push_paragraph(paragraph);
    }

    drop_fragments(builder.finish())
        .into_iter()
        .enumerate()
        .map(|(index, content)| Chunk::new(index, content))
        .collect()
}

struct ChunkBuilder {
    max_size: usize,
    overlap_words: usize,
    closed: Vec<String>,
    current: String,
    current_len: usize,
}

impl ChunkBuilder {
    fn new(max_size: usize, overlap_words: usize) -> Self {
        Self {
            max_size,
            overlap_words,
            closed: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push_paragraph(&mut self, paragraph: &str) {
        if char_len(paragraph) <= self.max_size {
            self.push(paragraph, PARAGRAPH_SEPARATOR);
            return;
        }
        for (position, sentence) in split_sentences(paragraph).into_iter().enumerate() {
            let separator = if position == 0 {
                PARAGRAPH_SEPARATOR
            } else {
                WORD_SEPARATOR
            };
            self.push_sentence(sentence, separator);
        }
    }

    fn push_sentence(&mut self, sentence: &str, separator: &str) {
        if char_len(sentence) <= self.max_size {
            self.push(sentence, separator);
            return;
        }
        for (position, word) in sentence.split_whitespace().enumerate() {
            let separator = if position == 0 { separator } else { WORD_SEPARATOR };
            self.push_word(word, separator);
        }
    }

    fn push_word(&mut self, word: &str, separator: &str) {
        if char_len(word) <= self.max_size {
            self.push(word, separator);
            return;
        }
        for (position, piece) in split_oversized(word, self.max_size).into_iter().enumerate() {
            let separator = if position == 0 { separator } else { WORD_SEPARATOR };
            self.push(piece, separator);
        }
    }

    /// Append a piece no longer than `max_size`, closing the current chunk when it would overflow.
    fn push(&mut self, piece: &str, separator: &str) {
        let piece_len = char_len(piece);
        let separator_len = char_len(separator);

        if self.current.is_empty() {
            self.current.push_str(piece);
            self.current_len = piece_len;
            return;
        }
        if self.current_len + separator_len + piece_len <= self.max_size {
            self.current.push_str(separator);
            self.current.push_str(piece);
            self.current_len += separator_len + piece_len;
            return;
        }

        let closed = std::mem::take(&mut self.current);
        let budget = self.max_size.saturating_sub(piece_len + separator_len);
        let seed = self.overlap_seed(&closed, budget);
        self.closed.push(closed);

        if seed.is_empty() {
            self.current = piece.to_string();
            self.current_len = piece_len;
        } else {
            self.current_len = char_len(&seed) + separator_len + piece_len;
            self.current = seed;
            self.current.push_str(separator);
            self.current.push_str(piece);
        }
    }

    /// Last `overlap_words` words of `closed`, shortened from the front to fit `budget`.
    fn overlap_seed(&self, closed: &str, budget: usize) -> String {
        if self.overlap_words == 0 {
            return String::new();
        }
        let words: Vec<&str> = closed.split_whitespace().collect();
        let mut tail = &words[words.len().saturating_sub(self.overlap_words)..];
        while !tail.is_empty() && joined_len(tail) > budget {
            tail = &tail[1..];
        }
        tail.join(WORD_SEPARATOR)
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.closed.push(self.current);
        }
        self.closed
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }
}

/// Drop chunks below [`MIN_CHUNK_CHARS`], keeping the longest one when all are short.
///
/// The survivor is deliberately the longest rather than the shortest fragment; the first wins on
/// ties.
fn drop_fragments(chunks: Vec<String>) -> Vec<String> {
    let (kept, short): (Vec<String>, Vec<String>) = chunks
        .into_iter()
        .partition(|chunk| char_len(chunk) >= MIN_CHUNK_CHARS);
    if !kept.is_empty() {
        return kept;
    }
    short
        .into_iter()
        .reduce(|longest, chunk| {
            if char_len(&chunk) > char_len(&longest) {
                chunk
            } else {
                longest
            }
        })
        .into_iter()
        .collect()
}

/// Split on blank lines (lines containing only whitespace).
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            paragraphs.push(&text[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    paragraphs.push(&text[start..]);

    paragraphs
        .into_iter()
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

/// Split after `.`, `!` or `?` when followed by whitespace or the end of the text.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
            let end = idx + c.len_utf8();
            sentences.push(&paragraph[start..end]);
            start = end;
        }
    }
    sentences.push(&paragraph[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Cut a word into pieces of at most `max_size` characters.
fn split_oversized(word: &str, max_size: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (count, (idx, _)) in word.char_indices().enumerate() {
        if count > 0 && count % max_size == 0 {
            pieces.push(&word[start..idx]);
            start = idx;
        }
    }
    pieces.push(&word[start..]);
    pieces
}

fn joined_len(words: &[&str]) -> usize {
    words.iter().map(|word| char_len(word)).sum::<usize>() + words.len().saturating_sub(1)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
