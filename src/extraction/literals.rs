//! String operand scanning and decoding for PDF content streams.
//!
//! Content streams are scanned as Latin-1 text, so every `char` in a scanned segment maps to
//! exactly one source byte. Delimiters are ASCII, which keeps byte-level scanning aligned with
//! `char` boundaries.

/// A string operand located in a content stream, still in its encoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand<'a> {
    /// Body of a `( … )` literal string with escapes left intact.
    Literal(&'a str),
    /// Body of a `< … >` hexadecimal string.
    Hex(&'a str),
}

/// Locate every literal and hexadecimal string operand in `segment`, in source order.
///
/// Dictionary delimiters (`<<`) are skipped. An unterminated literal or hex string ends the
/// scan, since everything after it belongs to a truncated operand.
pub(crate) fn scan_operands(segment: &str) -> Vec<Operand<'_>> {
    let bytes = segment.as_bytes();
    let mut operands = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => {
                let Some(end) = literal_end(bytes, pos + 1) else {
                    break;
                };
                operands.push(Operand::Literal(&segment[pos + 1..end]));
                pos = end + 1;
            }
            b'<' if bytes.get(pos + 1) == Some(&b'<') => pos += 2,
            b'<' => {
                let Some(offset) = segment[pos + 1..].find('>') else {
                    break;
                };
                operands.push(Operand::Hex(&segment[pos + 1..pos + 1 + offset]));
                pos += offset + 2;
            }
            _ => pos += 1,
        }
    }

    operands
}

/// Find the closing parenthesis of a literal string whose body starts at `start`.
///
/// Balanced inner parentheses are part of the body; escaped ones never count.
fn literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = start;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                pos += 2;
                continue;
            }
            b'(' => depth += 1,
            b')' if depth == 0 => return Some(pos),
            b')' => depth -= 1,
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Decode a recovered operand into a content fragment, dropping positioning noise.
///
/// Returns `None` for undecodable hex bodies and for fragments that are shorter than two
/// characters or carry no ASCII letter.
pub(crate) fn recover_fragment(operand: Operand<'_>) -> Option<String> {
    let decoded = match operand {
        Operand::Literal(raw) => decode_literal(raw),
        Operand::Hex(raw) => decode_hex(raw)?,
    };
    let fragment = decoded.trim();
    is_content(fragment).then(|| fragment.to_string())
}

fn is_content(fragment: &str) -> bool {
    fragment.chars().nth(1).is_some() && fragment.chars().any(|c| c.is_ascii_alphabetic())
}

/// Apply literal-string escape rules.
///
/// Octal escapes are stripped rather than decoded: no code point mapping is attempted.
pub(crate) fn decode_literal(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('r') => decoded.push('\r'),
            Some('t') => decoded.push('\t'),
            Some('0'..='7') => {
                for _ in 0..2 {
                    if chars.next_if(|next| matches!(next, '0'..='7')).is_none() {
                        break;
                    }
                }
            }
            // line continuation
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\n') | None => {}
            Some(other) => decoded.push(other),
        }
    }

    decoded
}

/// Decode a hexadecimal string body into text.
///
/// Whitespace between digits is ignored and an odd trailing digit is padded with `0`. Bodies
/// starting with the `FE FF` byte order mark are read as UTF-16BE, everything else one byte per
/// character.
pub(crate) fn decode_hex(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.len() % 2 == 1 {
        digits.push('0');
    }

    let bytes = hex::decode(&digits).ok()?;
    if let Some(encoded) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = encoded
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }

    Some(bytes.into_iter().map(char::from).collect())
}
