//! Escaping for the writer, reference decoding for the parsers.
//!
//! Escaping follows the minimal rules the writer needs: text nodes escape
//! `<`, `&` and a `>` that would close a `]]>` sequence; attribute values
//! escape `<`, `&` and only the quote character that delimits them.
//! Unescaping decodes the five predefined entities and numeric character
//! references; no other entities are expanded.

use crate::model::QuoteStyle;
use memchr::{memchr2, memchr3, memmem};
use std::borrow::Cow;

/// Escapes character data for a text node.
///
/// Borrows the input when nothing needs escaping.
#[inline]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if memchr2(b'<', b'&', bytes).is_none() && memmem::find(bytes, b"]]>").is_none() {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + s.len() / 8);
    escape_text_to(s, &mut result);
    Cow::Owned(result)
}

/// Escapes character data for a text node and appends to the given string.
pub fn escape_text_to(s: &str, out: &mut String) {
    escape_text_continued_to(s, 0, out);
}

/// Like [`escape_text_to`], for text that directly follows character data
/// ending in `preceding_brackets` consecutive `]`.
///
/// A `>` that would complete `]]>` across the boundary is escaped too.
pub fn escape_text_continued_to(s: &str, preceding_brackets: usize, out: &mut String) {
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escaped = match byte {
            b'<' => "&lt;",
            b'&' => "&amp;",
            b'>' if closes_cdata_end(&bytes[..i], preceding_brackets) => "&gt;",
            _ => continue,
        };

        // Only ASCII bytes are escaped, so `start..i` lies on char boundaries.
        out.push_str(&s[start..i]);
        out.push_str(escaped);
        start = i + 1;
    }

    out.push_str(&s[start..]);
}

/// Whether a `>` after `before` would complete `]]>`.
#[inline]
fn closes_cdata_end(before: &[u8], preceding_brackets: usize) -> bool {
    let brackets = before.iter().rev().take(2).take_while(|&&b| b == b']').count();
    brackets == 2 || (brackets == before.len() && brackets + preceding_brackets >= 2)
}

/// Escapes an attribute value for the given quote style.
///
/// The other quote character is left as is.
#[inline]
pub fn escape_attribute_value(s: &str, quote: QuoteStyle) -> Cow<'_, str> {
    let quote_byte = quote.as_char() as u8;
    if memchr3(b'<', b'&', quote_byte, s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + s.len() / 8);
    escape_attribute_value_to(s, quote, &mut result);
    Cow::Owned(result)
}

/// Escapes an attribute value and appends to the given string.
pub fn escape_attribute_value_to(s: &str, quote: QuoteStyle, out: &mut String) {
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escaped = match (byte, quote) {
            (b'<', _) => "&lt;",
            (b'&', _) => "&amp;",
            (b'"', QuoteStyle::Double) => "&quot;",
            (b'\'', QuoteStyle::Single) => "&apos;",
            _ => continue,
        };

        out.push_str(&s[start..i]);
        out.push_str(escaped);
        start = i + 1;
    }

    out.push_str(&s[start..]);
}

/// Unescapes XML references in a string.
///
/// Borrows the input when it holds no references.
#[inline]
pub fn unescape(s: &str) -> Result<Cow<'_, str>, UnescapeError> {
    if !s.contains('&') {
        return Ok(Cow::Borrowed(s));
    }

    let mut result = String::with_capacity(s.len());
    unescape_to(s, &mut result)?;
    Ok(Cow::Owned(result))
}

/// A reference that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnescapeError {
    /// The invalid reference that caused the error.
    pub entity: String,
    /// Byte position in the input where the error occurred.
    pub position: usize,
}

impl std::fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid XML reference '{}' at position {}", self.entity, self.position)
    }
}

impl std::error::Error for UnescapeError {}

/// Unescapes XML references and appends to the given string.
pub fn unescape_to(s: &str, out: &mut String) -> Result<(), UnescapeError> {
    let mut rest = s;
    let mut offset = 0;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|&len| len > 0)
            .and_then(|len| decode_reference(&after[..len]).map(|c| (c, len)));

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &after[len + 1..];
                offset += amp + len + 2;
            }
            None => {
                let end = after.find(';').map_or(1, |len| len + 2);
                return Err(UnescapeError {
                    entity: rest[amp..(amp + end).min(rest.len())].to_string(),
                    position: offset + amp,
                });
            }
        }
    }

    out.push_str(rest);
    Ok(())
}

/// Decodes the body of a reference (the part between `&` and `;`).
#[inline]
fn decode_reference(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => decode_char_reference(entity.strip_prefix('#')?),
    }
}

/// Decodes a character reference body (`NNN` or `xHHH`).
#[inline]
fn decode_char_reference(digits: &str) -> Option<char> {
    let (radix, digits) = match digits.strip_prefix('x') {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let code = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(code).filter(|&c| crate::validator::is_char(c))
}
