//! XML 1.0 character classes and composite validators.
//!
//! The per-character predicates are called by the sub-parsers on every code
//! point to decide whether the current production continues; the string
//! validators check an already extracted value in bulk before it is accepted
//! (and before the writer emits it).

use crate::escape::unescape;
use crate::model::QuoteStyle;
use memchr::memmem;

/// ASCII lookup flags.
const WHITESPACE: u8 = 0b001;
const NAME_START: u8 = 0b010;
const NAME: u8 = 0b100;

static ASCII_CLASS: [u8; 128] = {
    let mut lut = [0u8; 128];
    lut[b' ' as usize] = WHITESPACE;
    lut[b'\t' as usize] = WHITESPACE;
    lut[b'\n' as usize] = WHITESPACE;
    lut[b'\r' as usize] = WHITESPACE;
    let mut i = b'A';
    while i <= b'Z' {
        lut[i as usize] = NAME_START | NAME;
        lut[(i + 32) as usize] = NAME_START | NAME;
        i += 1;
    }
    let mut i = b'0';
    while i <= b'9' {
        lut[i as usize] = NAME;
        i += 1;
    }
    lut[b'_' as usize] = NAME_START | NAME;
    lut[b':' as usize] = NAME_START | NAME;
    lut[b'-' as usize] = NAME;
    lut[b'.' as usize] = NAME;
    lut
};

/// `S ::= (#x20 | #x9 | #xD | #xA)+`
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c.is_ascii() && ASCII_CLASS[c as usize] & WHITESPACE != 0
}

/// ```text
/// NameStartChar ::= ":" | [A-Z] | "_" | [a-z] | [#xC0-#xD6] | [#xD8-#xF6] |
///                   [#xF8-#x2FF] | [#x370-#x37D] | [#x37F-#x1FFF] |
///                   [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] |
///                   [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] |
///                   [#x10000-#xEFFFF]
/// ```
#[inline]
pub fn is_name_start_char(c: char) -> bool {
    if c.is_ascii() {
        return ASCII_CLASS[c as usize] & NAME_START != 0;
    }
    matches!(c,
        '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// `NameChar ::= NameStartChar | "-" | "." | [0-9] | #xB7 | [#x0300-#x036F] | [#x203F-#x2040]`
#[inline]
pub fn is_name_char(c: char) -> bool {
    if c.is_ascii() {
        return ASCII_CLASS[c as usize] & NAME != 0;
    }
    is_name_start_char(c)
        || matches!(c, '\u{B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
///
/// Surrogates cannot occur in a `char`, so only the control characters and
/// the two non-characters at the end of the BMP are excluded.
#[inline]
pub fn is_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Validates a complete `Name`.
pub fn validate_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// `Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'`
///
/// Validates the text between the delimiters.
pub fn validate_comment(text: &str) -> bool {
    text.chars().all(is_char) && !text.contains("--") && !text.ends_with('-')
}

/// `PITarget ::= Name - (('X' | 'x') ('M' | 'm') ('L' | 'l'))`
pub fn validate_pi_target(target: &str) -> bool {
    validate_name(target) && !is_xml_declaration_target(target)
}

/// Returns `true` for the target reserved for the XML declaration.
#[inline]
pub fn is_xml_declaration_target(target: &str) -> bool {
    target.eq_ignore_ascii_case("xml")
}

/// `PIData ::= Char* - (Char* '?>' Char*)`
pub fn validate_pi_data(data: &str) -> bool {
    data.chars().all(is_char) && !data.contains("?>")
}

/// Validates an escaped attribute value as it appears between its quotes.
///
/// `AttValue ::= '"' ([^<&"] | Reference)* '"' | "'" ([^<&'] | Reference)* "'"`
pub fn validate_attribute_value(value: &str, quote: QuoteStyle) -> bool {
    let quote = quote.as_char();
    value.chars().all(|c| is_char(c) && c != '<' && c != quote) && references_well_formed(value)
}

/// Validates escaped character data of a text node.
///
/// `CharData ::= [^<&]* - ([^<&]* ']]>' [^<&]*)`, interleaved with references.
pub fn validate_text_node(text: &str) -> bool {
    text.chars().all(|c| is_char(c) && c != '<')
        && memmem::find(text.as_bytes(), b"]]>").is_none()
        && references_well_formed(text)
}

/// `CData ::= (Char* - (Char* ']]>' Char*))`
pub fn validate_cdata(data: &str) -> bool {
    data.chars().all(is_char) && memmem::find(data.as_bytes(), b"]]>").is_none()
}

/// Every `&` must open a reference this crate can decode.
#[inline]
fn references_well_formed(s: &str) -> bool {
    !s.contains('&') || unescape(s).is_ok()
}
