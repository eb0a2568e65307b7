//! `AttValue ::= '"' ([^<&"] | Reference)* '"' | "'" ([^<&'] | Reference)* "'"`

use super::{drive, ParseResult, ParserCore, ParserOption, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::escape::unescape;
use crate::model::QuoteStyle;
use crate::validator::{is_char, is_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingQuote,
    ReadingValue,
}

/// Reads a quoted attribute value, closing quote included.
///
/// References are decoded; an unknown or malformed reference fails the
/// value with `&` as the termination character.
#[derive(Debug, Clone)]
pub struct AttributeValueParser {
    core: ParserCore,
    phase: Phase<State>,
    quote: QuoteStyle,
    value: String,
}

impl Default for AttributeValueParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeValueParser {
    /// Creates an uninitialized attribute value parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingQuote),
            quote: QuoteStyle::default(),
            value: String::new(),
        }
    }

    /// The decoded value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Moves the decoded value out.
    #[inline]
    pub fn take_value(&mut self) -> String {
        std::mem::take(&mut self.value)
    }

    /// The quote character the value was delimited by.
    #[inline]
    pub fn quote_style(&self) -> QuoteStyle {
        self.quote
    }

    fn execute(&mut self, state: State, buffer: &mut ParsingBuffer) -> Phase<State> {
        match state {
            State::ReadingQuote => self.read_quote(buffer),
            State::ReadingValue => self.read_value(buffer),
        }
    }

    fn read_quote(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if let Some(quote) = QuoteStyle::from_char(c) {
                self.quote = quote;
                buffer.increment_position();
                buffer.erase_to_current_position();
                return Phase::Scanning(State::ReadingValue);
            }
            if is_whitespace(c) && self.core.option() == ParserOption::IgnoreLeadingWhitespace {
                buffer.increment_position();
                buffer.erase_to_current_position();
                continue;
            }
            return Phase::Failed(Some(c));
        }
        Phase::Scanning(State::ReadingQuote)
    }

    fn read_value(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        let quote = self.quote.as_char();
        while let Some(c) = buffer.current_char() {
            if c == quote {
                let raw = buffer.substring(0, buffer.current_position());
                buffer.increment_position();
                buffer.erase_to_current_position();
                return match unescape(&raw) {
                    Ok(value) => {
                        self.value = value.into_owned();
                        Phase::Finished
                    }
                    Err(_) => Phase::Failed(Some('&')),
                };
            }
            if c == '<' || !is_char(c) {
                return Phase::Failed(Some(c));
            }
            buffer.increment_position();
        }
        Phase::Scanning(State::ReadingValue)
    }
}

impl TokenParser for AttributeValueParser {
    fn production(&self) -> &'static str {
        "attribute value"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingQuote);
        self.quote = QuoteStyle::default();
        self.value.clear();
    }

    fn accepts_option(&self, _option: ParserOption) -> bool {
        true
    }

    fn step(&mut self, buffer: &mut ParsingBuffer) -> ParseResult {
        let mut phase = self.phase;
        let result = drive(&mut phase, |state| self.execute(state, buffer));
        self.phase = phase;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::feed;

    fn parse_value(input: &str) -> (ParseResult, AttributeValueParser, ParsingBuffer) {
        let mut buffer = ParsingBuffer::new();
        let mut parser = AttributeValueParser::new();
        parser.initialize(&mut buffer, ParserOption::IgnoreLeadingWhitespace).unwrap();
        buffer.append(input);
        let result = parser.parse(&mut buffer);
        (result, parser, buffer)
    }

    #[test]
    fn test_double_quoted() {
        let (result, parser, buffer) = parse_value("\"1\"/>");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.value(), "1");
        assert_eq!(parser.quote_style(), QuoteStyle::Double);
        assert_eq!(buffer.current_char(), Some('/'));
    }

    #[test]
    fn test_single_quoted_keeps_other_quote() {
        let (result, parser, _) = parse_value("  'say \"hi\"'>");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.value(), "say \"hi\"");
        assert_eq!(parser.quote_style(), QuoteStyle::Single);
    }

    #[test]
    fn test_references_decoded() {
        let (result, parser, _) = parse_value("\"a &lt; b &amp;&#x41;\"");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.value(), "a < b &A");
    }

    #[test]
    fn test_empty_value() {
        let (result, parser, _) = parse_value("''");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.value(), "");
    }

    #[test]
    fn test_unquoted_rejected() {
        let (result, _, _) = parse_value("value");
        assert_eq!(result, ParseResult::Error(Some('v')));
    }

    #[test]
    fn test_lt_rejected() {
        let (result, _, _) = parse_value("\"a<b\"");
        assert_eq!(result, ParseResult::Error(Some('<')));
    }

    #[test]
    fn test_bad_reference_rejected() {
        let (result, _, _) = parse_value("\"a & b\"");
        assert_eq!(result, ParseResult::Error(Some('&')));
    }

    #[test]
    fn test_option_none_rejects_whitespace() {
        let mut buffer = ParsingBuffer::new();
        let mut parser = AttributeValueParser::new();
        parser.initialize(&mut buffer, ParserOption::None).unwrap();
        buffer.append(" '1'");
        assert_eq!(parser.parse(&mut buffer), ParseResult::Error(Some(' ')));
    }

    #[test]
    fn test_split_anywhere() {
        let input = " 'x &amp; y'>";
        for chunk in 1..input.len() {
            let mut buffer = ParsingBuffer::new();
            let mut parser = AttributeValueParser::new();
            parser.initialize(&mut buffer, ParserOption::IgnoreLeadingWhitespace).unwrap();
            assert_eq!(feed(&mut parser, &mut buffer, input, chunk), ParseResult::Success);
            assert_eq!(parser.value(), "x & y");
        }
    }
}
