//! Start tags and empty-element tags.
//!
//! ```text
//! STag         ::= '<' Name (S Attribute)* S? '>'
//! EmptyElemTag ::= '<' Name (S Attribute)* S? '/>'
//! Attribute    ::= Name Eq AttValue
//! ```
//!
//! Input starts after the `<`.

use super::{
    drive, AttributeValueParser, NameParser, ParseResult, ParserCore, ParserOption, Phase,
    TokenParser,
};
use crate::buffer::ParsingBuffer;
use crate::error::Result;
use crate::model::{Attribute, AttributeList, Token, TokenKind};
use crate::validator::is_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingElementName,
    ReadingNextItem,
    ReadingAttributeName,
    ReadingEqualSign,
    ReadingAttributeValue,
    ReadingEndOfEmptyElement,
}

/// Parses a start tag or an empty-element tag with its attributes.
#[derive(Debug, Clone)]
pub struct StartOfElementParser {
    core: ParserCore,
    phase: Phase<State>,
    name_parser: NameParser,
    value_parser: AttributeValueParser,
    name: String,
    attribute_name: String,
    attributes: AttributeList,
    /// Whitespace seen since the element name or the last attribute.
    separated: bool,
}

impl Default for StartOfElementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StartOfElementParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingElementName),
            name_parser: NameParser::new(),
            value_parser: AttributeValueParser::new(),
            name: String::new(),
            attribute_name: String::new(),
            attributes: AttributeList::new(),
            separated: false,
        }
    }

    /// Element name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in encounter order.
    #[inline]
    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    fn execute(&mut self, state: State, buffer: &mut ParsingBuffer) -> Phase<State> {
        match state {
            State::ReadingElementName => self.read_element_name(buffer),
            State::ReadingNextItem => self.read_next_item(buffer),
            State::ReadingAttributeName => self.read_attribute_name(buffer),
            State::ReadingEqualSign => self.read_equal_sign(buffer),
            State::ReadingAttributeValue => self.read_attribute_value(buffer),
            State::ReadingEndOfEmptyElement => self.read_end_of_empty_element(buffer),
        }
    }

    fn finish(&mut self, buffer: &mut ParsingBuffer, kind: TokenKind) -> Phase<State> {
        buffer.increment_position();
        buffer.erase_to_current_position();
        self.core.set_token_kind(kind);
        Phase::Finished
    }

    fn read_element_name(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        match self.name_parser.parse(buffer) {
            ParseResult::NeedMoreData => Phase::Scanning(State::ReadingElementName),
            ParseResult::Error(c) => {
                self.name_parser.deinitialize();
                Phase::Failed(c)
            }
            ParseResult::Success => {
                self.name = self.name_parser.take_value();
                self.name_parser.deinitialize();

                match buffer.current_char() {
                    Some('>') => self.finish(buffer, TokenKind::StartOfElement),
                    Some('/') => {
                        buffer.increment_position();
                        buffer.erase_to_current_position();
                        Phase::Scanning(State::ReadingEndOfEmptyElement)
                    }
                    Some(c) if is_whitespace(c) => {
                        buffer.increment_position();
                        buffer.erase_to_current_position();
                        self.separated = true;
                        Phase::Scanning(State::ReadingNextItem)
                    }
                    other => Phase::Failed(other),
                }
            }
        }
    }

    fn read_next_item(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            match c {
                '>' => return self.finish(buffer, TokenKind::StartOfElement),
                '/' => {
                    buffer.increment_position();
                    buffer.erase_to_current_position();
                    return Phase::Scanning(State::ReadingEndOfEmptyElement);
                }
                c if is_whitespace(c) => {
                    buffer.increment_position();
                    buffer.erase_to_current_position();
                    self.separated = true;
                }
                // `a="1"b="2"`
                c if !self.separated => return Phase::Failed(Some(c)),
                _ => {
                    if self.name_parser.initialize(buffer, ParserOption::None).is_err() {
                        return Phase::Failed(None);
                    }
                    return Phase::Scanning(State::ReadingAttributeName);
                }
            }
        }
        Phase::Scanning(State::ReadingNextItem)
    }

    fn read_attribute_name(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        match self.name_parser.parse(buffer) {
            ParseResult::NeedMoreData => Phase::Scanning(State::ReadingAttributeName),
            ParseResult::Success => {
                self.attribute_name = self.name_parser.take_value();
                self.name_parser.deinitialize();
                Phase::Scanning(State::ReadingEqualSign)
            }
            ParseResult::Error(c) => {
                self.name_parser.deinitialize();
                Phase::Failed(c)
            }
        }
    }

    fn read_equal_sign(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if is_whitespace(c) {
                buffer.increment_position();
                buffer.erase_to_current_position();
                continue;
            }
            if c != '=' {
                return Phase::Failed(Some(c));
            }

            buffer.increment_position();
            if self
                .value_parser
                .initialize(buffer, ParserOption::IgnoreLeadingWhitespace)
                .is_err()
            {
                return Phase::Failed(None);
            }
            return Phase::Scanning(State::ReadingAttributeValue);
        }
        Phase::Scanning(State::ReadingEqualSign)
    }

    fn read_attribute_value(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        match self.value_parser.parse(buffer) {
            ParseResult::NeedMoreData => Phase::Scanning(State::ReadingAttributeValue),
            ParseResult::Success => {
                let name = std::mem::take(&mut self.attribute_name);
                let quote = self.value_parser.quote_style();
                let value = self.value_parser.take_value();
                self.attributes.add(Attribute::with_quote(name, value, quote));
                self.value_parser.deinitialize();
                self.separated = false;
                Phase::Scanning(State::ReadingNextItem)
            }
            ParseResult::Error(c) => {
                self.value_parser.deinitialize();
                Phase::Failed(c)
            }
        }
    }

    fn read_end_of_empty_element(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        match buffer.current_char() {
            Some('>') => self.finish(buffer, TokenKind::EmptyElement),
            Some(c) => Phase::Failed(Some(c)),
            None => Phase::Scanning(State::ReadingEndOfEmptyElement),
        }
    }
}

impl TokenParser for StartOfElementParser {
    fn production(&self) -> &'static str {
        "start tag"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingElementName);
        self.name_parser.deinitialize();
        self.value_parser.deinitialize();
        self.name.clear();
        self.attribute_name.clear();
        self.attributes.clear();
        self.separated = false;
    }

    fn start(&mut self, buffer: &mut ParsingBuffer) -> Result<()> {
        self.name_parser.initialize(buffer, ParserOption::None)
    }

    fn step(&mut self, buffer: &mut ParsingBuffer) -> ParseResult {
        let mut phase = self.phase;
        let result = drive(&mut phase, |state| self.execute(state, buffer));
        self.phase = phase;
        result
    }

    fn take_token(&mut self) -> Option<Token> {
        if self.phase != Phase::Finished {
            return None;
        }
        let name = std::mem::take(&mut self.name);
        let attributes = std::mem::take(&mut self.attributes);
        let token = match self.core.token_kind {
            Some(TokenKind::EmptyElement) => Token::EmptyElement { name, attributes },
            _ => Token::StartOfElement { name, attributes },
        };
        self.deinitialize();
        Some(token)
    }
}
