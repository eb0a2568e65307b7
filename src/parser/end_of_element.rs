//! `ETag ::= '</' Name S? '>'`, input starts after the `</`.

use super::{drive, NameParser, ParseResult, ParserCore, ParserOption, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::error::Result;
use crate::model::{Token, TokenKind};
use crate::validator::is_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingElementName,
    ReadingEndOfElement,
}

/// Parses an end tag.
#[derive(Debug, Clone)]
pub struct EndOfElementParser {
    core: ParserCore,
    phase: Phase<State>,
    name_parser: NameParser,
    name: String,
}

impl Default for EndOfElementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EndOfElementParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingElementName),
            name_parser: NameParser::new(),
            name: String::new(),
        }
    }

    /// Element name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, state: State, buffer: &mut ParsingBuffer) -> Phase<State> {
        match state {
            State::ReadingElementName => match self.name_parser.parse(buffer) {
                ParseResult::NeedMoreData => Phase::Scanning(State::ReadingElementName),
                ParseResult::Success => {
                    self.name = self.name_parser.take_value();
                    self.name_parser.deinitialize();
                    Phase::Scanning(State::ReadingEndOfElement)
                }
                ParseResult::Error(c) => {
                    self.name_parser.deinitialize();
                    Phase::Failed(c)
                }
            },
            State::ReadingEndOfElement => {
                while let Some(c) = buffer.current_char() {
                    if is_whitespace(c) {
                        buffer.increment_position();
                        buffer.erase_to_current_position();
                        continue;
                    }
                    if c != '>' {
                        return Phase::Failed(Some(c));
                    }
                    buffer.increment_position();
                    self.core.set_token_kind(TokenKind::EndOfElement);
                    return Phase::Finished;
                }
                Phase::Scanning(State::ReadingEndOfElement)
            }
        }
    }
}

impl TokenParser for EndOfElementParser {
    fn production(&self) -> &'static str {
        "end tag"
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
        self.name.clear();
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
        self.deinitialize();
        Some(Token::EndOfElement { name })
    }
}
