//! `<!DOCTYPE name>` without external identifiers or an internal subset.
//!
//! Input starts after `<!DOCTYPE`.

use super::{drive, NameParser, ParseResult, ParserCore, ParserOption, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::error::Result;
use crate::model::{DocumentType, Token, TokenKind};
use crate::validator::is_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingName,
    ReadingEnd,
}

/// Parses a document type declaration that names the root element.
#[derive(Debug, Clone)]
pub struct DocumentTypeParser {
    core: ParserCore,
    phase: Phase<State>,
    name_parser: NameParser,
    document_type: DocumentType,
}

impl Default for DocumentTypeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTypeParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingName),
            name_parser: NameParser::new(),
            document_type: DocumentType::default(),
        }
    }

    /// The declaration read so far.
    #[inline]
    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    fn execute(&mut self, state: State, buffer: &mut ParsingBuffer) -> Phase<State> {
        match state {
            State::ReadingName => match self.name_parser.parse(buffer) {
                ParseResult::NeedMoreData => Phase::Scanning(State::ReadingName),
                ParseResult::Success => {
                    self.document_type.name = self.name_parser.take_value();
                    self.name_parser.deinitialize();
                    Phase::Scanning(State::ReadingEnd)
                }
                ParseResult::Error(c) => {
                    self.name_parser.deinitialize();
                    Phase::Failed(c)
                }
            },
            State::ReadingEnd => {
                while let Some(c) = buffer.current_char() {
                    if is_whitespace(c) {
                        buffer.increment_position();
                        buffer.erase_to_current_position();
                        continue;
                    }
                    if c != '>' || !self.document_type.is_valid() {
                        return Phase::Failed(Some(c));
                    }
                    buffer.increment_position();
                    self.core.set_token_kind(TokenKind::DocumentType);
                    return Phase::Finished;
                }
                Phase::Scanning(State::ReadingEnd)
            }
        }
    }
}

impl TokenParser for DocumentTypeParser {
    fn production(&self) -> &'static str {
        "document type declaration"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingName);
        self.name_parser.deinitialize();
        self.document_type.name.clear();
    }

    fn start(&mut self, buffer: &mut ParsingBuffer) -> Result<()> {
        self.name_parser.initialize(buffer, ParserOption::IgnoreLeadingWhitespace)
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
        let document_type = std::mem::take(&mut self.document_type);
        self.deinitialize();
        Some(Token::DocumentType(document_type))
    }
}
