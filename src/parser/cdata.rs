//! `CDSect ::= '<![CDATA[' (Char* - (Char* ']]>' Char*)) ']]>'`
//!
//! Input starts after the `<![CDATA[`.

use super::{drive, ParseResult, ParserCore, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::model::{Token, TokenKind};
use crate::validator::is_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingContent,
}

/// Reads a CDATA section verbatim.
#[derive(Debug, Clone)]
pub struct CDataParser {
    core: ParserCore,
    phase: Phase<State>,
    content: String,
}

impl Default for CDataParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CDataParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingContent),
            content: String::new(),
        }
    }

    /// The section content.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    fn read_content(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if !is_char(c) {
                return Phase::Failed(Some(c));
            }

            let position = buffer.current_position();
            if c == '>'
                && position >= 2
                && buffer.at(position - 1) == Some(']')
                && buffer.at(position - 2) == Some(']')
            {
                self.content = buffer.substring(0, position - 2);
                buffer.increment_position();
                self.core.set_token_kind(TokenKind::CData);
                return Phase::Finished;
            }
            buffer.increment_position();
        }
        Phase::Scanning(State::ReadingContent)
    }
}

impl TokenParser for CDataParser {
    fn production(&self) -> &'static str {
        "CDATA section"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingContent);
        self.content.clear();
    }

    fn step(&mut self, buffer: &mut ParsingBuffer) -> ParseResult {
        let mut phase = self.phase;
        let result = drive(&mut phase, |State::ReadingContent| self.read_content(buffer));
        self.phase = phase;
        result
    }

    fn take_token(&mut self) -> Option<Token> {
        if self.phase != Phase::Finished {
            return None;
        }
        let content = std::mem::take(&mut self.content);
        self.deinitialize();
        Some(Token::CData(content))
    }
}
