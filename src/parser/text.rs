//! Character data between markup, `CharData ::= [^<&]* - ([^<&]* ']]>' [^<&]*)`
//! interleaved with references.

use super::{drive, ParseResult, ParserCore, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::escape::unescape;
use crate::model::{Token, TokenKind};
use crate::validator::is_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingText,
}

/// Reads text up to, not including, the next `<`.
#[derive(Debug, Clone)]
pub struct TextParser {
    core: ParserCore,
    phase: Phase<State>,
    text: String,
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TextParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingText),
            text: String::new(),
        }
    }

    /// The text with references decoded.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn read_text(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            let position = buffer.current_position();
            if c == '<' {
                let raw = buffer.substring(0, position);
                return match unescape(&raw) {
                    Ok(text) => {
                        self.text = text.into_owned();
                        self.core.set_token_kind(TokenKind::Text);
                        Phase::Finished
                    }
                    Err(_) => Phase::Failed(Some('&')),
                };
            }
            if !is_char(c) {
                return Phase::Failed(Some(c));
            }
            if c == '>'
                && position >= 2
                && buffer.at(position - 1) == Some(']')
                && buffer.at(position - 2) == Some(']')
            {
                return Phase::Failed(Some(c));
            }
            buffer.increment_position();
        }
        Phase::Scanning(State::ReadingText)
    }
}

impl TokenParser for TextParser {
    fn production(&self) -> &'static str {
        "character data"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingText);
        self.text.clear();
    }

    fn step(&mut self, buffer: &mut ParsingBuffer) -> ParseResult {
        let mut phase = self.phase;
        let result = drive(&mut phase, |State::ReadingText| self.read_text(buffer));
        self.phase = phase;
        result
    }

    fn take_token(&mut self) -> Option<Token> {
        if self.phase != Phase::Finished {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.deinitialize();
        Some(Token::Text(text))
    }
}
