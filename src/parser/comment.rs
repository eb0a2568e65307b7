//! `Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'`
//!
//! Input starts after the `<!--`.

use super::{drive, ParseResult, ParserCore, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::model::{Token, TokenKind};
use crate::validator::is_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingComment,
}

/// Reads a comment body.
///
/// `--` inside the body fails at the code point following it, so
/// `<!-- a--->` is rejected at the third dash.
#[derive(Debug, Clone)]
pub struct CommentParser {
    core: ParserCore,
    phase: Phase<State>,
    text: String,
}

impl Default for CommentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingComment),
            text: String::new(),
        }
    }

    /// The comment text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn read_comment(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if !is_char(c) {
                return Phase::Failed(Some(c));
            }

            let position = buffer.current_position();
            let after_dashes = position >= 2
                && buffer.at(position - 1) == Some('-')
                && buffer.at(position - 2) == Some('-');
            if after_dashes {
                if c != '>' {
                    return Phase::Failed(Some(c));
                }
                self.text = buffer.substring(0, position - 2);
                buffer.increment_position();
                self.core.set_token_kind(TokenKind::Comment);
                return Phase::Finished;
            }
            buffer.increment_position();
        }
        Phase::Scanning(State::ReadingComment)
    }
}

impl TokenParser for CommentParser {
    fn production(&self) -> &'static str {
        "comment"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingComment);
        self.text.clear();
    }

    fn step(&mut self, buffer: &mut ParsingBuffer) -> ParseResult {
        let mut phase = self.phase;
        let result = drive(&mut phase, |State::ReadingComment| self.read_comment(buffer));
        self.phase = phase;
        result
    }

    fn take_token(&mut self) -> Option<Token> {
        if self.phase != Phase::Finished {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.deinitialize();
        Some(Token::Comment(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::feed;
    use crate::parser::ParserOption;

    fn parse_comment(input: &str) -> (ParseResult, CommentParser) {
        let mut buffer = ParsingBuffer::new();
        let mut parser = CommentParser::new();
        parser.initialize(&mut buffer, ParserOption::None).unwrap();
        buffer.append(input);
        let result = parser.parse(&mut buffer);
        (result, parser)
    }

    #[test]
    fn test_comment_text() {
        let (result, parser) = parse_comment(" a - b <c> -->");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.text(), " a - b <c> ");
        assert_eq!(parser.token_kind(), Some(TokenKind::Comment));
    }

    #[test]
    fn test_empty_comment() {
        let (result, parser) = parse_comment("-->");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.text(), "");
    }

    #[test]
    fn test_double_dash_rejected() {
        let (result, _) = parse_comment(" a -- b -->");
        assert_eq!(result, ParseResult::Error(Some(' ')));
    }

    #[test]
    fn test_trailing_dash_rejected() {
        let (result, _) = parse_comment(" a --->");
        assert_eq!(result, ParseResult::Error(Some('-')));
    }

    #[test]
    fn test_dash_then_gt_is_text() {
        let (result, parser) = parse_comment("->-->");
        assert_eq!(result, ParseResult::Success);
        assert_eq!(parser.text(), "->");
    }

    #[test]
    fn test_split_close() {
        for chunk in 1..=4 {
            let mut buffer = ParsingBuffer::new();
            let mut parser = CommentParser::new();
            parser.initialize(&mut buffer, ParserOption::None).unwrap();
            assert_eq!(feed(&mut parser, &mut buffer, "note-->", chunk), ParseResult::Success);
            assert_eq!(parser.take_token(), Some(Token::Comment("note".into())));
        }
    }
}
