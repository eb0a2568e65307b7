//! Incremental token parsers.
//!
//! Every parser implements one XML production as a resumable state machine
//! over a borrowed [`ParsingBuffer`]. A call to [`TokenParser::parse`] runs
//! as many sub-state transitions as the buffered input allows and returns:
//!
//! - [`ParseResult::Success`] when the production is complete; the buffer is
//!   pruned up to the first unconsumed code point.
//! - [`ParseResult::NeedMoreData`] when the buffer ran dry; the parser keeps
//!   its sub-state and continues exactly there on the next call, after the
//!   caller has appended more input.
//! - [`ParseResult::Error`] when a code point fits no alternative. The
//!   rejected code point (the *termination character*) travels with the
//!   error, so a delegating parent can treat it as the start of another
//!   alternative rather than a failure. The buffer is pruned as well.
//!
//! Composite parsers own their children by value and re-initialize them for
//! each delegated sub-task. Only one parser touches the buffer at a time:
//! control transfer is an ordinary nested call.

use crate::buffer::ParsingBuffer;
use crate::error::{Error, Result};
use crate::model::{Token, TokenKind};

mod attribute_value;
mod cdata;
mod comment;
mod document_type;
mod end_of_element;
mod name;
mod processing_instruction;
mod start_of_element;
mod text;

pub use attribute_value::AttributeValueParser;
pub use cdata::CDataParser;
pub use comment::CommentParser;
pub use document_type::DocumentTypeParser;
pub use end_of_element::EndOfElementParser;
pub use name::NameParser;
pub use processing_instruction::ProcessingInstructionParser;
pub use start_of_element::StartOfElementParser;
pub use text::TextParser;

/// Outcome of one parsing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    /// The production is complete.
    Success,
    /// The buffered input is exhausted; call again after appending more.
    NeedMoreData,
    /// The production was rejected, at the given code point if there was one.
    Error(Option<char>),
}

impl ParseResult {
    /// Returns `true` for [`ParseResult::Success`].
    #[inline]
    pub fn is_success(self) -> bool {
        self == ParseResult::Success
    }
}

/// Entry behavior of a parser, fixed for one parse cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserOption {
    /// No special behavior.
    #[default]
    None,
    /// Skip whitespace before the production instead of rejecting it.
    IgnoreLeadingWhitespace,
}

/// Life-cycle data shared by every token parser.
#[derive(Debug, Clone, Default)]
pub struct ParserCore {
    initialized: bool,
    option: ParserOption,
    termination_char: Option<char>,
    token_kind: Option<TokenKind>,
}

impl ParserCore {
    /// The option the parser was initialized with.
    #[inline]
    pub fn option(&self) -> ParserOption {
        self.option
    }

    /// Records the kind of token being produced.
    #[inline]
    pub fn set_token_kind(&mut self, kind: TokenKind) {
        self.token_kind = Some(kind);
    }
}

/// The suspend/resume contract shared by all parsers.
///
/// Implementors provide the state machine (`step`), a way to rewind it
/// (`reset`), and access to their [`ParserCore`]; the life cycle methods
/// are provided.
pub trait TokenParser {
    /// Name of the production, for diagnostics.
    fn production(&self) -> &'static str;

    /// Shared life-cycle data.
    fn core(&self) -> &ParserCore;

    /// Shared life-cycle data, mutably.
    fn core_mut(&mut self) -> &mut ParserCore;

    /// Rewinds the state machine to its first sub-state and clears the
    /// payload and any child parsers.
    fn reset(&mut self);

    /// Runs sub-state transitions until the production completes, fails or
    /// the buffer runs dry.
    fn step(&mut self, buffer: &mut ParsingBuffer) -> ParseResult;

    /// Whether this parser accepts `option`.
    fn accepts_option(&self, option: ParserOption) -> bool {
        option == ParserOption::None
    }

    /// Extra initialization run after the shared state is reset, typically
    /// initializing the first child parser.
    fn start(&mut self, _buffer: &mut ParsingBuffer) -> Result<()> {
        Ok(())
    }

    /// Moves the finished token out and deinitializes the parser.
    ///
    /// Returns `None` unless the last step succeeded on a token-producing
    /// parser.
    fn take_token(&mut self) -> Option<Token> {
        None
    }

    /// Prepares the parser for a new parse cycle on `buffer`.
    fn initialize(&mut self, buffer: &mut ParsingBuffer, option: ParserOption) -> Result<()> {
        if !self.accepts_option(option) {
            self.deinitialize();
            return Err(Error::invalid_option(format!(
                "{:?} is not accepted by the {} parser",
                option,
                self.production()
            )));
        }

        self.reset();
        *self.core_mut() = ParserCore {
            initialized: true,
            option,
            termination_char: None,
            token_kind: None,
        };
        buffer.erase_to_current_position();

        let started = self.start(buffer);
        if started.is_err() {
            self.deinitialize();
        }
        started
    }

    /// Tears the parser down. Idempotent.
    fn deinitialize(&mut self) {
        self.reset();
        *self.core_mut() = ParserCore::default();
    }

    /// Performs one parsing step.
    ///
    /// The buffer is pruned to the cursor on success and on error. Calling
    /// again after a final result repeats that result without touching the
    /// buffer.
    fn parse(&mut self, buffer: &mut ParsingBuffer) -> ParseResult {
        if !self.is_initialized() {
            return ParseResult::Error(None);
        }

        let result = self.step(buffer);
        match result {
            ParseResult::Success => buffer.erase_to_current_position(),
            ParseResult::Error(c) => {
                self.core_mut().termination_char = c;
                buffer.erase_to_current_position();
            }
            ParseResult::NeedMoreData => {}
        }
        result
    }

    /// Whether `initialize` succeeded and `deinitialize` has not run since.
    #[inline]
    fn is_initialized(&self) -> bool {
        self.core().initialized
    }

    /// The option of the current parse cycle.
    #[inline]
    fn option(&self) -> ParserOption {
        self.core().option
    }

    /// The code point that made the last step fail.
    #[inline]
    fn termination_char(&self) -> Option<char> {
        self.core().termination_char
    }

    /// Kind of the token recognized by the last successful step.
    #[inline]
    fn token_kind(&self) -> Option<TokenKind> {
        self.core().token_kind
    }
}

/// Sub-state bookkeeping every state machine here shares: a sub-state
/// either names a scanning state or one of the two final outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase<S> {
    Scanning(S),
    Finished,
    Failed(Option<char>),
}

/// Drives `execute` from `phase` until a final outcome or a stall.
///
/// `execute` must consume everything it can and return the state it was
/// called with only when the buffer is exhausted.
pub(crate) fn drive<S, F>(phase: &mut Phase<S>, mut execute: F) -> ParseResult
where
    S: Copy + PartialEq,
    F: FnMut(S) -> Phase<S>,
{
    loop {
        let current = match *phase {
            Phase::Scanning(state) => state,
            Phase::Finished => return ParseResult::Success,
            Phase::Failed(c) => return ParseResult::Error(c),
        };
        let next = execute(current);
        if next == Phase::Scanning(current) {
            return ParseResult::NeedMoreData;
        }
        *phase = next;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Feeds `input` in chunks of `chunk` code points until the parser
    /// stops asking for more data.
    pub(crate) fn feed<P: TokenParser>(
        parser: &mut P,
        buffer: &mut ParsingBuffer,
        input: &str,
        chunk: usize,
    ) -> ParseResult {
        let chars: Vec<char> = input.chars().collect();
        let mut result = ParseResult::NeedMoreData;
        for piece in chars.chunks(chunk.max(1)) {
            buffer.extend(piece.iter().copied());
            result = parser.parse(buffer);
            if result != ParseResult::NeedMoreData {
                return result;
            }
        }
        result
    }
}
