//! `Name ::= NameStartChar (NameChar)*`

use super::{drive, ParseResult, ParserCore, ParserOption, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::validator::{is_name_char, is_name_start_char, is_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingNameStartChar,
    ReadingNameChars,
}

/// Reads an XML name.
///
/// The code point after the name is left under the cursor; it is the
/// caller's business to decide what it means.
#[derive(Debug, Clone)]
pub struct NameParser {
    core: ParserCore,
    phase: Phase<State>,
    value: String,
}

impl Default for NameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NameParser {
    /// Creates an uninitialized name parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingNameStartChar),
            value: String::new(),
        }
    }

    /// The name read by the last successful step.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Moves the name out, leaving an empty string behind.
    #[inline]
    pub fn take_value(&mut self) -> String {
        std::mem::take(&mut self.value)
    }

    fn execute(&mut self, state: State, buffer: &mut ParsingBuffer) -> Phase<State> {
        match state {
            State::ReadingNameStartChar => self.read_name_start_char(buffer),
            State::ReadingNameChars => self.read_name_chars(buffer),
        }
    }

    fn read_name_start_char(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if is_name_start_char(c) {
                buffer.erase_to_current_position();
                buffer.increment_position();
                return Phase::Scanning(State::ReadingNameChars);
            }
            if is_whitespace(c) && self.core.option() == ParserOption::IgnoreLeadingWhitespace {
                buffer.increment_position();
                buffer.erase_to_current_position();
                continue;
            }
            return Phase::Failed(Some(c));
        }
        Phase::Scanning(State::ReadingNameStartChar)
    }

    fn read_name_chars(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if !is_name_char(c) {
                self.value = buffer.substring(0, buffer.current_position());
                buffer.erase_to_current_position();
                return Phase::Finished;
            }
            buffer.increment_position();
        }
        Phase::Scanning(State::ReadingNameChars)
    }
}

impl TokenParser for NameParser {
    fn production(&self) -> &'static str {
        "name"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingNameStartChar);
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
