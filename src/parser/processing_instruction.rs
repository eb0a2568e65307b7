//! Processing instructions and the XML declaration.
//!
//! ```text
//! PI      ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
//! XMLDecl ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
//! ```
//!
//! Input starts after the `<?`. A target spelled `xml` in any case turns
//! the instruction into an XML declaration whose data must parse as one.

use super::{drive, NameParser, ParseResult, ParserCore, ParserOption, Phase, TokenParser};
use crate::buffer::ParsingBuffer;
use crate::error::Result;
use crate::model::{ProcessingInstruction, Token, TokenKind, XmlDeclaration};
use crate::validator::{is_char, is_whitespace, is_xml_declaration_target};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingPiTarget,
    ReadingPiData,
}

/// Parses `<?target data?>`, including `<?xml ...?>`.
#[derive(Debug, Clone)]
pub struct ProcessingInstructionParser {
    core: ParserCore,
    phase: Phase<State>,
    name_parser: NameParser,
    instruction: ProcessingInstruction,
    declaration: Option<XmlDeclaration>,
    /// Whitespace followed the target.
    separated: bool,
    /// Leading whitespace of the data has been skipped.
    data_started: bool,
}

impl Default for ProcessingInstructionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingInstructionParser {
    /// Creates an uninitialized parser.
    pub fn new() -> Self {
        Self {
            core: ParserCore::default(),
            phase: Phase::Scanning(State::ReadingPiTarget),
            name_parser: NameParser::new(),
            instruction: ProcessingInstruction::default(),
            declaration: None,
            separated: false,
            data_started: false,
        }
    }

    /// The instruction target.
    #[inline]
    pub fn target(&self) -> &str {
        &self.instruction.target
    }

    /// The instruction data, without the leading whitespace.
    #[inline]
    pub fn data(&self) -> &str {
        &self.instruction.data
    }

    /// The XML declaration, when the target was `xml`.
    #[inline]
    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    fn execute(&mut self, state: State, buffer: &mut ParsingBuffer) -> Phase<State> {
        match state {
            State::ReadingPiTarget => self.read_target(buffer),
            State::ReadingPiData => self.read_data(buffer),
        }
    }

    fn read_target(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        match self.name_parser.parse(buffer) {
            ParseResult::NeedMoreData => Phase::Scanning(State::ReadingPiTarget),
            ParseResult::Error(c) => {
                self.name_parser.deinitialize();
                Phase::Failed(c)
            }
            ParseResult::Success => {
                self.instruction.target = self.name_parser.take_value();
                self.name_parser.deinitialize();
                match buffer.current_char() {
                    Some('?') => {
                        self.separated = false;
                        Phase::Scanning(State::ReadingPiData)
                    }
                    Some(c) if is_whitespace(c) => {
                        self.separated = true;
                        Phase::Scanning(State::ReadingPiData)
                    }
                    other => Phase::Failed(other),
                }
            }
        }
    }

    fn read_data(&mut self, buffer: &mut ParsingBuffer) -> Phase<State> {
        while let Some(c) = buffer.current_char() {
            if !is_char(c) {
                return Phase::Failed(Some(c));
            }

            if !self.data_started {
                if is_whitespace(c) {
                    buffer.increment_position();
                    buffer.erase_to_current_position();
                    continue;
                }
                self.data_started = true;
            }

            let position = buffer.current_position();
            if c == '>' && position > 0 && buffer.at(position - 1) == Some('?') {
                let data = buffer.substring(0, position - 1);
                buffer.increment_position();
                return self.complete(data);
            }
            // `<?target?` may only continue with `>`.
            if !self.separated && position > 0 {
                return Phase::Failed(Some(c));
            }
            buffer.increment_position();
        }
        Phase::Scanning(State::ReadingPiData)
    }

    fn complete(&mut self, data: String) -> Phase<State> {
        if is_xml_declaration_target(&self.instruction.target) {
            return match XmlDeclaration::from_pi_data(&data) {
                Ok(declaration) => {
                    self.instruction.data = data;
                    self.declaration = Some(declaration);
                    self.core.set_token_kind(TokenKind::XmlDeclaration);
                    Phase::Finished
                }
                Err(_) => Phase::Failed(None),
            };
        }

        self.instruction.data = data;
        if !self.instruction.is_valid() {
            return Phase::Failed(None);
        }
        self.core.set_token_kind(TokenKind::ProcessingInstruction);
        Phase::Finished
    }
}

impl TokenParser for ProcessingInstructionParser {
    fn production(&self) -> &'static str {
        "processing instruction"
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.phase = Phase::Scanning(State::ReadingPiTarget);
        self.name_parser.deinitialize();
        self.instruction.target.clear();
        self.instruction.data.clear();
        self.declaration = None;
        self.separated = false;
        self.data_started = false;
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
        let token = match self.declaration.take() {
            Some(declaration) => Token::XmlDeclaration(declaration),
            None => Token::ProcessingInstruction(std::mem::take(&mut self.instruction)),
        };
        self.deinitialize();
        Some(token)
    }
}
