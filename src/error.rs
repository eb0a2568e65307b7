//! Error types for incremental reading and writing.
//!
//! Sub-parsers never produce these: a parsing step reports the tri-state
//! [`ParseResult`](crate::parser::ParseResult). The errors here are what the
//! reader, the writer and parser initialization hand back to applications.

use std::fmt::{self, Display};
use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A reader or writer failure, optionally tagged with a document position.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    position: Option<Position>,
}

/// A location in the decoded input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in code points.
    pub column: usize,
    /// Code points consumed since the start of the document.
    pub offset: usize,
}

impl Position {
    /// Position of the first code point of a document.
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };
}

/// What went wrong.
#[derive(Debug)]
pub enum ErrorKind {
    /// Reading from an input source failed.
    Io(io::Error),
    /// Input ended in the middle of a token or with open elements.
    UnexpectedEof,
    /// A document-level rule was broken, or the writer was handed content
    /// that cannot be represented.
    Syntax(String),
    /// A character that no grammar alternative accepts at this point.
    UnexpectedChar {
        /// The rejected code point, if one was seen.
        found: Option<char>,
        /// The production being recognized.
        context: &'static str,
    },
    /// Not a valid `Name`.
    InvalidName(String),
    /// Malformed XML declaration.
    InvalidDeclaration(String),
    /// Input finished while this element was still open.
    UnclosedTag(String),
    /// An end tag that does not close the innermost open element, or a
    /// root element that contradicts the document type.
    MismatchedTag {
        /// Name of the open element (or the document type).
        expected: String,
        /// Name that was actually found.
        found: String,
    },
    /// Pushed bytes are not UTF-8.
    InvalidUtf8,
    /// A parser was initialized with an option it does not accept.
    InvalidOption(String),
    /// The operation is not allowed in the current writer or reader state.
    InvalidState(String),
    /// Pending unconsumed input grew beyond the configured limit.
    BufferLimitExceeded {
        /// The configured limit, in code points.
        limit: usize,
    },
}

impl Error {
    /// Wraps an [`ErrorKind`] without position.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, position: None }
    }

    /// Attaches the position the error was detected at.
    #[inline]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// The error kind.
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where the error was detected, if known.
    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[inline]
    pub(crate) fn unexpected_eof() -> Self {
        Self::new(ErrorKind::UnexpectedEof)
    }

    #[inline]
    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::Syntax(msg.into()))
    }

    #[inline]
    pub(crate) fn unexpected_char(found: Option<char>, context: &'static str) -> Self {
        Self::new(ErrorKind::UnexpectedChar { found, context })
    }

    #[inline]
    pub(crate) fn invalid_name<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorKind::InvalidName(name.into()))
    }

    #[inline]
    pub(crate) fn invalid_declaration<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::InvalidDeclaration(msg.into()))
    }

    #[inline]
    pub(crate) fn unclosed_tag<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorKind::UnclosedTag(name.into()))
    }

    #[inline]
    pub(crate) fn mismatched_tag<S: Into<String>>(expected: S, found: S) -> Self {
        Self::new(ErrorKind::MismatchedTag {
            expected: expected.into(),
            found: found.into(),
        })
    }

    #[inline]
    pub(crate) fn invalid_option<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::InvalidOption(msg.into()))
    }

    #[inline]
    pub(crate) fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::InvalidState(msg.into()))
    }

    #[inline]
    pub(crate) fn buffer_limit_exceeded(limit: usize) -> Self {
        Self::new(ErrorKind::BufferLimitExceeded { limit })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io(e) => write!(f, "I/O error: {}", e),
            ErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            ErrorKind::Syntax(msg) => write!(f, "syntax error: {}", msg),
            ErrorKind::UnexpectedChar { found: Some(c), context } => {
                write!(f, "unexpected character {:?} in {}", c, context)
            }
            ErrorKind::UnexpectedChar { found: None, context } => {
                write!(f, "malformed {}", context)
            }
            ErrorKind::InvalidName(name) => write!(f, "invalid XML name: {:?}", name),
            ErrorKind::InvalidDeclaration(msg) => write!(f, "invalid XML declaration: {}", msg),
            ErrorKind::UnclosedTag(name) => write!(f, "element <{}> is never closed", name),
            ErrorKind::MismatchedTag { expected, found } => {
                write!(f, "mismatched tag: expected {}, found {}", expected, found)
            }
            ErrorKind::InvalidUtf8 => f.write_str("input is not valid UTF-8"),
            ErrorKind::InvalidOption(msg) => write!(f, "invalid parser option: {}", msg),
            ErrorKind::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            ErrorKind::BufferLimitExceeded { limit } => {
                write!(f, "buffered input exceeds the limit of {} code points", limit)
            }
        }?;

        match self.position {
            Some(pos) => write!(
                f,
                " at line {}, column {} (offset {})",
                pos.line, pos.column, pos.offset
            ),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let ErrorKind::Io(e) = &self.kind {
            Some(e)
        } else {
            None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::new(ErrorKind::Io(e))
    }
}
