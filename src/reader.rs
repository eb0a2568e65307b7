//! Incremental XML reader.
//!
//! [`XmlReader`] accepts a document in arbitrary chunks, as bytes or as
//! text, and hands out one [`Token`] per [`next_event`](XmlReader::next_event)
//! call. When the buffered input ends in the middle of a token the reader
//! answers [`Event::NeedMoreData`] and resumes at the same spot once more
//! input has been pushed. The tokens produced do not depend on where the
//! chunk boundaries fall.
//!
//! ```
//! use incremental_xml::{Event, Token, XmlReader};
//!
//! let mut reader = XmlReader::new();
//! reader.push_str("<greeting lang='en'>Hel").unwrap();
//!
//! assert!(matches!(reader.next_event().unwrap(), Event::Token(Token::StartOfElement { .. })));
//! assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);
//!
//! reader.push_str("lo</greeting>").unwrap();
//! reader.finish().unwrap();
//! assert_eq!(reader.next_event().unwrap(), Event::Token(Token::Text("Hello".into())));
//! ```

use crate::buffer::{Lookahead, ParsingBuffer};
use crate::error::{Error, Position, Result};
use crate::model::Token;
use crate::parser::{
    CDataParser, CommentParser, DocumentTypeParser, EndOfElementParser, ParseResult, ParserOption,
    ProcessingInstructionParser, StartOfElementParser, TextParser, TokenParser,
};
use crate::utf8::Utf8Decoder;
use crate::validator::is_whitespace;
use log::{debug, trace};
use std::io::Read;

const LOG_TARGET: &str = "incremental_xml::reader";

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Upper bound on the code points a single unfinished token may keep
    /// buffered. `None` means unbounded.
    pub buffer_limit: Option<usize>,
    /// Drop text tokens that consist of whitespace only.
    pub skip_whitespace_text: bool,
    /// Initial capacity of the parsing buffer, in code points.
    pub initial_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_limit: None,
            skip_whitespace_text: false,
            initial_capacity: 1024,
        }
    }
}

impl ReaderConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the code points buffered for one unfinished token.
    pub fn with_buffer_limit(mut self, limit: usize) -> Self {
        self.buffer_limit = Some(limit);
        self
    }

    /// Drops whitespace-only text tokens.
    pub fn with_skip_whitespace_text(mut self, skip: bool) -> Self {
        self.skip_whitespace_text = skip;
        self
    }

    /// Sets the initial buffer capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

/// What a call to [`XmlReader::next_event`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A complete token.
    Token(Token),
    /// The buffered input ends inside a token or between tokens; push more.
    NeedMoreData,
    /// The document is complete. Returned on every later call too.
    EndOfDocument,
}

/// The markup a sub-parser is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    StartOfElement,
    EndOfElement,
    DocumentType,
    ProcessingInstruction,
    Text,
    Comment,
    CData,
}

/// Literals recognized at `<`, tried in order. Anything else starting with
/// `<` is a start tag.
const MARKUP_PREFIXES: [(&str, Markup); 5] = [
    ("</", Markup::EndOfElement),
    ("<?", Markup::ProcessingInstruction),
    ("<!--", Markup::Comment),
    ("<![CDATA[", Markup::CData),
    ("<!DOCTYPE", Markup::DocumentType),
];

/// Where in the document the reader is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Nothing consumed yet; the XML declaration is still allowed.
    Start,
    /// Before the root element.
    Prolog,
    /// Inside the root element.
    Content,
    /// After the root element.
    Epilog,
    Ended,
    Failed,
}

enum Dispatch {
    Start(Markup),
    Suspend,
    End,
}

/// A push-fed, pull-drained XML tokenizer.
#[derive(Debug)]
pub struct XmlReader {
    config: ReaderConfig,
    buffer: ParsingBuffer,
    decoder: Utf8Decoder,
    decoded: String,
    stage: Stage,
    active: Option<Markup>,
    start_tag: StartOfElementParser,
    end_tag: EndOfElementParser,
    document_type: DocumentTypeParser,
    instruction: ProcessingInstructionParser,
    text: TextParser,
    comment: CommentParser,
    cdata: CDataParser,
    /// Stack of open element names for validation.
    element_stack: Vec<String>,
    seen_document_type: bool,
    input_finished: bool,
}

impl Default for XmlReader {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlReader {
    /// Creates a reader with default settings.
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    /// Creates a reader with the given settings.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            buffer: ParsingBuffer::with_capacity(config.initial_capacity),
            config,
            decoder: Utf8Decoder::new(),
            decoded: String::new(),
            stage: Stage::Start,
            active: None,
            start_tag: StartOfElementParser::new(),
            end_tag: EndOfElementParser::new(),
            document_type: DocumentTypeParser::new(),
            instruction: ProcessingInstructionParser::new(),
            text: TextParser::new(),
            comment: CommentParser::new(),
            cdata: CDataParser::new(),
            element_stack: Vec::with_capacity(8),
            seen_document_type: false,
            input_finished: false,
        }
    }

    /// Creates a reader over a complete document.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        let mut reader = Self::new();
        reader.buffer.append(s);
        reader.input_finished = true;
        reader
    }

    /// The reader settings.
    #[inline]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Position of the next unexamined code point.
    #[inline]
    pub fn position(&self) -> Position {
        self.buffer.position()
    }

    /// Number of currently open elements.
    #[inline]
    pub fn depth(&self) -> usize {
        self.element_stack.len()
    }

    /// Code points buffered but not yet committed to a token.
    #[inline]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` once [`Event::EndOfDocument`] has been produced.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Ended
    }

    /// Appends UTF-8 encoded input. A multi-byte sequence may be split
    /// across calls.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_accepting_input()?;
        self.decoded.clear();
        if let Err(err) = self.decoder.decode(bytes, &mut self.decoded) {
            return Err(self.fail(err));
        }
        self.buffer.append(&self.decoded);
        Ok(())
    }

    /// Appends decoded input.
    pub fn push_str(&mut self, text: &str) -> Result<()> {
        self.check_accepting_input()?;
        if self.decoder.has_pending() {
            let err = Error::invalid_state("text pushed while a UTF-8 sequence is incomplete");
            return Err(self.fail(err));
        }
        self.buffer.append(text);
        Ok(())
    }

    /// Reads one chunk from `source` into `chunk` and pushes it. A read of
    /// zero bytes finishes the input. Returns the number of bytes read.
    pub fn fill_from<R: Read>(&mut self, source: &mut R, chunk: &mut [u8]) -> Result<usize> {
        let read = source.read(chunk)?;
        if read == 0 {
            self.finish()?;
        } else {
            self.push_bytes(&chunk[..read])?;
        }
        Ok(read)
    }

    /// Signals that no more input will be pushed.
    pub fn finish(&mut self) -> Result<()> {
        if self.input_finished {
            return Ok(());
        }
        self.check_accepting_input()?;
        if let Err(err) = self.decoder.finish() {
            return Err(self.fail(err));
        }
        self.input_finished = true;
        debug!(target: LOG_TARGET, "input finished, {} code points pending", self.buffer.len());
        Ok(())
    }

    /// Produces the next token, or tells the caller to push more input.
    ///
    /// Once an error has been returned the reader stays failed; call
    /// [`reset`](Self::reset) to reuse it.
    pub fn next_event(&mut self) -> Result<Event> {
        match self.stage {
            Stage::Failed => return Err(Error::invalid_state("the reader has failed")),
            Stage::Ended => return Ok(Event::EndOfDocument),
            _ => {}
        }
        self.advance().map_err(|err| self.fail(err))
    }

    /// Reads every remaining token of a finished input.
    pub fn read_to_end(&mut self) -> Result<Vec<Token>> {
        self.finish()?;
        let mut tokens = Vec::new();
        loop {
            match self.next_event()? {
                Event::Token(token) => tokens.push(token),
                Event::EndOfDocument => return Ok(tokens),
                Event::NeedMoreData => return Err(self.fail(Error::unexpected_eof())),
            }
        }
    }

    /// Discards all state so the reader can take a new document.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.decoder.reset();
        self.decoded.clear();
        self.stage = Stage::Start;
        self.active = None;
        self.start_tag.deinitialize();
        self.end_tag.deinitialize();
        self.document_type.deinitialize();
        self.instruction.deinitialize();
        self.text.deinitialize();
        self.comment.deinitialize();
        self.cdata.deinitialize();
        self.element_stack.clear();
        self.seen_document_type = false;
        self.input_finished = false;
    }

    fn check_accepting_input(&self) -> Result<()> {
        if self.stage == Stage::Failed {
            return Err(Error::invalid_state("the reader has failed"));
        }
        if self.input_finished {
            return Err(Error::invalid_state("input has already been finished"));
        }
        Ok(())
    }

    /// Marks the reader as failed and attaches the current position.
    fn fail(&mut self, err: Error) -> Error {
        let err = match err.position() {
            Some(_) => err,
            None => err.with_position(self.buffer.position()),
        };
        debug!(target: LOG_TARGET, "{}", err);
        self.stage = Stage::Failed;
        self.active = None;
        err
    }

    fn advance(&mut self) -> Result<Event> {
        loop {
            let markup = match self.active {
                Some(markup) => markup,
                None => match self.dispatch()? {
                    Dispatch::Start(markup) => {
                        self.begin(markup)?;
                        markup
                    }
                    Dispatch::Suspend => return self.suspend(),
                    Dispatch::End => {
                        self.stage = Stage::Ended;
                        let position = self.buffer.position();
                        debug!(target: LOG_TARGET, "end of document at {:?}", position);
                        return Ok(Event::EndOfDocument);
                    }
                },
            };

            let (parser, buffer) = self.parser_for(markup);
            let token = match parser.parse(buffer) {
                ParseResult::Success => parser.take_token(),
                ParseResult::NeedMoreData => return self.suspend(),
                ParseResult::Error(found) => {
                    let context = parser.production();
                    parser.deinitialize();
                    return Err(Error::unexpected_char(found, context));
                }
            };
            self.active = None;

            let token =
                token.ok_or_else(|| Error::invalid_state("parser finished without a token"))?;
            if let Some(token) = self.accept(token)? {
                return Ok(Event::Token(token));
            }
        }
    }

    fn parser_for(&mut self, markup: Markup) -> (&mut dyn TokenParser, &mut ParsingBuffer) {
        let parser: &mut dyn TokenParser = match markup {
            Markup::StartOfElement => &mut self.start_tag,
            Markup::EndOfElement => &mut self.end_tag,
            Markup::DocumentType => &mut self.document_type,
            Markup::ProcessingInstruction => &mut self.instruction,
            Markup::Text => &mut self.text,
            Markup::Comment => &mut self.comment,
            Markup::CData => &mut self.cdata,
        };
        (parser, &mut self.buffer)
    }

    fn begin(&mut self, markup: Markup) -> Result<()> {
        let (parser, buffer) = self.parser_for(markup);
        parser.initialize(buffer, ParserOption::None)?;
        self.active = Some(markup);
        trace!(target: LOG_TARGET, "{:?} at {:?}", markup, self.buffer.position());
        Ok(())
    }

    fn suspend(&self) -> Result<Event> {
        if self.input_finished {
            return Err(Error::unexpected_eof());
        }
        if let Some(limit) = self.config.buffer_limit {
            if self.buffer.len() > limit {
                return Err(Error::buffer_limit_exceeded(limit));
            }
        }
        Ok(Event::NeedMoreData)
    }

    /// Finds the markup starting at the cursor, skipping whitespace outside
    /// the root element.
    fn dispatch(&mut self) -> Result<Dispatch> {
        loop {
            let c = match self.buffer.current_char() {
                Some(c) => c,
                None => return self.end_of_input(),
            };

            if c == '<' {
                return self.dispatch_markup();
            }
            if self.stage == Stage::Content {
                return Ok(Dispatch::Start(Markup::Text));
            }
            if !is_whitespace(c) {
                let context = match self.stage {
                    Stage::Epilog => "content after the root element",
                    _ => "content before the root element",
                };
                return Err(Error::unexpected_char(Some(c), context));
            }

            self.buffer.increment_position();
            self.buffer.erase_to_current_position();
            if self.stage == Stage::Start {
                self.stage = Stage::Prolog;
            }
        }
    }

    fn dispatch_markup(&mut self) -> Result<Dispatch> {
        for (literal, markup) in MARKUP_PREFIXES {
            match self.buffer.lookahead(literal) {
                Lookahead::Mismatch => continue,
                Lookahead::NeedMoreData => return Ok(Dispatch::Suspend),
                Lookahead::Matched => {
                    self.check_allowed(markup)?;
                    if markup == Markup::DocumentType {
                        match self.buffer.peek(literal.len()) {
                            None => return Ok(Dispatch::Suspend),
                            Some(c) if is_whitespace(c) => {}
                            Some(c) => {
                                return Err(Error::unexpected_char(
                                    Some(c),
                                    "document type declaration",
                                ))
                            }
                        }
                    }
                    self.buffer.skip(literal.len());
                    return Ok(Dispatch::Start(markup));
                }
            }
        }

        // `<!` followed by anything but a comment, CDATA or DOCTYPE.
        if self.buffer.lookahead("<!") == Lookahead::Matched {
            return Err(Error::unexpected_char(self.buffer.peek(2), "markup declaration"));
        }

        self.check_allowed(Markup::StartOfElement)?;
        self.buffer.skip(1);
        Ok(Dispatch::Start(Markup::StartOfElement))
    }

    /// Document-level placement rules for the markup about to start.
    fn check_allowed(&self, markup: Markup) -> Result<()> {
        match markup {
            Markup::EndOfElement if self.stage != Stage::Content => {
                Err(Error::syntax("end tag outside the root element"))
            }
            Markup::CData if self.stage != Stage::Content => {
                Err(Error::syntax("CDATA section outside the root element"))
            }
            Markup::DocumentType if self.seen_document_type => {
                Err(Error::syntax("more than one document type declaration"))
            }
            Markup::DocumentType if !matches!(self.stage, Stage::Start | Stage::Prolog) => {
                Err(Error::syntax("document type declaration after the root element"))
            }
            Markup::StartOfElement if self.stage == Stage::Epilog => {
                Err(Error::syntax("more than one root element"))
            }
            _ => Ok(()),
        }
    }

    fn end_of_input(&self) -> Result<Dispatch> {
        if !self.input_finished {
            return Ok(Dispatch::Suspend);
        }
        match self.stage {
            Stage::Epilog => Ok(Dispatch::End),
            Stage::Content => match self.element_stack.last() {
                Some(name) => Err(Error::unclosed_tag(name.as_str())),
                None => Err(Error::unexpected_eof()),
            },
            _ => Err(Error::syntax("document has no root element")),
        }
    }

    /// Applies a finished token to the document state. Returns `None` for
    /// tokens the configuration filters out.
    fn accept(&mut self, token: Token) -> Result<Option<Token>> {
        match &token {
            Token::XmlDeclaration(_) => {
                if self.stage != Stage::Start {
                    return Err(Error::invalid_declaration(
                        "the XML declaration must be at the very start of the document",
                    ));
                }
                self.stage = Stage::Prolog;
            }
            Token::DocumentType(_) => {
                self.seen_document_type = true;
                self.stage = Stage::Prolog;
            }
            Token::StartOfElement { name, .. } => {
                self.element_stack.push(name.clone());
                self.stage = Stage::Content;
            }
            Token::EmptyElement { .. } => {
                if self.element_stack.is_empty() {
                    self.stage = Stage::Epilog;
                }
            }
            Token::EndOfElement { name } => {
                match self.element_stack.pop() {
                    Some(expected) if expected == *name => {}
                    Some(expected) => return Err(Error::mismatched_tag(expected, name.clone())),
                    None => return Err(Error::syntax(format!("unexpected closing tag: {}", name))),
                }
                if self.element_stack.is_empty() {
                    self.stage = Stage::Epilog;
                }
            }
            Token::Text(text) => {
                if self.config.skip_whitespace_text && text.chars().all(is_whitespace) {
                    return Ok(None);
                }
            }
            Token::Comment(_) | Token::ProcessingInstruction(_) => {
                if self.stage == Stage::Start {
                    self.stage = Stage::Prolog;
                }
            }
            Token::CData(_) => {}
        }

        trace!(target: LOG_TARGET, "{:?} token, depth {}", token.kind(), self.element_stack.len());
        Ok(Some(token))
    }
}

/// Tokenizes a complete document held in memory.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    XmlReader::from_str(input).read_to_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{Attribute, DocumentType, ProcessingInstruction, QuoteStyle, TokenKind};

    fn next_token(reader: &mut XmlReader) -> Token {
        match reader.next_event().unwrap() {
            Event::Token(token) => token,
            other => panic!("expected a token, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_element() {
        let mut reader = XmlReader::from_str("<root></root>");

        match next_token(&mut reader) {
            Token::StartOfElement { name, attributes } => {
                assert_eq!(name, "root");
                assert!(attributes.is_empty());
            }
            other => panic!("expected StartOfElement, got {:?}", other),
        }
        assert_eq!(next_token(&mut reader), Token::EndOfElement { name: "root".into() });
        assert_eq!(reader.next_event().unwrap(), Event::EndOfDocument);
        assert_eq!(reader.next_event().unwrap(), Event::EndOfDocument);
        assert!(reader.is_finished());
    }

    #[test]
    fn test_empty_element_with_attributes() {
        let mut reader = XmlReader::from_str(r#"<a b="1" c='2'/>"#);

        match next_token(&mut reader) {
            Token::EmptyElement { name, attributes } => {
                assert_eq!(name, "a");
                assert_eq!(attributes[0], Attribute::new("b", "1"));
                assert_eq!(attributes[1], Attribute::with_quote("c", "2", QuoteStyle::Single));
            }
            other => panic!("expected EmptyElement, got {:?}", other),
        }
        assert_eq!(reader.next_event().unwrap(), Event::EndOfDocument);
    }

    #[test]
    fn test_prolog_tokens() {
        let tokens = tokenize(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE note>\n\
             <!-- header -->\n\
             <?render fast?>\n\
             <note/>\n\
             <!-- trailer -->\n",
        )
        .unwrap();

        let kinds: Vec<_> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::XmlDeclaration,
                TokenKind::DocumentType,
                TokenKind::Comment,
                TokenKind::ProcessingInstruction,
                TokenKind::EmptyElement,
                TokenKind::Comment,
            ]
        );
        assert_eq!(tokens[1], Token::DocumentType(DocumentType::new("note")));
        assert_eq!(
            tokens[3],
            Token::ProcessingInstruction(ProcessingInstruction::new("render", "fast"))
        );
    }

    #[test]
    fn test_text_and_cdata() {
        let tokens = tokenize("<a>x &amp; y<![CDATA[<raw>]]>z</a>").unwrap();
        assert_eq!(tokens[1], Token::Text("x & y".into()));
        assert_eq!(tokens[2], Token::CData("<raw>".into()));
        assert_eq!(tokens[3], Token::Text("z".into()));
    }

    #[test]
    fn test_whitespace_text_reported_or_skipped() {
        let xml = "<a>\n  <b/>\n</a>";
        let tokens = tokenize(xml).unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1], Token::Text("\n  ".into()));

        let config = ReaderConfig::new().with_skip_whitespace_text(true);
        let mut reader = XmlReader::with_config(config);
        reader.push_str(xml).unwrap();
        let tokens = reader.read_to_end().unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_need_more_data_then_resume() {
        let mut reader = XmlReader::new();
        reader.push_str("<ro").unwrap();
        assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);
        assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);

        reader.push_str("ot a='1'>").unwrap();
        assert!(matches!(
            next_token(&mut reader),
            Token::StartOfElement { ref name, .. } if name == "root"
        ));
        assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);

        reader.push_str("</root>").unwrap();
        assert_eq!(next_token(&mut reader), Token::EndOfElement { name: "root".into() });
        assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);

        reader.finish().unwrap();
        assert_eq!(reader.next_event().unwrap(), Event::EndOfDocument);
    }

    #[test]
    fn test_mismatched_tags() {
        let mut reader = XmlReader::from_str("<root></wrong>");
        next_token(&mut reader);
        let err = reader.next_event().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MismatchedTag { .. }));
        assert!(err.position().is_some());
    }

    #[test]
    fn test_reader_stays_failed() {
        let mut reader = XmlReader::from_str("<root></wrong>");
        next_token(&mut reader);
        assert!(reader.next_event().is_err());
        let err = reader.next_event().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidState(_)));
        assert!(reader.push_str("more").is_err());
    }

    #[test]
    fn test_unclosed_tag() {
        let mut reader = XmlReader::from_str("<root>");
        next_token(&mut reader);
        let err = reader.next_event().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnclosedTag(name) if name == "root"));
    }

    #[test]
    fn test_eof_inside_token() {
        let err = tokenize("<root><child attr='x").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedEof));

        let err = tokenize("<root><!-").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_end_tag_errors() {
        assert_eq!(tokenize("<a></a  >").unwrap().len(), 2);

        let err = tokenize("<a></a!>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedChar { found: Some('!'), .. }));
    }

    #[test]
    fn test_document_placement_rules() {
        let cases = [
            ("", "no root"),
            ("  ", "no root"),
            ("<a/><b/>", "two roots"),
            ("text<a/>", "text before root"),
            ("<a/>text", "text after root"),
            ("<![CDATA[x]]><a/>", "cdata outside root"),
            ("</a>", "end tag outside root"),
            ("<a/><!DOCTYPE a>", "doctype after root"),
            ("<!DOCTYPE a><!DOCTYPE a><a/>", "two doctypes"),
            ("<!DOCTYPEa><a/>", "doctype without whitespace"),
            (" <?xml version='1.0'?><a/>", "declaration not first"),
            ("<!-- c --><?xml version='1.0'?><a/>", "declaration after comment"),
            ("<a><!ELEMENT a ANY></a>", "markup declaration in content"),
        ];
        for (xml, why) in cases {
            assert!(tokenize(xml).is_err(), "{} should fail: {:?}", why, xml);
        }
    }

    #[test]
    fn test_malformed_declaration() {
        let err = tokenize("<?xml version='1.0' encoding='%'?><a/>").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedChar { found: None, context: "processing instruction" }
        ));
    }

    #[test]
    fn test_push_bytes_split_utf8() {
        let bytes = "<a t='é'>€</a>".as_bytes();
        let mut reader = XmlReader::new();
        let mut tokens = Vec::new();
        for byte in bytes {
            reader.push_bytes(std::slice::from_ref(byte)).unwrap();
            while let Event::Token(token) = reader.next_event().unwrap() {
                tokens.push(token);
            }
        }
        reader.finish().unwrap();
        assert_eq!(reader.next_event().unwrap(), Event::EndOfDocument);
        assert_eq!(tokens[1], Token::Text("€".into()));
        match &tokens[0] {
            Token::StartOfElement { attributes, .. } => assert_eq!(attributes[0].value, "é"),
            other => panic!("expected StartOfElement, got {:?}", other),
        }
    }

    #[test]
    fn test_buffer_limit() {
        let config = ReaderConfig::new().with_buffer_limit(16);
        let mut reader = XmlReader::with_config(config);
        reader.push_str("<a>").unwrap();
        next_token(&mut reader);
        reader.push_str(&"x".repeat(64)).unwrap();
        let err = reader.next_event().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::BufferLimitExceeded { limit: 16 }));
    }

    #[test]
    fn test_buffer_limit_allows_many_small_tokens() {
        let config = ReaderConfig::new().with_buffer_limit(16);
        let mut reader = XmlReader::with_config(config);
        reader.push_str("<root>").unwrap();
        reader.push_str(&"<item/>".repeat(20)).unwrap();
        reader.push_str("</root>").unwrap();

        let mut count = 0;
        while let Event::Token(_) = reader.next_event().unwrap() {
            count += 1;
        }
        assert_eq!(count, 22);
        assert_eq!(reader.buffered_len(), 0);
    }

    #[test]
    fn test_fill_from_reader() {
        let mut source: &[u8] = b"<doc><p>one</p><p>two</p></doc>";
        let mut chunk = [0u8; 4];
        let mut reader = XmlReader::new();
        let mut tokens = Vec::new();
        loop {
            let read = reader.fill_from(&mut source, &mut chunk).unwrap();
            loop {
                match reader.next_event().unwrap() {
                    Event::Token(token) => tokens.push(token),
                    Event::NeedMoreData => break,
                    Event::EndOfDocument => break,
                }
            }
            if read == 0 {
                break;
            }
        }
        assert!(reader.is_finished());
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_position_tracking() {
        let mut reader = XmlReader::from_str("<root>\n  <child/>\n</root>");
        next_token(&mut reader);
        next_token(&mut reader);
        next_token(&mut reader);
        assert_eq!(reader.position().line, 2);
    }

    #[test]
    fn test_depth_tracking() {
        let mut reader = XmlReader::from_str("<a><b><c></c></b></a>");

        assert_eq!(reader.depth(), 0);
        next_token(&mut reader);
        assert_eq!(reader.depth(), 1);
        next_token(&mut reader);
        assert_eq!(reader.depth(), 2);
        next_token(&mut reader);
        assert_eq!(reader.depth(), 3);
        next_token(&mut reader);
        assert_eq!(reader.depth(), 2);
    }

    #[test]
    fn test_reset_reuses_reader() {
        let mut reader = XmlReader::from_str("<a></b>");
        assert!(reader.read_to_end().is_err());

        reader.reset();
        reader.push_str("<b/>").unwrap();
        assert_eq!(reader.read_to_end().unwrap().len(), 1);
    }
}
