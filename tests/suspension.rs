//! Suspending, repeating and cancelling parse calls.

use incremental_xml::parser::{
    CommentParser, DocumentTypeParser, EndOfElementParser, NameParser, ParseResult, ParserOption,
    ProcessingInstructionParser, StartOfElementParser, TokenParser,
};
use incremental_xml::{Event, ParsingBuffer, Token, TokenKind, XmlReader};

fn started<P: TokenParser + Default>(input: &str) -> (P, ParsingBuffer) {
    let mut buffer = ParsingBuffer::new();
    let mut parser = P::default();
    parser.initialize(&mut buffer, ParserOption::None).unwrap();
    buffer.append(input);
    (parser, buffer)
}

#[test]
fn test_need_more_data_is_repeatable() {
    let (mut parser, mut buffer) = started::<StartOfElementParser>("a b=\"1");
    for _ in 0..3 {
        assert_eq!(parser.parse(&mut buffer), ParseResult::NeedMoreData);
    }
    buffer.append("\" c='2'/>");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Success);
    assert_eq!(parser.token_kind(), Some(TokenKind::EmptyElement));
    assert_eq!(parser.attributes().len(), 2);
}

#[test]
fn test_success_repeats_without_second_token() {
    let (mut parser, mut buffer) = started::<EndOfElementParser>("a  ><b>");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Success);
    let remaining = buffer.len();

    for _ in 0..3 {
        assert_eq!(parser.parse(&mut buffer), ParseResult::Success);
        assert_eq!(parser.name(), "a");
        assert_eq!(buffer.len(), remaining);
        assert_eq!(buffer.current_char(), Some('<'));
    }
}

#[test]
fn test_error_repeats_with_same_termination_char() {
    let (mut parser, mut buffer) = started::<EndOfElementParser>("a!>");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Error(Some('!')));
    buffer.append("more");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Error(Some('!')));
    assert_eq!(parser.termination_char(), Some('!'));
    assert_eq!(buffer.current_char(), Some('!'));
}

#[test]
fn test_uninitialized_parsers_refuse_to_parse() {
    let mut buffer = ParsingBuffer::new();
    buffer.append("root>");

    let mut parser = DocumentTypeParser::new();
    assert_eq!(parser.parse(&mut buffer), ParseResult::Error(None));

    parser.initialize(&mut buffer, ParserOption::None).unwrap();
    assert_eq!(parser.parse(&mut buffer), ParseResult::Success);

    parser.deinitialize();
    assert_eq!(parser.parse(&mut buffer), ParseResult::Error(None));
    assert!(!parser.is_initialized());
}

#[test]
fn test_reinitialize_after_error() {
    let (mut parser, mut buffer) = started::<ProcessingInstructionParser>("foo>");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Error(Some('>')));

    parser.deinitialize();
    buffer.clear();
    parser.initialize(&mut buffer, ParserOption::None).unwrap();
    buffer.append("foo bar?>");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Success);
    assert_eq!(parser.target(), "foo");
    assert_eq!(parser.data(), "bar");
}

#[test]
fn test_cancel_mid_token() {
    let (mut parser, mut buffer) = started::<CommentParser>(" half a comm");
    assert_eq!(parser.parse(&mut buffer), ParseResult::NeedMoreData);
    parser.deinitialize();

    parser.initialize(&mut buffer, ParserOption::None).unwrap();
    buffer.append("-->");
    assert_eq!(parser.parse(&mut buffer), ParseResult::Success);
    assert_eq!(parser.take_token(), Some(Token::Comment("".into())));
}

#[test]
fn test_options_are_checked() {
    let mut buffer = ParsingBuffer::new();
    assert!(NameParser::new()
        .initialize(&mut buffer, ParserOption::IgnoreLeadingWhitespace)
        .is_ok());
    assert!(EndOfElementParser::new()
        .initialize(&mut buffer, ParserOption::IgnoreLeadingWhitespace)
        .is_err());
}

#[test]
fn test_buffer_is_pruned_after_each_token() {
    let mut reader = XmlReader::new();
    reader.push_str("<root><a/><b/>").unwrap();

    for _ in 0..3 {
        assert!(matches!(reader.next_event().unwrap(), Event::Token(_)));
    }
    assert_eq!(reader.buffered_len(), 0);
    assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);

    reader.push_str("<c attr='long value").unwrap();
    assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);
    // only the unfinished attribute value stays buffered
    assert_eq!(reader.buffered_len(), "long value".len());
}

#[test]
fn test_reader_needs_more_data_deterministically() {
    let mut reader = XmlReader::new();
    reader.push_str("<root><!-- unfinished").unwrap();
    assert!(matches!(reader.next_event().unwrap(), Event::Token(_)));
    for _ in 0..3 {
        assert_eq!(reader.next_event().unwrap(), Event::NeedMoreData);
    }
    reader.push_str(" -->").unwrap();
    assert_eq!(
        reader.next_event().unwrap(),
        Event::Token(Token::Comment(" unfinished ".into()))
    );
}
