//! # incremental_xml
//!
//! An incremental, memory-bounded XML 1.0 tokenizer and a well-formedness
//! checking XML writer.
//!
//! ## Features
//!
//! - Input can arrive in chunks of any size, split anywhere, even inside a
//!   multi-byte UTF-8 sequence
//! - Every token parser suspends with "need more data" and resumes exactly
//!   where it stopped, so results do not depend on chunking
//! - Only the unfinished token stays buffered; an optional limit bounds it
//! - Document-level checks: one root, matching end tags, prolog placement
//! - A writer that refuses calls producing malformed output
//! - Error reporting with line/column positions
//!
//! ## Reading
//!
//! ```rust
//! use incremental_xml::{Event, Token, XmlReader};
//!
//! let mut reader = XmlReader::new();
//! let mut tokens = Vec::new();
//!
//! for chunk in ["<?xml version='1.0'?><li", "st><item n='1'/>", "</list>"] {
//!     reader.push_str(chunk).unwrap();
//!     while let Event::Token(token) = reader.next_event().unwrap() {
//!         tokens.push(token);
//!     }
//! }
//! reader.finish().unwrap();
//! assert_eq!(reader.next_event().unwrap(), Event::EndOfDocument);
//!
//! assert_eq!(tokens.len(), 4);
//! assert_eq!(tokens[2].name(), Some("item"));
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use incremental_xml::{AttributeList, XmlWriter};
//!
//! let mut writer = XmlWriter::new();
//! writer.write_document_type("greeting").unwrap();
//! writer.write_start_of_element("greeting", &AttributeList::new()).unwrap();
//! writer.write_text("fish & chips").unwrap();
//! writer.write_end_of_element().unwrap();
//!
//! assert_eq!(
//!     writer.finish().unwrap(),
//!     "<!DOCTYPE greeting><greeting>fish &amp; chips</greeting>"
//! );
//! ```
//!
//! ## Driving a parser directly
//!
//! ```rust
//! use incremental_xml::parser::{NameParser, ParseResult, ParserOption, TokenParser};
//! use incremental_xml::ParsingBuffer;
//!
//! let mut buffer = ParsingBuffer::new();
//! let mut parser = NameParser::new();
//! parser.initialize(&mut buffer, ParserOption::IgnoreLeadingWhitespace).unwrap();
//!
//! buffer.append("  ele");
//! assert_eq!(parser.parse(&mut buffer), ParseResult::NeedMoreData);
//! buffer.append("ment>");
//! assert_eq!(parser.parse(&mut buffer), ParseResult::Success);
//! assert_eq!(parser.value(), "element");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod error;
pub mod escape;
pub mod model;
pub mod parser;
pub mod reader;
pub mod utf8;
pub mod validator;
pub mod writer;

// Re-exports for convenience
pub use buffer::{Lookahead, ParsingBuffer};
pub use error::{Error, ErrorKind, Position, Result};
pub use escape::{escape_attribute_value, escape_text, unescape};
pub use model::{
    Attribute, AttributeList, DocumentType, ProcessingInstruction, QuoteStyle, Token, TokenKind,
    XmlDeclaration,
};
pub use reader::{tokenize, Event, ReaderConfig, XmlReader};
pub use writer::{WriterState, XmlWriter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_simple() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><root a="1"><b>text</b><c/></root>"#;
        let tokens = tokenize(xml).unwrap();

        let mut writer = XmlWriter::new();
        for token in &tokens {
            writer.write_token(token).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), xml);
    }

    #[test]
    fn test_roundtrip_escaped() {
        let xml = r#"<r q='"x" &amp; &lt;y&gt;'>a &lt; b &amp;&amp; c</r>"#;
        let tokens = tokenize(xml).unwrap();
        assert_eq!(tokens[1], Token::Text("a < b && c".into()));

        let mut writer = XmlWriter::new();
        for token in &tokens {
            writer.write_token(token).unwrap();
        }
        assert_eq!(
            writer.finish().unwrap(),
            r#"<r q='"x" &amp; &lt;y>'>a &lt; b &amp;&amp; c</r>"#
        );
    }

    #[test]
    fn test_escape_unescape() {
        let original = "<a href=\"x\">&</a>";
        let escaped = escape_text(original);
        assert_eq!(escaped, "&lt;a href=\"x\">&amp;&lt;/a>");
        assert_eq!(unescape(&escaped).unwrap(), original);
    }

    #[test]
    fn test_error_reporting() {
        let err = tokenize("<root>\n  <child>\n</root>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MismatchedTag { .. }));
        let position = err.position().unwrap();
        assert_eq!(position.line, 3);
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_complex_xml() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE catalog>
<!-- Product catalog -->
<catalog xmlns:x="urn:x">
    <product id="1" x:featured="true">
        <name>Widget</name>
        <price currency="USD">9.99</price>
        <description><![CDATA[A <useful> widget]]></description>
        <?audit checked?>
    </product>
</catalog>
"#;
        let tokens = tokenize(xml).unwrap();
        let names: Vec<_> = tokens
            .iter()
            .filter(|token| token.kind() == TokenKind::StartOfElement)
            .filter_map(Token::name)
            .collect();
        assert_eq!(names, ["catalog", "product", "name", "price", "description"]);
        assert!(tokens.contains(&Token::CData("A <useful> widget".into())));
        assert!(tokens.contains(&Token::ProcessingInstruction(ProcessingInstruction::new(
            "audit", "checked"
        ))));
    }
}
