//! Streaming example: tokenizing a document that arrives in small chunks.

use incremental_xml::{Event, ReaderConfig, Token, XmlReader};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE feed>
<feed lang="en">
    <entry id="1"><title>First &amp; foremost</title></entry>
    <entry id="2"><title>Ünïcödé survives byte splits</title><![CDATA[<raw/>]]></entry>
    <!-- more entries follow -->
    <?refresh every="60"?>
</feed>
"#;

fn describe(token: &Token, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    match token {
        Token::XmlDeclaration(declaration) => format!("{}declaration {}", indent, declaration),
        Token::DocumentType(document_type) => format!("{}doctype {}", indent, document_type.name),
        Token::StartOfElement { name, attributes } | Token::EmptyElement { name, attributes } => {
            let attrs: Vec<String> = attributes
                .iter()
                .map(|attribute| format!("{}={:?}", attribute.name, attribute.value))
                .collect();
            format!("{}<{}> {}", indent, name, attrs.join(" "))
        }
        Token::EndOfElement { name } => format!("{}</{}>", indent, name),
        Token::Text(text) => format!("{}text {:?}", indent, text),
        Token::CData(data) => format!("{}cdata {:?}", indent, data),
        Token::Comment(text) => format!("{}comment {:?}", indent, text),
        Token::ProcessingInstruction(instruction) => {
            format!("{}pi {} {:?}", indent, instruction.target, instruction.data)
        }
    }
}

fn main() {
    // 7-byte reads split multi-byte characters and markup alike.
    let mut source = FEED.as_bytes();
    let mut chunk = [0u8; 7];
    let config = ReaderConfig::new()
        .with_buffer_limit(128)
        .with_skip_whitespace_text(true);
    let mut reader = XmlReader::with_config(config);

    let mut reads = 0;
    let mut tokens = 0;
    loop {
        match reader.next_event() {
            Ok(Event::Token(token)) => {
                let depth = match token {
                    Token::StartOfElement { .. } => reader.depth().saturating_sub(1),
                    _ => reader.depth(),
                };
                println!("{}", describe(&token, depth));
                tokens += 1;
            }
            Ok(Event::NeedMoreData) => {
                if let Err(err) = reader.fill_from(&mut source, &mut chunk) {
                    eprintln!("Failed to read input: {}", err);
                    return;
                }
                reads += 1;
            }
            Ok(Event::EndOfDocument) => break,
            Err(err) => {
                eprintln!("Malformed document: {}", err);
                return;
            }
        }
    }

    println!();
    println!("{} tokens from {} reads of {} bytes", tokens, reads, chunk.len());
    println!("Still buffered: {} code points", reader.buffered_len());
}
