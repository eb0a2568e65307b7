//! Documents built with the writer tokenize back to what was written.

use incremental_xml::{
    tokenize, Attribute, AttributeList, DocumentType, ProcessingInstruction, QuoteStyle, Token,
    XmlDeclaration, XmlWriter,
};

fn attributes(list: &[(&str, &str, QuoteStyle)]) -> AttributeList {
    list.iter()
        .map(|&(name, value, quote)| Attribute::with_quote(name, value, quote))
        .collect()
}

/// Writes `tokens` in order and returns the document.
fn write_all(tokens: &[Token]) -> String {
    let mut writer = XmlWriter::new();
    for token in tokens {
        writer.write_token(token).unwrap();
    }
    writer.finish().unwrap()
}

#[test]
fn test_every_writer_operation_round_trips() {
    let written = vec![
        Token::XmlDeclaration(XmlDeclaration::default()),
        Token::DocumentType(DocumentType::new("inventory")),
        Token::Comment(" stock as of today ".into()),
        Token::ProcessingInstruction(ProcessingInstruction::new("app", "mode=\"audit\"")),
        Token::StartOfElement {
            name: "inventory".into(),
            attributes: attributes(&[
                ("site", "north", QuoteStyle::Double),
                ("owner", "O'Brien & \"Sons\"", QuoteStyle::Single),
            ]),
        },
        Token::Text("Items < 10 & ]]> flagged".into()),
        Token::EmptyElement {
            name: "item".into(),
            attributes: attributes(&[("sku", "a<1>", QuoteStyle::Double)]),
        },
        Token::StartOfElement {
            name: "notes".into(),
            attributes: AttributeList::new(),
        },
        Token::CData("if (a < b && c > d) { return; }".into()),
        Token::Comment("inner".into()),
        Token::ProcessingInstruction(ProcessingInstruction::new("flush", "")),
        Token::EndOfElement { name: "notes".into() },
        Token::Text("zażółć gęślą jaźń".into()),
        Token::EndOfElement { name: "inventory".into() },
        Token::Comment(" trailer ".into()),
    ];

    let xml = write_all(&written);
    assert_eq!(tokenize(&xml).unwrap(), written);
}

#[test]
fn test_reader_output_rewrites_identically() {
    let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><!DOCTYPE r><r a='1' b=\"&quot;\">\
               x &amp; y<s/><![CDATA[]]]]><!--c--><?p d?></r>";
    let tokens = tokenize(xml).unwrap();
    let rewritten = write_all(&tokens);
    assert_eq!(tokenize(&rewritten).unwrap(), tokens);
    assert_eq!(rewritten, xml);
}

#[test]
fn test_nested_structure_round_trips() {
    let mut writer = XmlWriter::new();
    writer.write_start_of_element("tree", &AttributeList::new()).unwrap();
    for depth in 0..16 {
        let attrs: AttributeList =
            [Attribute::new("depth", depth.to_string())].into_iter().collect();
        writer.write_start_of_element("node", &attrs).unwrap();
    }
    writer.write_text("leaf").unwrap();
    for _ in 0..16 {
        writer.write_end_of_element().unwrap();
    }
    writer.write_end_of_element().unwrap();
    let xml = writer.finish().unwrap();

    let tokens = tokenize(&xml).unwrap();
    assert_eq!(tokens.len(), 2 + 16 * 2 + 1);
    match &tokens[16] {
        Token::StartOfElement { attributes, .. } => {
            assert_eq!(attributes.get("depth").map(|a| a.value.as_str()), Some("15"));
        }
        other => panic!("expected StartOfElement, got {:?}", other),
    }
    assert_eq!(tokens[17], Token::Text("leaf".into()));
}

#[test]
fn test_tokens_serialize_as_json() {
    let tokens = tokenize("<a k='v'>t</a>").unwrap();
    let json = serde_json::to_string(&tokens).unwrap();
    let back: Vec<Token> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tokens);
    assert!(json.contains("\"quote\":\"Single\""));
}

#[test]
fn test_text_split_inside_cdata_end_round_trips() {
    let mut writer = XmlWriter::new();
    writer.write_start_of_element("a", &AttributeList::new()).unwrap();
    writer.write_text("x]]").unwrap();
    writer.write_text(">").unwrap();
    writer.write_end_of_element().unwrap();
    let xml = writer.finish().unwrap();

    assert_eq!(
        tokenize(&xml).unwrap(),
        vec![
            Token::StartOfElement {
                name: "a".into(),
                attributes: AttributeList::new(),
            },
            Token::Text("x]]>".into()),
            Token::EndOfElement { name: "a".into() },
        ]
    );
}

#[test]
fn test_instruction_data_round_trips_or_is_refused() {
    let mut writer = XmlWriter::new();
    assert!(writer
        .write_processing_instruction(&ProcessingInstruction::new("p", "  data"))
        .is_err());

    let written = vec![
        Token::ProcessingInstruction(ProcessingInstruction::new("p", "data  ")),
        Token::EmptyElement {
            name: "r".into(),
            attributes: AttributeList::new(),
        },
    ];
    assert_eq!(tokenize(&write_all(&written)).unwrap(), written);
}

#[test]
fn test_standalone_declaration_round_trips() {
    let xml = r#"<?xml version="1.0" standalone="no"?><r/>"#;
    let tokens = tokenize(xml).unwrap();
    assert_eq!(write_all(&tokens), xml);
}
