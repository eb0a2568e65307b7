//! Writer example: building a document and watching malformed calls fail.

use incremental_xml::{
    tokenize, Attribute, AttributeList, ProcessingInstruction, QuoteStyle, WriterState, XmlWriter,
};

fn main() {
    let mut writer = XmlWriter::new();

    writer.write_xml_declaration().expect("declaration");
    writer.write_document_type("order").expect("doctype");
    writer
        .write_processing_instruction(&ProcessingInstruction::new("app", "version=\"2\""))
        .expect("processing instruction");

    let attributes: AttributeList = [
        Attribute::new("id", "A-17"),
        Attribute::with_quote("customer", "O'Neil & Sons", QuoteStyle::Single),
    ]
    .into_iter()
    .collect();
    writer.write_start_of_element("order", &attributes).expect("root");

    for (sku, qty) in [("bolt", 40), ("nut", 40), ("washer", 80)] {
        let line: AttributeList =
            [Attribute::new("sku", sku), Attribute::new("qty", qty.to_string())]
                .into_iter()
                .collect();
        writer.write_empty_element("line", &line).expect("line");
    }

    writer.write_start_of_element("note", &AttributeList::new()).expect("note");
    writer.write_text("Deliver before 5 < 6 o'clock").expect("text");
    writer.write_end_of_element().expect("end note");
    writer.write_cdata("<signature/>").expect("cdata");
    writer.write_end_of_element().expect("end order");
    writer.write_comment(" end of order ").expect("comment");

    let xml = writer.finish().expect("complete document");
    println!("Written document:");
    println!("{}", xml);
    println!();

    let tokens = tokenize(&xml).expect("writer output tokenizes");
    println!("Read back {} tokens", tokens.len());
    println!();

    // A second root element is refused and poisons the writer.
    let mut writer = XmlWriter::new();
    writer.write_empty_element("a", &AttributeList::new()).expect("root");
    match writer.write_empty_element("b", &AttributeList::new()) {
        Ok(()) => println!("unexpectedly accepted a second root"),
        Err(err) => println!("Refused: {}", err),
    }
    assert_eq!(writer.state(), WriterState::Error);
    println!("Output after failure: {:?}", writer.xml_string());
}
