//! XML writer.
//!
//! [`XmlWriter`] builds a document in memory and refuses any call that would
//! make it malformed. The first refused call moves the writer into
//! [`WriterState::Error`], after which every write fails until
//! [`clear`](XmlWriter::clear) is called.
//!
//! ```
//! use incremental_xml::{Attribute, AttributeList, XmlWriter};
//!
//! let mut writer = XmlWriter::new();
//! let attributes: AttributeList = [Attribute::new("id", "1")].into_iter().collect();
//!
//! writer.write_xml_declaration().unwrap();
//! writer.write_start_of_element("note", &attributes).unwrap();
//! writer.write_text("a < b").unwrap();
//! writer.write_end_of_element().unwrap();
//!
//! assert_eq!(
//!     writer.finish().unwrap(),
//!     r#"<?xml version="1.0" encoding="UTF-8"?><note id="1">a &lt; b</note>"#
//! );
//! ```

use crate::error::{Error, Result};
use crate::escape::{escape_attribute_value_to, escape_text_continued_to};
use crate::model::{AttributeList, ProcessingInstruction, Token, XmlDeclaration};
use crate::validator::{
    validate_attribute_value, validate_cdata, validate_comment, validate_name, validate_text_node,
};
use log::{debug, trace};

const LOG_TARGET: &str = "incremental_xml::writer";

/// Where in the document the writer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing written yet.
    Empty,
    /// Prolog content written, no root element yet.
    DocumentStarted,
    /// Inside the root element.
    Element,
    /// The root element is closed.
    DocumentEnded,
    /// A call was refused; the output is no longer usable.
    Error,
}

/// An XML writer that only produces well-formed documents.
#[derive(Debug, Clone)]
pub struct XmlWriter {
    state: WriterState,
    /// Root element name required by the document type, if one was written.
    document_type: Option<String>,
    /// Stack of open element names.
    element_stack: Vec<String>,
    output: String,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    /// Creates a writer for an empty document.
    #[inline]
    pub fn new() -> Self {
        Self {
            state: WriterState::Empty,
            document_type: None,
            element_stack: Vec::new(),
            output: String::new(),
        }
    }

    /// Discards the document and returns to [`WriterState::Empty`].
    pub fn clear(&mut self) {
        self.state = WriterState::Empty;
        self.document_type = None;
        self.element_stack.clear();
        self.output.clear();
    }

    /// The current state.
    #[inline]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Returns the current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.element_stack.len()
    }

    /// The document written so far; empty once the writer has failed.
    #[inline]
    pub fn xml_string(&self) -> &str {
        match self.state {
            WriterState::Error => "",
            _ => &self.output,
        }
    }

    /// Returns the finished document. Fails unless the root element is
    /// closed.
    pub fn finish(self) -> Result<String> {
        match self.state {
            WriterState::DocumentEnded => Ok(self.output),
            state => Err(Error::invalid_state(format!("document is not complete ({:?})", state))),
        }
    }

    /// Writes `<?xml version="1.0" encoding="UTF-8"?>`. Only allowed first.
    pub fn write_xml_declaration(&mut self) -> Result<()> {
        self.write_declaration(&XmlDeclaration::default())
    }

    /// Writes the given declaration. Only allowed first.
    ///
    /// The output is always UTF-8, so a declaration naming another encoding
    /// is refused.
    pub fn write_declaration(&mut self, declaration: &XmlDeclaration) -> Result<()> {
        if self.state != WriterState::Empty {
            return Err(self.fail(Error::invalid_state("the XML declaration must come first")));
        }
        if !declaration.is_valid() {
            return Err(self.fail(Error::invalid_declaration(declaration.to_string())));
        }
        if !declaration.is_utf8() {
            let encoding = declaration.encoding.as_deref().unwrap_or_default();
            return Err(self.fail(Error::invalid_declaration(format!(
                "cannot write {} output",
                encoding
            ))));
        }

        self.output.push_str("<?xml ");
        self.output.push_str(&declaration.to_string());
        self.output.push_str("?>");
        self.transition(WriterState::DocumentStarted);
        Ok(())
    }

    /// Writes `<!DOCTYPE name>`. The root element must then be called `name`.
    pub fn write_document_type(&mut self, name: &str) -> Result<()> {
        if self.document_type.is_some() {
            return Err(self.fail(Error::invalid_state("document type already written")));
        }
        if !matches!(self.state, WriterState::Empty | WriterState::DocumentStarted) {
            return Err(self.fail(Error::invalid_state("document type after the root element")));
        }
        if !validate_name(name) {
            return Err(self.fail(Error::invalid_name(name)));
        }

        self.output.push_str("<!DOCTYPE ");
        self.output.push_str(name);
        self.output.push('>');
        self.document_type = Some(name.to_string());
        self.transition(WriterState::DocumentStarted);
        Ok(())
    }

    /// Writes `<!--text-->`.
    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        let next = self.misc_state()?;
        if !validate_comment(text) {
            return Err(self.fail(Error::syntax(format!("invalid comment text: {:?}", text))));
        }

        self.output.push_str("<!--");
        self.output.push_str(text);
        self.output.push_str("-->");
        self.transition(next);
        Ok(())
    }

    /// Writes `<?target data?>`, or `<?target?>` when the data is empty.
    ///
    /// Data starting with whitespace is refused: the separator after the
    /// target would swallow it on reading.
    pub fn write_processing_instruction(
        &mut self,
        instruction: &ProcessingInstruction,
    ) -> Result<()> {
        let next = self.misc_state()?;
        if !instruction.is_valid() {
            return Err(self.fail(Error::syntax(format!(
                "invalid processing instruction: {:?}",
                instruction.target
            ))));
        }

        self.output.push_str("<?");
        self.output.push_str(&instruction.target);
        if !instruction.data.is_empty() {
            self.output.push(' ');
            self.output.push_str(&instruction.data);
        }
        self.output.push_str("?>");
        self.transition(next);
        Ok(())
    }

    /// Writes `<name attributes...>` and opens the element.
    pub fn write_start_of_element(
        &mut self,
        name: &str,
        attributes: &AttributeList,
    ) -> Result<()> {
        self.check_element_allowed(name)?;
        self.write_tag(name, attributes, ">")?;
        self.element_stack.push(name.to_string());
        self.transition(WriterState::Element);
        Ok(())
    }

    /// Writes `<name attributes.../>`.
    pub fn write_empty_element(&mut self, name: &str, attributes: &AttributeList) -> Result<()> {
        self.check_element_allowed(name)?;
        self.write_tag(name, attributes, "/>")?;
        if self.element_stack.is_empty() {
            self.transition(WriterState::DocumentEnded);
        }
        Ok(())
    }

    /// Writes escaped character data inside the root element.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        if self.state != WriterState::Element {
            return Err(self.fail(Error::invalid_state("text outside the root element")));
        }

        // A closing tag or markup never ends in `]`, so trailing brackets
        // belong to character data of this element.
        let brackets = self.output.bytes().rev().take(2).take_while(|&b| b == b']').count();
        let start = self.output.len();
        escape_text_continued_to(text, brackets, &mut self.output);
        if !validate_text_node(&self.output[start..]) {
            self.output.truncate(start);
            return Err(self.fail(Error::syntax("text contains characters not allowed in XML")));
        }
        Ok(())
    }

    /// Writes `<![CDATA[data]]>` inside the root element.
    pub fn write_cdata(&mut self, data: &str) -> Result<()> {
        if self.state != WriterState::Element {
            return Err(self.fail(Error::invalid_state("CDATA section outside the root element")));
        }
        if !validate_cdata(data) {
            return Err(self.fail(Error::syntax(
                "CDATA section content contains \"]]>\" or invalid characters",
            )));
        }

        self.output.push_str("<![CDATA[");
        self.output.push_str(data);
        self.output.push_str("]]>");
        Ok(())
    }

    /// Closes the innermost open element.
    pub fn write_end_of_element(&mut self) -> Result<()> {
        let name = match (self.state, self.element_stack.pop()) {
            (WriterState::Element, Some(name)) => name,
            _ => return Err(self.fail(Error::invalid_state("no element to close"))),
        };

        self.output.push_str("</");
        self.output.push_str(&name);
        self.output.push('>');
        if self.element_stack.is_empty() {
            self.transition(WriterState::DocumentEnded);
        }
        Ok(())
    }

    /// Writes a token produced by the reader.
    ///
    /// An XML declaration token keeps its version and `standalone` flag. A
    /// declaration naming an encoding other than UTF-8 is refused, see
    /// [`write_declaration`](Self::write_declaration).
    pub fn write_token(&mut self, token: &Token) -> Result<()> {
        match token {
            Token::XmlDeclaration(declaration) => self.write_declaration(declaration),
            Token::DocumentType(document_type) => self.write_document_type(&document_type.name),
            Token::StartOfElement { name, attributes } => {
                self.write_start_of_element(name, attributes)
            }
            Token::EmptyElement { name, attributes } => self.write_empty_element(name, attributes),
            Token::EndOfElement { .. } => self.write_end_of_element(),
            Token::Text(text) => self.write_text(text),
            Token::CData(data) => self.write_cdata(data),
            Token::Comment(text) => self.write_comment(text),
            Token::ProcessingInstruction(instruction) => {
                self.write_processing_instruction(instruction)
            }
        }
    }

    /// State after a comment or processing instruction, which are allowed
    /// anywhere.
    fn misc_state(&mut self) -> Result<WriterState> {
        match self.state {
            WriterState::Empty => Ok(WriterState::DocumentStarted),
            WriterState::Error => Err(Error::invalid_state("the writer has failed")),
            state => Ok(state),
        }
    }

    fn check_element_allowed(&mut self, name: &str) -> Result<()> {
        if !validate_name(name) {
            return Err(self.fail(Error::invalid_name(name)));
        }
        match self.state {
            WriterState::Element => Ok(()),
            WriterState::Empty | WriterState::DocumentStarted => match &self.document_type {
                Some(root) if root != name => {
                    let err = Error::mismatched_tag(root.as_str(), name);
                    Err(self.fail(err))
                }
                _ => Ok(()),
            },
            WriterState::DocumentEnded => {
                Err(self.fail(Error::invalid_state("more than one root element")))
            }
            WriterState::Error => Err(Error::invalid_state("the writer has failed")),
        }
    }

    fn write_tag(&mut self, name: &str, attributes: &AttributeList, close: &str) -> Result<()> {
        let mut tag = String::with_capacity(name.len() + 2 + attributes.len() * 16);
        tag.push('<');
        tag.push_str(name);

        for attribute in attributes {
            if !validate_name(&attribute.name) {
                return Err(self.fail(Error::invalid_name(attribute.name.as_str())));
            }
            let quote = attribute.quote.as_char();
            tag.push(' ');
            tag.push_str(&attribute.name);
            tag.push('=');
            tag.push(quote);
            let value_start = tag.len();
            escape_attribute_value_to(&attribute.value, attribute.quote, &mut tag);
            if !validate_attribute_value(&tag[value_start..], attribute.quote) {
                return Err(self.fail(Error::syntax(format!(
                    "attribute {} contains characters not allowed in XML",
                    attribute.name
                ))));
            }
            tag.push(quote);
        }

        tag.push_str(close);
        self.output.push_str(&tag);
        trace!(target: LOG_TARGET, "wrote <{}> with {} attributes", name, attributes.len());
        Ok(())
    }

    fn transition(&mut self, next: WriterState) {
        if self.state != next {
            trace!(target: LOG_TARGET, "{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        debug!(target: LOG_TARGET, "refused write in {:?}: {}", self.state, err);
        self.state = WriterState::Error;
        err
    }
}
