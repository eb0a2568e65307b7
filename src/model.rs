//! Token payloads and the immutable value holders they are built from.

use crate::error::{Error, Result};
use crate::validator::{is_name_char, is_whitespace, validate_name};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Quotation mark delimiting an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuoteStyle {
    /// `"value"`
    #[default]
    Double,
    /// `'value'`
    Single,
}

impl QuoteStyle {
    /// The delimiting character.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }

    /// Maps a delimiting character back to its style.
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(QuoteStyle::Double),
            '\'' => Some(QuoteStyle::Single),
            _ => None,
        }
    }
}

/// An XML attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value, with references decoded.
    pub value: String,
    /// The quotation mark used (or to be used) around the value.
    pub quote: QuoteStyle,
}

impl Attribute {
    /// Creates a double-quoted attribute.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self::with_quote(name, value, QuoteStyle::Double)
    }

    /// Creates an attribute with an explicit quote style.
    pub fn with_quote<N: Into<String>, V: Into<String>>(
        name: N,
        value: V,
        quote: QuoteStyle,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            quote,
        }
    }
}

/// Attributes in the order they were encountered.
///
/// Names are not checked for uniqueness at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeList(Vec<Attribute>);

impl AttributeList {
    /// Creates an empty list.
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an attribute.
    #[inline]
    pub fn add(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    /// Returns the first attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|attribute| attribute.name == name)
    }

    /// Number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list holds no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the attributes in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    /// Removes all attributes.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Index<usize> for AttributeList {
    type Output = Attribute;

    fn index(&self, index: usize) -> &Attribute {
        &self.0[index]
    }
}

impl FromIterator<Attribute> for AttributeList {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AttributeList {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A `<!DOCTYPE name>` declaration, constraining the root element name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Required root element name.
    pub name: String,
}

impl DocumentType {
    /// Creates a document type for the given root element name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    /// A document type is valid when its name is a valid XML name.
    pub fn is_valid(&self) -> bool {
        validate_name(&self.name)
    }
}

/// A processing instruction: `<?target data?>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingInstruction {
    /// Processing instruction target.
    pub target: String,
    /// Literal data, empty when the instruction has none.
    pub data: String,
}

impl ProcessingInstruction {
    /// Creates a processing instruction.
    pub fn new<T: Into<String>, D: Into<String>>(target: T, data: D) -> Self {
        Self {
            target: target.into(),
            data: data.into(),
        }
    }

    /// Checks the target (a name other than `xml`) and the data (no `?>`,
    /// no leading whitespace, which would be read back as the separator).
    pub fn is_valid(&self) -> bool {
        crate::validator::validate_pi_target(&self.target)
            && crate::validator::validate_pi_data(&self.data)
            && !self.data.starts_with(crate::validator::is_whitespace)
    }
}

/// The XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlDeclaration {
    /// XML version (e.g., "1.0").
    pub version: String,
    /// Character encoding (e.g., "UTF-8").
    pub encoding: Option<String>,
    /// Standalone document declaration.
    pub standalone: Option<bool>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
        }
    }
}

impl XmlDeclaration {
    /// Parses the pseudo-attributes of an XML declaration from the data of
    /// a processing instruction whose target is `xml`.
    ///
    /// ```text
    /// XMLDecl      ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
    /// VersionNum   ::= '1.' [0-9]+
    /// EncName      ::= [A-Za-z] ([A-Za-z0-9._] | '-')*
    /// SDDecl       ::= S 'standalone' Eq (("'" ('yes' | 'no') "'") | ('"' ('yes' | 'no') '"'))
    /// ```
    pub fn from_pi_data(data: &str) -> Result<Self> {
        let mut pairs = pseudo_attributes(data)?.into_iter().peekable();

        let version = match pairs.next() {
            Some((name, value)) if name == "version" => value,
            _ => return Err(Error::invalid_declaration("version must come first")),
        };
        if !is_version_num(&version) {
            return Err(Error::invalid_declaration(format!("unsupported version {:?}", version)));
        }

        let mut declaration = Self {
            version,
            encoding: None,
            standalone: None,
        };

        if let Some((_, value)) = pairs.next_if(|(name, _)| name == "encoding") {
            if !is_enc_name(&value) {
                return Err(Error::invalid_declaration(format!("invalid encoding {:?}", value)));
            }
            declaration.encoding = Some(value);
        }

        if let Some((_, value)) = pairs.next_if(|(name, _)| name == "standalone") {
            declaration.standalone = match value.as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                other => {
                    return Err(Error::invalid_declaration(format!(
                        "standalone must be 'yes' or 'no', found {:?}",
                        other
                    )))
                }
            };
        }

        match pairs.next() {
            Some((name, _)) => Err(Error::invalid_declaration(format!(
                "unexpected pseudo-attribute {:?}",
                name
            ))),
            None => Ok(declaration),
        }
    }

    /// Returns `true` if the declared encoding is UTF-8 (or absent).
    pub fn is_utf8(&self) -> bool {
        self.encoding
            .as_deref()
            .map_or(true, |encoding| encoding.eq_ignore_ascii_case("utf-8"))
    }

    /// Checks the fields against the declaration grammar.
    pub fn is_valid(&self) -> bool {
        is_version_num(&self.version) && self.encoding.as_deref().map_or(true, is_enc_name)
    }
}

/// Formats the declaration's pseudo-attributes, as they appear after `<?xml `.
impl fmt::Display for XmlDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "version=\"{}\"", self.version)?;
        if let Some(encoding) = &self.encoding {
            write!(f, " encoding=\"{}\"", encoding)?;
        }
        if let Some(standalone) = self.standalone {
            write!(f, " standalone=\"{}\"", if standalone { "yes" } else { "no" })?;
        }
        Ok(())
    }
}

fn is_version_num(version: &str) -> bool {
    version
        .strip_prefix("1.")
        .map_or(false, |minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

fn is_enc_name(encoding: &str) -> bool {
    let mut bytes = encoding.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Splits `name = "value"` pairs separated by whitespace.
fn pseudo_attributes(data: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(3);
    let mut chars = data.chars().peekable();

    loop {
        let mut separated = false;
        while chars.next_if(|&c| is_whitespace(c)).is_some() {
            separated = true;
        }
        if chars.peek().is_none() {
            return Ok(pairs);
        }
        if !pairs.is_empty() && !separated {
            return Err(Error::invalid_declaration("missing whitespace between pseudo-attributes"));
        }

        let mut name = String::new();
        while let Some(c) = chars.next_if(|&c| is_name_char(c)) {
            name.push(c);
        }
        if !validate_name(&name) {
            return Err(Error::invalid_declaration(format!(
                "invalid pseudo-attribute name {:?}",
                name
            )));
        }

        while chars.next_if(|&c| is_whitespace(c)).is_some() {}
        if chars.next() != Some('=') {
            return Err(Error::invalid_declaration(format!("expected '=' after {}", name)));
        }
        while chars.next_if(|&c| is_whitespace(c)).is_some() {}

        let quote = match chars.next().and_then(QuoteStyle::from_char) {
            Some(quote) => quote.as_char(),
            None => return Err(Error::invalid_declaration(format!("unquoted value for {}", name))),
        };
        let mut value = String::new();
        loop {
            match chars.next() {
                Some(c) if c == quote => break,
                Some(c) => value.push(c),
                None => {
                    return Err(Error::invalid_declaration(format!(
                        "unterminated value for {}",
                        name
                    )))
                }
            }
        }
        pairs.push((name, value));
    }
}

/// The closed set of token kinds a sub-parser can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `<name attr="value">`
    StartOfElement,
    /// `<name attr="value"/>`
    EmptyElement,
    /// `</name>`
    EndOfElement,
    /// Character data between markup.
    Text,
    /// `<![CDATA[...]]>`
    CData,
    /// `<!-- ... -->`
    Comment,
    /// `<?target data?>`
    ProcessingInstruction,
    /// `<?xml version="1.0"?>`
    XmlDeclaration,
    /// `<!DOCTYPE name>`
    DocumentType,
}

/// A fully recognized token with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// XML declaration.
    XmlDeclaration(XmlDeclaration),
    /// Document type declaration.
    DocumentType(DocumentType),
    /// Start of an element.
    StartOfElement {
        /// Element name.
        name: String,
        /// Element attributes.
        attributes: AttributeList,
    },
    /// Empty element.
    EmptyElement {
        /// Element name.
        name: String,
        /// Element attributes.
        attributes: AttributeList,
    },
    /// End of an element.
    EndOfElement {
        /// Element name.
        name: String,
    },
    /// Text content, references decoded.
    Text(String),
    /// CDATA section content, verbatim.
    CData(String),
    /// Comment text between `<!--` and `-->`.
    Comment(String),
    /// Processing instruction.
    ProcessingInstruction(ProcessingInstruction),
}

impl Token {
    /// Returns the kind of this token.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::XmlDeclaration(_) => TokenKind::XmlDeclaration,
            Token::DocumentType(_) => TokenKind::DocumentType,
            Token::StartOfElement { .. } => TokenKind::StartOfElement,
            Token::EmptyElement { .. } => TokenKind::EmptyElement,
            Token::EndOfElement { .. } => TokenKind::EndOfElement,
            Token::Text(_) => TokenKind::Text,
            Token::CData(_) => TokenKind::CData,
            Token::Comment(_) => TokenKind::Comment,
            Token::ProcessingInstruction(_) => TokenKind::ProcessingInstruction,
        }
    }

    /// Element name for start, empty and end tokens.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::StartOfElement { name, .. }
            | Token::EmptyElement { name, .. }
            | Token::EndOfElement { name } => Some(name),
            Token::DocumentType(doctype) => Some(&doctype.name),
            _ => None,
        }
    }
}
