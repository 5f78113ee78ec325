//! Tree builder that folds quick-xml events into [`ParsedElement`]s.

use crate::{Error, ParsedDocument, ParsedElement, Result};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;

/// Nesting limit applied by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings for building a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Deepest element nesting accepted; the root is at depth 1.
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse XML from a string, producing a [`ParsedDocument`].
///
/// # Example
///
/// ```rust
/// use xmldict_tree::parse;
///
/// let doc = parse("<root><child/></root>").unwrap();
/// assert_eq!(doc.root.tag, "root");
/// assert_eq!(doc.root.children[0].tag, "child");
/// ```
///
/// # Errors
///
/// Returns an error if the XML is malformed or nests deeper than
/// [`DEFAULT_MAX_DEPTH`].
pub fn parse(content: &str) -> Result<ParsedDocument> {
    parse_with_config(content, &ParseConfig::default())
}

/// Parse XML from a string with explicit settings.
pub fn parse_with_config(content: &str, config: &ParseConfig) -> Result<ParsedDocument> {
    let mut builder = TreeBuilder::new(content, config.max_depth);
    let document = builder.parse()?;
    tracing::debug!(
        root = %document.root.tag,
        elements = document.root.element_count(),
        bytes = content.len(),
        "Built element tree"
    );
    Ok(document)
}

/// Internal parser state.
struct TreeBuilder<'a> {
    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    /// Deepest nesting accepted.
    max_depth: usize,

    /// Elements opened but not yet closed.
    stack: Vec<OpenElement>,
}

/// An element whose end tag has not been read yet.
struct OpenElement {
    /// The element, children accumulated so far.
    element: ParsedElement,

    /// Byte offset of the `<` that opened it.
    start_offset: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, max_depth: usize) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            max_depth,
            stack: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<ParsedDocument> {
        let mut root: Option<ParsedElement> = None;

        loop {
            let event_start = self.reader.buffer_position() as usize;

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let element = self.open_element(&e, event_start)?;
                    if root.is_some() && self.stack.is_empty() {
                        return Err(Error::MultipleRoots {
                            position: event_start,
                        });
                    }
                    self.stack.push(OpenElement {
                        element,
                        start_offset: event_start,
                    });
                }
                Ok(Event::End(e)) => {
                    let end_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let element = self.close_element(end_name, event_start)?;
                    self.attach(element, &mut root, event_start)?;
                }
                Ok(Event::Empty(e)) => {
                    let element = self.open_element(&e, event_start)?;
                    self.attach(element, &mut root, event_start)?;
                }
                Ok(Event::Text(e)) => {
                    let raw = String::from_utf8_lossy(&e);
                    let raw = normalize_line_endings(&raw);
                    let text = unescape(&raw).map_err(|err| Error::XmlSyntax {
                        message: format!("Invalid text content: {}", err),
                        position: Some(event_start),
                    })?;
                    self.push_character_data(&text, event_start)?;
                }
                Ok(Event::CData(e)) => {
                    let raw = String::from_utf8_lossy(&e);
                    self.push_character_data(&normalize_line_endings(&raw), event_start)?;
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {
                    // Character data on either side of these joins into one run
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position() as usize),
                    });
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", open.element.tag),
                position: open.start_offset,
            });
        }

        root.map(ParsedDocument::new).ok_or(Error::EmptyDocument)
    }

    /// Build the element for a start or empty tag, checking the depth limit.
    fn open_element(&self, e: &BytesStart<'_>, event_start: usize) -> Result<ParsedElement> {
        if self.stack.len() >= self.max_depth {
            return Err(Error::StructureTooDeep {
                max_depth: self.max_depth,
                position: event_start,
            });
        }

        let mut element = ParsedElement::new(String::from_utf8_lossy(e.name().as_ref()));

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| Error::XmlSyntax {
                message: format!("Attribute error: {}", err),
                position: Some(event_start),
            })?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let raw = normalize_attribute_value(&raw);
            let value = unescape(&raw).map_err(|err| Error::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(event_start),
            })?;
            element.attrib.insert(name, value.into_owned());
        }

        Ok(element)
    }

    fn close_element(&mut self, end_name: String, event_start: usize) -> Result<ParsedElement> {
        let mut open = self.stack.pop().ok_or_else(|| Error::InvalidStructure {
            message: format!("Unexpected closing tag </{}>", end_name),
            position: Some(event_start),
        })?;

        if open.element.tag != end_name {
            return Err(Error::MismatchedEndTag {
                expected: std::mem::take(&mut open.element.tag),
                found: end_name,
                position: event_start,
            });
        }

        Ok(open.element)
    }

    /// Hand a finished element to its parent, or make it the root.
    fn attach(
        &mut self,
        element: ParsedElement,
        root: &mut Option<ParsedElement>,
        event_start: usize,
    ) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.element.children.push(element);
                Ok(())
            }
            None if root.is_some() => Err(Error::MultipleRoots {
                position: event_start,
            }),
            None => {
                *root = Some(element);
                Ok(())
            }
        }
    }

    /// Route character data to the text of the open element, or to the tail
    /// of its last finished child.
    fn push_character_data(&mut self, data: &str, event_start: usize) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let Some(open) = self.stack.last_mut() else {
            // Outside the root only whitespace is allowed
            if data.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::InvalidStructure {
                message: "Text outside of the root element".to_string(),
                position: Some(event_start),
            });
        };

        let slot = match open.element.children.last_mut() {
            Some(child) => &mut child.tail,
            None => &mut open.element.text,
        };
        slot.get_or_insert_with(String::new).push_str(data);
        Ok(())
    }
}

/// Literal `\r\n` and lone `\r` read as `\n`. Character references are
/// resolved afterwards, so `&#13;` still yields a carriage return.
fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Line endings are normalized first, then every literal tab or newline in an
/// attribute value becomes a space.
fn normalize_attribute_value(raw: &str) -> Cow<'_, str> {
    let raw = normalize_line_endings(raw);
    if raw.contains(['\t', '\n']) {
        Cow::Owned(raw.replace(['\t', '\n'], " "))
    } else {
        raw
    }
}
