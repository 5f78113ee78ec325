//! Core types for element trees.

use indexmap::IndexMap;

/// A parsed XML document.
///
/// The wrapper exists so that callers can tell a whole document apart from a
/// single element; the document itself only owns its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// The root element of the document.
    pub root: ParsedElement,
}

/// An XML element with its text, tail, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedElement {
    /// The element name as written in the source, prefix included.
    pub tag: String,

    /// Character data between the start tag and the first child (or the end
    /// tag for leaves). `None` when the element has no such content.
    pub text: Option<String>,

    /// Character data between this element's end tag and the next sibling (or
    /// the parent's end tag). `None` when there is none; always `None` for the
    /// root.
    pub tail: Option<String>,

    /// Attributes in document order, values unescaped.
    pub attrib: IndexMap<String, String>,

    /// Child elements in document order.
    pub children: Vec<ParsedElement>,
}

impl ParsedDocument {
    /// Create a new document around its root element.
    pub fn new(root: ParsedElement) -> Self {
        Self { root }
    }
}

impl ParsedElement {
    /// Create a new childless element with no content.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            tail: None,
            attrib: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style setter for the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder-style setter for the tail content.
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    /// Builder-style setter for a single attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrib.insert(name.into(), value.into());
        self
    }

    /// Builder-style append of a child element.
    pub fn with_child(mut self, child: ParsedElement) -> Self {
        self.children.push(child);
        self
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrib.get(name).map(String::as_str)
    }

    /// Get child elements by tag.
    pub fn get_children(&self, tag: &str) -> Vec<&ParsedElement> {
        self.children.iter().filter(|c| c.tag == tag).collect()
    }

    /// Check if this element has child elements.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of elements in this subtree, this element included.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            count += 1;
            pending.extend(element.children.iter());
        }
        count
    }

    /// Nesting depth of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((element, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(element.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}

// Descendants drain onto a heap stack; drop depth stays constant.
impl Drop for ParsedElement {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut element) = pending.pop() {
            pending.append(&mut element.children);
        }
    }
}
