//! Element tree to dictionary conversion.

use crate::{AttributeMap, CollisionPolicy, DictOptions, Error, Field, Result, Value};
use xmldict_tree::{ParsedDocument, ParsedElement};

/// Something that can be handed to [`DictBuilder::build_tree`].
///
/// A handle resolves to a list of candidate roots; conversion only proceeds
/// when there is exactly one.
pub trait TreeHandle {
    fn roots(&self) -> &[ParsedElement];
}

impl TreeHandle for ParsedElement {
    fn roots(&self) -> &[ParsedElement] {
        std::slice::from_ref(self)
    }
}

impl TreeHandle for ParsedDocument {
    fn roots(&self) -> &[ParsedElement] {
        std::slice::from_ref(&self.root)
    }
}

impl TreeHandle for [ParsedElement] {
    fn roots(&self) -> &[ParsedElement] {
        self
    }
}

impl TreeHandle for Vec<ParsedElement> {
    fn roots(&self) -> &[ParsedElement] {
        self
    }
}

/// Converts element trees into [`AttributeMap`]s.
///
/// Each element becomes one map: the selected scalar fields first, then one
/// entry per distinct child tag. Traversal uses an explicit stack, so the
/// depth of the tree does not touch the call stack.
///
/// ```rust
/// use xmldict::{DictBuilder, DictOptions};
///
/// let doc = xmldict_tree::parse(r#"<data><category attribute="5">x</category></data>"#).unwrap();
/// let map = DictBuilder::new(DictOptions::default()).build(&doc.root);
///
/// assert_eq!(map.tag(), Some("data"));
/// assert_eq!(map["category"]["attrib"].as_attributes().unwrap()["attribute"], "5");
/// assert_eq!(map["category"]["text"].as_text(), Some("x"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DictBuilder {
    options: DictOptions,
}

/// An element whose map is still collecting children.
struct Frame<'e> {
    element: &'e ParsedElement,
    map: AttributeMap,
    next_child: usize,
}

impl DictBuilder {
    pub fn new(options: DictOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DictOptions {
        &self.options
    }

    /// Convert an element and its whole subtree.
    pub fn build(&self, element: &ParsedElement) -> AttributeMap {
        tracing::debug!(
            root = %element.tag,
            fields = ?self.options.contains,
            collision = ?self.options.collision,
            normalize_text = self.options.normalize_text,
            "Building dictionary"
        );

        let mut ancestors: Vec<Frame<'_>> = Vec::new();
        let mut current = self.open(element);

        loop {
            let element = current.element;
            if let Some(child) = element.children.get(current.next_child) {
                current.next_child += 1;
                let child_frame = self.open(child);
                ancestors.push(std::mem::replace(&mut current, child_frame));
                continue;
            }

            match ancestors.pop() {
                Some(mut parent) => {
                    self.attach(&mut parent.map, &element.tag, current.map);
                    current = parent;
                }
                None => return current.map,
            }
        }
    }

    /// Convert whatever `handle` points at, provided it is a single root.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTreeHandle`] when the handle holds no root or several,
    /// before any traversal.
    pub fn build_tree<H: TreeHandle + ?Sized>(&self, handle: &H) -> Result<AttributeMap> {
        match handle.roots() {
            [root] => Ok(self.build(root)),
            roots => Err(Error::InvalidTreeHandle { roots: roots.len() }),
        }
    }

    /// Start a map holding the element's selected scalar fields.
    fn open<'e>(&self, element: &'e ParsedElement) -> Frame<'e> {
        let mut map = AttributeMap::with_capacity(self.options.contains.len() + element.children.len());

        for field in self.options.contains.iter() {
            let value = match field {
                Field::Attrib => Value::Attributes(element.attrib.clone()),
                Field::Tag => Value::Text(element.tag.clone()),
                Field::Text => match &element.text {
                    Some(text) if self.options.normalize_text => Value::Text(normalize(text)),
                    text => Value::from(text.clone()),
                },
                Field::Tail => Value::from(element.tail.clone()),
            };
            map.set(field.key(), value);
        }

        Frame {
            element,
            map,
            next_child: 0,
        }
    }

    /// Store a finished child map under its tag.
    fn attach(&self, parent: &mut AttributeMap, tag: &str, child: AttributeMap) {
        let child = Value::Node(child);

        match parent.get_mut(tag) {
            None => {
                parent.set(tag, child);
            }
            Some(existing) => {
                tracing::trace!(tag, policy = ?self.options.collision, "Sibling tag collision");
                match (self.options.collision, existing) {
                    (CollisionPolicy::Flatten, Value::Group(items)) => items.push(child),
                    (_, existing) => {
                        let previous = std::mem::take(existing);
                        *existing = Value::Group(vec![previous, child]);
                    }
                }
            }
        }
    }
}

/// Drop tab and newline characters.
fn normalize(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\t' | '\n')).collect()
}

/// Convert `element` with `options`.
pub fn build(element: &ParsedElement, options: &DictOptions) -> AttributeMap {
    DictBuilder::new(options.clone()).build(element)
}
