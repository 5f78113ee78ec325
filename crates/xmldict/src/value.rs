//! The dictionary types: [`Value`] and [`AttributeMap`].

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::ops::Index;

/// Shared target for total reads of missing keys.
static NULL: Value = Value::Null;

/// One slot of an [`AttributeMap`].
///
/// The variants mirror what an element contributes to its dictionary: scalar
/// text (`tag`, `text`, `tail`), the attribute set, child elements, and the
/// groups formed when same-tagged siblings collide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absent text or tail.
    #[default]
    Null,

    /// A string: the tag, text or tail of an element.
    Text(String),

    /// An element's attributes, in document order.
    Attributes(IndexMap<String, String>),

    /// A child element.
    Node(AttributeMap),

    /// Values that collided under one key.
    ///
    /// Items are usually nodes, but may be groups themselves (nested
    /// collisions) or scalars (a child tagged like a selected field).
    Group(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_attributes(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Value::Attributes(attrib) => Some(attrib),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&AttributeMap> {
        match self {
            Value::Node(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[Value]> {
        match self {
            Value::Group(items) => Some(items),
            _ => None,
        }
    }

    /// Read a key of a node value; every other variant has no keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_node().and_then(|map| map.get(key))
    }

    /// Nodes reachable from this value, with groups flattened depth-first.
    ///
    /// Useful for walking repeated siblings without caring how the collision
    /// policy nested them.
    pub fn nodes(&self) -> Vec<&AttributeMap> {
        let mut nodes = Vec::new();
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            match value {
                Value::Node(map) => nodes.push(map),
                Value::Group(items) => pending.extend(items.iter().rev()),
                _ => {}
            }
        }
        nodes
    }

    /// Convert to a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

// Nested maps and groups drain onto a heap stack; drop depth stays constant.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = match self {
            Value::Node(map) => map.drain_values(),
            Value::Group(items) => std::mem::take(items),
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Node(map) => pending.extend(map.drain_values()),
                Value::Group(items) => pending.append(items),
                _ => {}
            }
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        text.map_or(Value::Null, Value::Text)
    }
}

impl From<IndexMap<String, String>> for Value {
    fn from(attrib: IndexMap<String, String>) -> Self {
        Value::Attributes(attrib)
    }
}

impl From<AttributeMap> for Value {
    fn from(map: AttributeMap) -> Self {
        Value::Node(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Group(items)
    }
}

/// `value["key"]`: a node's entry, `Null` otherwise.
impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

/// `value[i]`: a group's item, `Null` otherwise.
impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.as_group()
            .and_then(|items| items.get(index))
            .unwrap_or(&NULL)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Attributes(attrib) => attrib.serialize(serializer),
            Value::Node(map) => map.serialize(serializer),
            Value::Group(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// A dictionary whose entries double as named properties.
///
/// There is a single store: [`AttributeMap::insert`] (mapping style) and
/// [`AttributeMap::set`] (property style) write the same slot, and
/// [`AttributeMap::get`] or `map["key"]` read it back. Entries iterate in the
/// order their key was first written.
///
/// Indexing is total: a missing key reads as [`Value::Null`]. The container's
/// own methods are resolved statically, so a data key such as `"len"` never
/// hides [`AttributeMap::len`].
///
/// ```rust
/// use xmldict::{AttributeMap, Value};
///
/// let mut map = AttributeMap::new();
/// map.set("category", "books");
/// map.insert("count", Value::from("5"));
///
/// assert_eq!(map["category"].as_text(), Some("books"));
/// assert_eq!(map.get("count"), Some(&Value::from("5")));
/// assert!(map["missing"].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeMap {
    entries: IndexMap<String, Value>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Read an entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Property-style write. Returns the value previously stored under `key`.
    ///
    /// Overwriting keeps the key at its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Mapping-style write; the same store as [`AttributeMap::set`].
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.set(key, value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// The element's tag, when `tag` was selected.
    pub fn tag(&self) -> Option<&str> {
        self.get("tag").and_then(Value::as_text)
    }

    /// The element's text; `None` when absent or not selected.
    pub fn text(&self) -> Option<&str> {
        self.get("text").and_then(Value::as_text)
    }

    /// The element's tail; `None` when absent or not selected.
    pub fn tail(&self) -> Option<&str> {
        self.get("tail").and_then(Value::as_text)
    }

    /// The element's attributes, when `attrib` was selected.
    pub fn attrib(&self) -> Option<&IndexMap<String, String>> {
        self.get("attrib").and_then(Value::as_attributes)
    }

    fn drain_values(&mut self) -> Vec<Value> {
        self.entries.drain(..).map(|(_, value)| value).collect()
    }

    /// Unwrap into a plain map.
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.entries
    }

    /// Convert to a `serde_json::Value` object.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl Index<&str> for AttributeMap {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl From<IndexMap<String, Value>> for AttributeMap {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
