//! Options controlling how elements become dictionaries.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A scalar field of an element that can be copied into its dictionary.
///
/// Variants are ordered the way fields are written into each map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// The attribute set, stored under `attrib`.
    Attrib,
    /// The element name, stored under `tag`.
    Tag,
    /// Content before the first child, stored under `text`.
    Text,
    /// Content after the end tag, stored under `tail`.
    Tail,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Attrib, Field::Tag, Field::Text, Field::Tail];

    /// The dictionary key this field is stored under.
    pub fn key(self) -> &'static str {
        match self {
            Field::Attrib => "attrib",
            Field::Tag => "tag",
            Field::Text => "text",
            Field::Tail => "tail",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        match token.trim() {
            "attrib" | "attributes" => Ok(Field::Attrib),
            "tag" => Ok(Field::Tag),
            "text" => Ok(Field::Text),
            "tail" => Ok(Field::Tail),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

/// The set of fields copied onto every dictionary.
///
/// Deserializes from a single token or a list of tokens; the token `all`
/// selects every field.
///
/// ```rust
/// use xmldict::{Field, FieldSet};
///
/// let fields = FieldSet::from_tokens(["tag", "text"]).unwrap();
/// assert!(fields.contains(Field::Tag));
/// assert!(!fields.contains(Field::Tail));
/// assert_eq!(FieldSet::from_tokens(["all"]).unwrap(), FieldSet::all());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "FieldTokens")]
pub struct FieldSet(u8);

impl FieldSet {
    pub const fn empty() -> Self {
        FieldSet(0)
    }

    pub const fn all() -> Self {
        FieldSet(0b1111)
    }

    pub fn only(field: Field) -> Self {
        FieldSet(field.bit())
    }

    #[must_use]
    pub fn with(self, field: Field) -> Self {
        FieldSet(self.0 | field.bit())
    }

    #[must_use]
    pub fn without(self, field: Field) -> Self {
        FieldSet(self.0 & !field.bit())
    }

    pub fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected fields in write order.
    pub fn iter(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    /// Build a set from field tokens (`tag`, `attrib`, `text`, `tail`, `all`).
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = FieldSet::empty();
        for token in tokens {
            let token = token.as_ref();
            if token.trim() == "all" {
                set = FieldSet::all();
            } else {
                set = set.with(token.parse()?);
            }
        }
        Ok(set)
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        FieldSet::all()
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        iter.into_iter().fold(FieldSet::empty(), FieldSet::with)
    }
}

impl FromStr for FieldSet {
    type Err = Error;

    /// Comma-separated tokens, e.g. `"tag,text"`.
    fn from_str(s: &str) -> Result<Self> {
        FieldSet::from_tokens(s.split(',').filter(|t| !t.trim().is_empty()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldTokens {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<FieldTokens> for FieldSet {
    type Error = Error;

    fn try_from(tokens: FieldTokens) -> Result<Self> {
        match tokens {
            FieldTokens::One(token) => FieldSet::from_tokens([token]),
            FieldTokens::Many(tokens) => FieldSet::from_tokens(tokens),
        }
    }
}

/// What happens when a child's tag is already a key of its parent's map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Pair the existing entry with the newcomer: `[existing, new]`.
    ///
    /// An existing group is paired too, so three siblings `A`, `B`, `C`
    /// produce `[[A, B], C]`. This is the historical behavior.
    #[default]
    Nest,

    /// Append to an existing group, so `A`, `B`, `C` produce `[A, B, C]`.
    Flatten,
}

/// Options for building a dictionary.
///
/// ```rust
/// use xmldict::{CollisionPolicy, DictOptions, Field, FieldSet};
///
/// let options = DictOptions::default()
///     .with_fields(FieldSet::only(Field::Tag))
///     .with_collision(CollisionPolicy::Flatten);
/// assert!(!options.normalize_text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictOptions {
    /// Fields copied onto every map. Defaults to all four.
    pub contains: FieldSet,

    /// Remove tab and newline characters from `text` before storing it.
    pub normalize_text: bool,

    /// How same-tagged siblings are combined.
    pub collision: CollisionPolicy,
}

impl DictOptions {
    #[must_use]
    pub fn with_fields(mut self, contains: FieldSet) -> Self {
        self.contains = contains;
        self
    }

    #[must_use]
    pub fn with_normalized_text(mut self, normalize_text: bool) -> Self {
        self.normalize_text = normalize_text;
        self
    }

    #[must_use]
    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tokens() {
        assert_eq!("tag".parse::<Field>().unwrap(), Field::Tag);
        assert_eq!("attributes".parse::<Field>().unwrap(), Field::Attrib);
        assert_eq!(" tail ".parse::<Field>().unwrap(), Field::Tail);
        assert!(matches!(
            "children".parse::<Field>(),
            Err(Error::UnknownField(token)) if token == "children"
        ));
    }

    #[test]
    fn test_field_set_iterates_in_write_order() {
        let set: FieldSet = [Field::Tail, Field::Tag, Field::Attrib].into_iter().collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Field::Attrib, Field::Tag, Field::Tail]
        );
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Field::Text));
    }

    #[test]
    fn test_field_set_from_str() {
        let set: FieldSet = "tag,text".parse().unwrap();
        assert_eq!(set, FieldSet::only(Field::Tag).with(Field::Text));
        assert_eq!("all".parse::<FieldSet>().unwrap(), FieldSet::all());
        assert_eq!("".parse::<FieldSet>().unwrap(), FieldSet::empty());
        assert!("tag,bogus".parse::<FieldSet>().is_err());
    }

    #[test]
    fn test_field_set_without() {
        let set = FieldSet::all().without(Field::Tail);
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Field::Tail));
        assert_eq!(format!("{:?}", set), "{Attrib, Tag, Text}");
    }

    #[test]
    fn test_default_options() {
        let options = DictOptions::default();
        assert_eq!(options.contains, FieldSet::all());
        assert!(!options.normalize_text);
        assert_eq!(options.collision, CollisionPolicy::Nest);
    }

    #[test]
    fn test_options_from_json() {
        let options: DictOptions =
            serde_json::from_str(r#"{"contains": ["tag", "attrib"], "collision": "flatten"}"#)
                .unwrap();
        assert_eq!(
            options.contains,
            FieldSet::only(Field::Tag).with(Field::Attrib)
        );
        assert_eq!(options.collision, CollisionPolicy::Flatten);

        let options: DictOptions = serde_json::from_str(r#"{"contains": "text"}"#).unwrap();
        assert_eq!(options.contains, FieldSet::only(Field::Text));
    }

    #[test]
    fn test_options_reject_unknown_keys_and_tokens() {
        assert!(serde_json::from_str::<DictOptions>(r#"{"contain": ["tag"]}"#).is_err());
        assert!(serde_json::from_str::<DictOptions>(r#"{"contains": ["nope"]}"#).is_err());
    }
}
