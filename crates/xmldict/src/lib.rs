//! XML documents as nested dictionaries.
//!
//! Every element becomes an [`AttributeMap`] holding a selection of its scalar
//! fields (`attrib`, `tag`, `text`, `tail`) plus one entry per child tag.
//! Entries are [`Value`]s, so consumers match on a closed set of shapes
//! instead of probing types at runtime.
//!
//! # Example
//!
//! ```rust
//! use xmldict::{DictOptions, SourceKind, to_dictionary};
//!
//! let xml = "<data>\n\t<category attribute=\"5\">\n\t\ttest_text\n\t</category>\n</data>";
//! let data = to_dictionary(xml, SourceKind::String, &DictOptions::default()).unwrap();
//!
//! assert_eq!(data.tag(), Some("data"));
//! assert_eq!(data["category"]["tail"].as_text(), Some("\n"));
//! assert_eq!(data["category"]["text"].as_text(), Some("\n\t\ttest_text\n\t"));
//!
//! let normalized = DictOptions::default().with_normalized_text(true);
//! let data = to_dictionary(xml, SourceKind::String, &normalized).unwrap();
//! assert_eq!(data["category"]["text"].as_text(), Some("test_text"));
//! ```
//!
//! # Repeated siblings
//!
//! When a child's tag is already present, the entry becomes a
//! [`Value::Group`]. Under the default [`CollisionPolicy::Nest`] every
//! further sibling pairs with the existing entry, so three `<x/>` siblings
//! give `[[x1, x2], x3]`; [`CollisionPolicy::Flatten`] gives `[x1, x2, x3]`.

pub mod builder;
pub mod document;
pub mod error;
pub mod options;
pub mod value;

pub use builder::{DictBuilder, TreeHandle, build};
pub use document::{
    ParseOptions, SourceKind, XmlDocument, parse, strip_indentation, to_dictionary,
};
pub use error::{Error, Result};
pub use options::{CollisionPolicy, DictOptions, Field, FieldSet};
pub use value::{AttributeMap, Value};
pub use xmldict_tree::{DEFAULT_MAX_DEPTH, ParsedDocument, ParsedElement};
