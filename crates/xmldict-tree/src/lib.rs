//! Element trees for XML documents, built over [`quick-xml`].
//!
//! `quick-xml` is a pull reader; this crate folds its event stream into a tree
//! of [`ParsedElement`]s using the element model most dictionary conversions
//! expect: every element carries its `tag`, its `attrib` map, the `text` that
//! appears before its first child, and the `tail` that follows its closing tag
//! up to the next sibling.
//!
//! # Example
//!
//! ```rust
//! use xmldict_tree::parse;
//!
//! let doc = parse("<data><item id=\"1\">one</item>\n</data>").unwrap();
//!
//! assert_eq!(doc.root.tag, "data");
//! assert_eq!(doc.root.text, None);
//!
//! let item = &doc.root.children[0];
//! assert_eq!(item.text.as_deref(), Some("one"));
//! assert_eq!(item.tail.as_deref(), Some("\n"));
//! assert_eq!(item.get_attribute("id"), Some("1"));
//! ```
//!
//! Namespaces are not resolved: tags and attribute names are kept exactly as
//! written, prefix included.

pub mod error;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use parser::{DEFAULT_MAX_DEPTH, ParseConfig, parse, parse_with_config};
pub use types::{ParsedDocument, ParsedElement};
