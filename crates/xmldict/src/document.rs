//! Entry points: parse XML text or files and hand out dictionaries.

use crate::{AttributeMap, DictBuilder, DictOptions, Error, Result};
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use xmldict_tree::{DEFAULT_MAX_DEPTH, ParseConfig, ParsedDocument, ParsedElement};

/// Whitespace between a closing `>` and the next `<`.
static INDENTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">\s+<").expect("indentation pattern is valid"));

/// How the `data` argument of [`parse`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `data` is XML text.
    String,
    /// `data` is a path to an XML file.
    File,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::String => f.write_str("string"),
            SourceKind::File => f.write_str("file"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        if token.eq_ignore_ascii_case("string") {
            Ok(SourceKind::String)
        } else if token.eq_ignore_ascii_case("file") {
            Ok(SourceKind::File)
        } else {
            Err(Error::InvalidSourceKind(token.to_string()))
        }
    }
}

impl TryFrom<&str> for SourceKind {
    type Error = Error;

    fn try_from(token: &str) -> Result<Self> {
        token.parse()
    }
}

/// Settings applied before and while the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Collapse whitespace between adjacent tags before parsing, so that
    /// indentation does not show up as text and tails.
    pub strip_indentation: bool,

    /// Deepest element nesting accepted; the root is at depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_indentation: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Remove whitespace between adjacent tags (`>  <` becomes `><`).
pub fn strip_indentation(xml: &str) -> Cow<'_, str> {
    INDENTATION.replace_all(xml, "><")
}

/// A parsed document that converts to a dictionary on demand.
///
/// The dictionary is built on first access and cached for the lifetime of the
/// document; later calls return the same map.
///
/// ```rust
/// use xmldict::{SourceKind, XmlDocument};
///
/// let doc = XmlDocument::parse("<data><x/><x/></data>", SourceKind::String).unwrap();
/// let first = doc.dictionary();
/// assert!(std::ptr::eq(first, doc.dictionary()));
/// assert_eq!(first["x"].as_group().map(|g| g.len()), Some(2));
/// ```
pub struct XmlDocument {
    tree: ParsedDocument,
    dictionary: OnceCell<Cached>,
}

struct Cached {
    options: DictOptions,
    map: AttributeMap,
}

impl XmlDocument {
    /// Parse `data` as XML text or as a path, depending on `kind`.
    pub fn parse(data: &str, kind: SourceKind) -> Result<Self> {
        Self::parse_with_options(data, kind, &ParseOptions::default())
    }

    pub fn parse_with_options(data: &str, kind: SourceKind, options: &ParseOptions) -> Result<Self> {
        match kind {
            SourceKind::String => Self::from_xml(data, options),
            SourceKind::File => Self::open_with_options(data, options),
        }
    }

    /// Parse XML text.
    pub fn from_xml(xml: &str, options: &ParseOptions) -> Result<Self> {
        let xml = if options.strip_indentation {
            strip_indentation(xml)
        } else {
            Cow::Borrowed(xml)
        };
        let config = ParseConfig {
            max_depth: options.max_depth,
        };
        let tree = xmldict_tree::parse_with_config(&xml, &config)?;
        Ok(Self::from_tree(tree))
    }

    /// Read and parse an XML file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &ParseOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = xml.len(), "Read XML file");
        Self::from_xml(&xml, options)
    }

    /// Wrap an already parsed tree.
    pub fn from_tree(tree: ParsedDocument) -> Self {
        Self {
            tree,
            dictionary: OnceCell::new(),
        }
    }

    pub fn tree(&self) -> &ParsedDocument {
        &self.tree
    }

    pub fn root(&self) -> &ParsedElement {
        &self.tree.root
    }

    /// The dictionary built with default options.
    pub fn dictionary(&self) -> &AttributeMap {
        self.dictionary_with(&DictOptions::default())
    }

    /// The dictionary, built with `options` on first access.
    ///
    /// Once built, the cached map is returned as is; options passed to later
    /// calls have no effect.
    pub fn dictionary_with(&self, options: &DictOptions) -> &AttributeMap {
        let cached = self.dictionary.get_or_init(|| Cached {
            options: options.clone(),
            map: DictBuilder::new(options.clone()).build(&self.tree.root),
        });
        if cached.options != *options {
            tracing::debug!(
                cached = ?cached.options,
                requested = ?options,
                "Returning dictionary cached under different options"
            );
        }
        &cached.map
    }

    /// Drop the tree and take the dictionary, building it if needed.
    pub fn into_dictionary(self, options: &DictOptions) -> AttributeMap {
        match self.dictionary.into_inner() {
            Some(cached) => cached.map,
            None => DictBuilder::new(options.clone()).build(&self.tree.root),
        }
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root", &self.tree.root.tag)
            .field("built", &self.dictionary.get().is_some())
            .finish()
    }
}

/// Parse `data` as XML text or a file path.
///
/// `kind` is a [`SourceKind`] or one of the tokens `"string"` and `"file"`;
/// an unknown token fails before `data` is looked at.
///
/// ```rust
/// use xmldict::{Error, parse};
///
/// let doc = parse("<a/>", "string").unwrap();
/// assert_eq!(doc.root().tag, "a");
///
/// assert!(matches!(parse("<a/>", "bogus"), Err(Error::InvalidSourceKind(_))));
/// ```
pub fn parse<K>(data: &str, kind: K) -> Result<XmlDocument>
where
    K: TryInto<SourceKind>,
    Error: From<K::Error>,
{
    let kind = kind.try_into()?;
    XmlDocument::parse(data, kind)
}

/// Parse `data` and convert its root element to a dictionary.
///
/// ```rust
/// use xmldict::{DictOptions, SourceKind, to_dictionary};
///
/// let map = to_dictionary(
///     r#"<data><category attribute="5">test_text</category></data>"#,
///     SourceKind::String,
///     &DictOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(map["category"]["text"].as_text(), Some("test_text"));
/// assert!(map["tail"].is_null());
/// ```
pub fn to_dictionary<K>(data: &str, kind: K, options: &DictOptions) -> Result<AttributeMap>
where
    K: TryInto<SourceKind>,
    Error: From<K::Error>,
{
    Ok(parse(data, kind)?.into_dictionary(options))
}
