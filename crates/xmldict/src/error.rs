//! Error types for dictionary conversion.

use std::convert::Infallible;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for xmldict operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning XML into a dictionary.
#[derive(Debug, Error)]
pub enum Error {
    /// A source kind token other than `string` or `file`.
    #[error("Invalid source kind '{0}': expected 'string' or 'file'")]
    InvalidSourceKind(String),

    /// The XML could not be parsed into a tree.
    #[error("Malformed XML document: {0}")]
    MalformedDocument(xmldict_tree::Error),

    /// Elements nested deeper than the configured limit.
    #[error("XML structure too deep: nesting exceeds {max_depth} levels (at byte {position})")]
    StructureTooDeep { max_depth: usize, position: usize },

    /// The value to convert is not a single root element or a document.
    #[error("Cannot build a dictionary from {roots} root elements: expected exactly one")]
    InvalidTreeHandle { roots: usize },

    /// A field token outside `tag`, `attrib`, `text`, `tail` and `all`.
    #[error("Unknown field '{0}': expected tag, attrib, text, tail or all")]
    UnknownField(String),

    /// Reading a file source failed.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Render this error against the XML source it came from.
    ///
    /// Tree errors get an annotated source snippet; everything else renders
    /// as its message.
    pub fn render(&self, source_name: &str, source: &str) -> String {
        match self {
            Error::MalformedDocument(err) => err.render(source_name, source),
            Error::StructureTooDeep {
                max_depth,
                position,
            } => xmldict_tree::Error::StructureTooDeep {
                max_depth: *max_depth,
                position: *position,
            }
            .render(source_name, source),
            other => format!("Error: {}\n", other),
        }
    }
}

impl From<xmldict_tree::Error> for Error {
    fn from(err: xmldict_tree::Error) -> Self {
        match err {
            xmldict_tree::Error::StructureTooDeep {
                max_depth,
                position,
            } => Error::StructureTooDeep {
                max_depth,
                position,
            },
            other => Error::MalformedDocument(other),
        }
    }
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
