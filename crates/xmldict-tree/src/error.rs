//! Error types for building element trees.

use thiserror::Error;

/// Result type alias for xmldict-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building an element tree.
///
/// Positions are byte offsets into the parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}{}", at_byte(.position))]
    XmlSyntax {
        message: String,
        position: Option<usize>,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, position: usize },

    /// End tag that does not close the innermost open element.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        position: usize,
    },

    /// Invalid XML structure.
    #[error("Invalid XML structure: {message}")]
    InvalidStructure {
        message: String,
        position: Option<usize>,
    },

    /// Empty document (no root element).
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// Multiple root elements.
    #[error("Invalid XML: multiple root elements")]
    MultipleRoots { position: usize },

    /// Elements nested deeper than the configured limit.
    #[error("XML structure too deep: nesting exceeds {max_depth} levels")]
    StructureTooDeep { max_depth: usize, position: usize },
}

fn at_byte(position: &Option<usize>) -> String {
    position.map(|p| format!(" at byte {}", p)).unwrap_or_default()
}

impl Error {
    /// Byte offset the error points at, if known.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::XmlSyntax { position, .. } | Error::InvalidStructure { position, .. } => {
                *position
            }
            Error::UnexpectedEof { position, .. }
            | Error::MismatchedEndTag { position, .. }
            | Error::MultipleRoots { position }
            | Error::StructureTooDeep { position, .. } => Some(*position),
            Error::EmptyDocument => None,
        }
    }

    /// Short label describing what is wrong at [`Error::position`].
    fn label(&self) -> String {
        match self {
            Error::XmlSyntax { message, .. } => message.clone(),
            Error::UnexpectedEof { expected, .. } => format!("never closed, expected {}", expected),
            Error::MismatchedEndTag { found, .. } => format!("closed by </{}>", found),
            Error::InvalidStructure { message, .. } => message.clone(),
            Error::EmptyDocument => "no root element".to_string(),
            Error::MultipleRoots { .. } => "second root element".to_string(),
            Error::StructureTooDeep { max_depth, .. } => {
                format!("element opened below depth {}", max_depth)
            }
        }
    }

    /// Render this error against the source it came from.
    ///
    /// Errors with a position get an annotated source snippet; the rest fall
    /// back to the plain message. Output is uncolored.
    pub fn render(&self, source_name: &str, source: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        let Some(position) = self.position() else {
            return format!("Error: {}\n", self);
        };

        // ariadne spans count chars, positions count bytes
        let start = char_index(source, position);
        let end = (start + 1).min(source.chars().count()).max(start);
        let name = source_name.to_string();

        let report = Report::build(ReportKind::Error, name.clone(), start)
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(Label::new((name.clone(), start..end)).with_message(self.label()))
            .finish();

        let mut output = Vec::new();
        if report
            .write((name, Source::from(source)), &mut output)
            .is_err()
        {
            return format!("Error: {}\n", self);
        }
        String::from_utf8(output).unwrap_or_else(|_| format!("Error: {}\n", self))
    }
}

fn char_index(source: &str, byte_offset: usize) -> usize {
    source
        .char_indices()
        .take_while(|(i, _)| *i < byte_offset)
        .count()
}
