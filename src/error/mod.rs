//! Error types for parsing documents and for operating on model proxies.
//!
//! Parse failures carry line, column, and byte offset information so that a
//! rejected document can be pointed at precisely. Everything the proxy layer
//! can reject is a variant of [`Error`]; no failure is recovered silently.

use std::fmt;

use thiserror::Error as ThisError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `input`.
    ///
    /// Offsets past the end of the input are clamped to the end.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_offset(input: &str, byte_offset: usize) -> Self {
        let mut offset = byte_offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line: line as u32,
            column: column as u32,
            byte_offset: offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error type returned when XML parsing fails.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("parse error at {location}: {message}")]
pub struct ParseError {
    /// The primary error message.
    pub message: String,
    /// Where in the source the error occurred.
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// Errors raised by the model layer.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum Error {
    /// The document root has no parent to be detached from.
    #[error("cannot delete the root node of a document")]
    RootDeletion,

    /// A write went through a proxy whose element was already removed.
    #[error("<{tag}> was deleted from its document and can no longer be modified")]
    UseAfterDelete {
        /// Tag of the deleted element.
        tag: String,
    },

    /// The input could not be parsed into a document.
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] ParseError),

    /// A value was rejected by a field validator or failed a typed read.
    #[error("invalid value {value:?} for `{field}`: {reason}")]
    AttributeCoercion {
        /// Declared field (or attribute) name.
        field: String,
        /// The offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A field name was looked up that the model does not declare.
    #[error("`{model}` declares no field named `{name}`")]
    UnknownField {
        /// Name of the model type.
        model: &'static str,
        /// The name that was looked up.
        name: String,
    },

    /// An element was assigned somewhere inside its own subtree.
    #[error("<{tag}> cannot be placed inside its own subtree")]
    CyclicAssignment {
        /// Tag of the element being assigned.
        tag: String,
    },

    /// A collection index past the last member.
    #[error("index {index} is out of bounds for a collection of {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of members at the time of the call.
        len: usize,
    },

    /// A document was supplied that has no root element to bind.
    #[error("document has no root element")]
    MissingRootElement,

    /// A tag or attribute name that does not match the XML `Name` production.
    #[error("{name:?} is not a valid XML name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
}

impl Error {
    /// Returns `true` for [`Error::UseAfterDelete`].
    #[must_use]
    pub fn is_use_after_delete(&self) -> bool {
        matches!(self, Self::UseAfterDelete { .. })
    }

    /// Returns `true` for [`Error::AttributeCoercion`].
    #[must_use]
    pub fn is_coercion(&self) -> bool {
        matches!(self, Self::AttributeCoercion { .. })
    }

    /// Returns `true` for [`Error::InvalidName`].
    #[must_use]
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Self::InvalidName { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation {
            line: 10,
            column: 5,
            byte_offset: 42,
        };
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_source_location_from_offset() {
        let input = "<a>\n  <b>\n</a>";
        let loc = SourceLocation::from_offset(input, 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.byte_offset, 6);
    }

    #[test]
    fn test_source_location_from_offset_clamps() {
        let loc = SourceLocation::from_offset("<a/>", 100);
        assert_eq!(loc.byte_offset, 4);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 5);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(
            "unexpected end of input",
            SourceLocation {
                line: 1,
                column: 15,
                byte_offset: 14,
            },
        );
        assert_eq!(
            err.to_string(),
            "parse error at 1:15: unexpected end of input"
        );
    }

    #[test]
    fn test_malformed_document_wraps_parse_error() {
        let err: Error = ParseError::new("boom", SourceLocation::default()).into();
        assert!(matches!(err, Error::MalformedDocument(_)));
        assert_eq!(err.to_string(), "malformed document: parse error at 0:0: boom");
    }

    #[test]
    fn test_coercion_display() {
        let err = Error::AttributeCoercion {
            field: "foundingyear".to_string(),
            value: "soon".to_string(),
            reason: "not a year".to_string(),
        };
        assert!(err.is_coercion());
        assert_eq!(
            err.to_string(),
            "invalid value \"soon\" for `foundingyear`: not a year"
        );
    }
}
