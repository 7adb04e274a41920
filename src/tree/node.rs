//! Node type definitions.
//!
//! `NodeKind` carries the payload of each node. Navigation links (parent,
//! children, siblings) live in `NodeData`.

use super::Attribute;

/// The kind of an XML node and its associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node, exactly one per `Document`.
    Document,

    /// An element node, e.g., `<description type="about">`.
    Element {
        /// The element's tag name.
        name: String,
        /// Attributes in document order.
        attributes: Vec<Attribute>,
    },

    /// Character data (entity references already resolved).
    Text {
        /// The text content.
        content: String,
    },

    /// A CDATA section; serialized without escaping.
    CData {
        /// The section content.
        content: String,
    },

    /// A comment, without the `<!--` and `-->` delimiters.
    Comment {
        /// The comment text.
        content: String,
    },

    /// A processing instruction, e.g., `<?xml-stylesheet href="a.xsl"?>`.
    ProcessingInstruction {
        /// The PI target.
        target: String,
        /// The PI data, if any.
        data: Option<String>,
    },
}

impl NodeKind {
    /// Builds an element payload with no attributes.
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builds a text payload.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Returns `true` for element nodes.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}
