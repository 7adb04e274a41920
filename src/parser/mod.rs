//! XML parser.
//!
//! Builds a [`Document`] arena from `quick-xml` events. Well-formedness is
//! checked by the event reader (matching end tags, unique attributes,
//! predefined entities); this layer adds the document-level rules (exactly one
//! root element, no text outside it) and the nesting limit.

mod xml;

use crate::encoding::decode_to_utf8;
use crate::error::{ParseError, SourceLocation};
use crate::tree::Document;

/// Default maximum element nesting depth.
pub const DEFAULT_MAX_DEPTH: u32 = 256;

/// Parse options, configured with the builder pattern.
///
/// ```
/// use lazy_xml_model::parser::ParseOptions;
///
/// let opts = ParseOptions::default().no_blanks(true).max_depth(64);
/// assert!(opts.no_blanks);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// If true, whitespace-only text nodes are dropped.
    pub no_blanks: bool,
    /// Maximum element nesting depth (default: 256).
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            no_blanks: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Enables or disables stripping of blank text nodes.
    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }
}

/// Parses an XML string with default options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed XML.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed XML or exceeds the
/// configured nesting depth.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let doc = xml::TreeBuilder::new(input, options).build()?;
    tracing::trace!(nodes = doc.node_count(), "parsed document");
    Ok(doc)
}

/// Parses XML bytes with the given options, decoding them to UTF-8 first.
///
/// # Errors
///
/// Returns `ParseError` if decoding fails or the text is not well-formed.
pub fn parse_bytes_with_options(input: &[u8], options: &ParseOptions) -> Result<Document, ParseError> {
    let text = decode_to_utf8(input)
        .map_err(|e| ParseError::new(e.to_string(), SourceLocation::default()))?;
    parse_str_with_options(&text, options)
}
