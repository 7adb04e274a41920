//! XML serializer.
//!
//! Renders a `Document`, or any subtree of it, back to XML text. Output is
//! always UTF-8. With indentation enabled, element-only content is laid out
//! one child per line; mixed content is written verbatim so no significant
//! whitespace is invented.

use std::fmt::Write as _;

use crate::tree::{Document, NodeId, NodeKind};

/// Options controlling XML serialization output.
///
/// ```
/// use lazy_xml_model::serial::SerializeOptions;
///
/// let compact = SerializeOptions::default().indent(false).declaration(false);
/// assert!(!compact.indent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Whether to produce indented (pretty-printed) output. Defaults to `true`.
    pub indent: bool,
    /// The indentation string for one nesting level. Defaults to two spaces.
    pub indent_str: String,
    /// Whether whole-document output starts with an XML declaration.
    /// Defaults to `true`. Subtree output never carries one.
    pub declaration: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: true,
            indent_str: "  ".to_string(),
            declaration: true,
        }
    }
}

impl SerializeOptions {
    /// Enables or disables indented output.
    #[must_use]
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string used for each nesting level.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }

    /// Enables or disables the XML declaration on whole-document output.
    #[must_use]
    pub fn declaration(mut self, yes: bool) -> Self {
        self.declaration = yes;
        self
    }
}

/// Serializes a whole document with default (indented) options.
///
/// ```
/// use lazy_xml_model::tree::Document;
/// use lazy_xml_model::serial::serialize;
///
/// let doc = Document::parse_str("<company><description/></company>").unwrap();
/// assert_eq!(
///     serialize(&doc),
///     "<?xml version=\"1.0\"?>\n<company>\n  <description/>\n</company>\n"
/// );
/// ```
#[must_use]
pub fn serialize(doc: &Document) -> String {
    serialize_with_options(doc, &SerializeOptions::default())
}

/// Serializes a whole document with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document, options: &SerializeOptions) -> String {
    let mut writer = Writer::new(doc, options);

    if options.declaration {
        let version = doc.version.as_deref().unwrap_or("1.0");
        let _ = write!(writer.out, "<?xml version=\"{version}\"");
        // The output is UTF-8 whatever the input was, so only a UTF-8 label
        // may be repeated.
        if let Some(encoding) = doc.encoding.as_deref().filter(|e| {
            e.eq_ignore_ascii_case("utf-8") || e.eq_ignore_ascii_case("utf8")
        }) {
            let _ = write!(writer.out, " encoding=\"{encoding}\"");
        }
        if let Some(standalone) = doc.standalone {
            let _ = write!(
                writer.out,
                " standalone=\"{}\"",
                if standalone { "yes" } else { "no" }
            );
        }
        writer.out.push_str("?>\n");
    }

    for child in doc.children(doc.root()) {
        writer.write_node(child, 0, true);
        if !writer.out.ends_with('\n') {
            writer.out.push('\n');
        }
    }

    writer.out
}

/// Serializes the subtree rooted at `id`, without a declaration or a
/// trailing newline. The subtree is laid out as if it were a document root,
/// independent of where it sits in the tree.
///
/// ```
/// use lazy_xml_model::tree::Document;
/// use lazy_xml_model::serial::{serialize_node, SerializeOptions};
///
/// let doc = Document::parse_str(r#"<company><description type="about"/></company>"#).unwrap();
/// let root = doc.root_element().unwrap();
/// let desc = doc.first_child_element(root, "description").unwrap();
/// assert_eq!(
///     serialize_node(&doc, desc, &SerializeOptions::default()),
///     r#"<description type="about"/>"#
/// );
/// ```
#[must_use]
pub fn serialize_node(doc: &Document, id: NodeId, options: &SerializeOptions) -> String {
    let mut writer = Writer::new(doc, options);
    if matches!(doc.node(id).kind, NodeKind::Document) {
        for child in doc.children(id) {
            writer.write_node(child, 0, true);
        }
    } else {
        writer.write_node(id, 0, true);
    }
    while writer.out.ends_with('\n') {
        writer.out.pop();
    }
    writer.out
}

struct Writer<'a> {
    doc: &'a Document,
    options: &'a SerializeOptions,
    out: String,
}

impl<'a> Writer<'a> {
    fn new(doc: &'a Document, options: &'a SerializeOptions) -> Self {
        Self {
            doc,
            options,
            out: String::new(),
        }
    }

    /// Writes one node. `own_line` is set when the parent's content is
    /// element-only, so the node gets its own indented line.
    fn write_node(&mut self, id: NodeId, depth: usize, own_line: bool) {
        let pretty = self.options.indent && own_line;
        match &self.doc.node(id).kind {
            NodeKind::Element { name, attributes } => {
                self.pad(pretty, depth);
                self.out.push('<');
                self.out.push_str(name);
                for attr in attributes {
                    self.out.push(' ');
                    self.out.push_str(&attr.name);
                    self.out.push_str("=\"");
                    write_escaped_attr(&mut self.out, &attr.value);
                    self.out.push('"');
                }

                if self.doc.first_child(id).is_none() {
                    self.out.push_str("/>");
                } else {
                    self.out.push('>');
                    let element_only = self.options.indent && is_element_only(self.doc, id);
                    if element_only {
                        self.out.push('\n');
                    }
                    for child in self.doc.children(id) {
                        if element_only && is_blank_text(self.doc, child) {
                            continue;
                        }
                        self.write_node(child, depth + 1, element_only);
                    }
                    self.pad(element_only, depth);
                    self.out.push_str("</");
                    self.out.push_str(name);
                    self.out.push('>');
                }
                self.end_line(pretty);
            }
            NodeKind::Text { content } => write_escaped_text(&mut self.out, content),
            NodeKind::CData { content } => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(content);
                self.out.push_str("]]>");
            }
            NodeKind::Comment { content } => {
                self.pad(pretty, depth);
                self.out.push_str("<!--");
                self.out.push_str(content);
                self.out.push_str("-->");
                self.end_line(pretty);
            }
            NodeKind::ProcessingInstruction { target, data } => {
                self.pad(pretty, depth);
                self.out.push_str("<?");
                self.out.push_str(target);
                if let Some(d) = data {
                    self.out.push(' ');
                    self.out.push_str(d);
                }
                self.out.push_str("?>");
                self.end_line(pretty);
            }
            NodeKind::Document => {}
        }
    }

    fn pad(&mut self, pretty: bool, depth: usize) {
        if pretty {
            for _ in 0..depth {
                self.out.push_str(&self.options.indent_str);
            }
        }
    }

    fn end_line(&mut self, pretty: bool) {
        if pretty {
            self.out.push('\n');
        }
    }
}

/// Returns `true` if the element has element children and no text other
/// than whitespace, meaning it is safe to re-indent.
fn is_element_only(doc: &Document, id: NodeId) -> bool {
    let mut has_element_child = false;
    for child in doc.children(id) {
        match &doc.node(child).kind {
            NodeKind::Element { .. } => has_element_child = true,
            NodeKind::Text { content } if !content.trim().is_empty() => return false,
            NodeKind::CData { .. } => return false,
            _ => {}
        }
    }
    has_element_child
}

fn is_blank_text(doc: &Document, id: NodeId) -> bool {
    matches!(&doc.node(id).kind, NodeKind::Text { content } if content.trim().is_empty())
}

fn write_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '\t' | '\n' => out.push(ch),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "&#x{:X};", c as u32);
            }
            _ => out.push(ch),
        }
    }
}

fn write_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "&#x{:X};", c as u32);
            }
            _ => out.push(ch),
        }
    }
}
