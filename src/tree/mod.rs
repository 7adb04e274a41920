//! Arena-based XML document tree.
//!
//! All nodes live in a `Vec<NodeData>` owned by the `Document` and are
//! referenced by `NodeId`, a newtype over `NonZeroU32`. Navigation links
//! (parent, first/last child, siblings) are arena indices too, so a node
//! handle is a plain `Copy` value that never owns anything. The proxy layer
//! relies on this: a `NodeId` is the identity of an element for as long as
//! the document exists, including after the node has been detached.
//!
//! Detached nodes stay allocated until the document is dropped.

mod name;
mod node;

pub use name::{is_name_char, is_name_start_char, is_valid_name};
pub use node::NodeKind;

use std::num::NonZeroU32;

use crate::error::ParseError;
use crate::parser::{self, ParseOptions};

/// A typed index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// # Panics
    ///
    /// Panics if `index` is 0.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32).expect("NodeId index must be non-zero"))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }

    /// Returns the raw, always non-zero, arena index.
    #[must_use]
    pub fn into_raw(self) -> u32 {
        self.0.get()
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is and its payload.
    pub kind: NodeKind,
    /// Parent node, if any.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An XML attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value (entity references resolved).
    pub value: String,
}

impl Attribute {
    /// Creates an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An XML document.
///
/// Navigation goes through `&Document`, mutation through `&mut Document`.
///
/// ```
/// use lazy_xml_model::tree::Document;
///
/// let doc = Document::parse_str("<company><description/></company>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.node_name(root), Some("company"));
/// assert!(doc.first_child_element(root, "description").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The document node id (not the root element).
    root: NodeId,
    /// XML version from the XML declaration.
    pub version: Option<String>,
    /// Encoding from the XML declaration.
    pub encoding: Option<String>,
    /// Standalone flag from the XML declaration.
    pub standalone: Option<bool>,
}

impl Document {
    /// Creates a document containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(16);
        nodes.push(NodeData::new(NodeKind::Document));
        nodes.push(NodeData::new(NodeKind::Document));
        Self {
            nodes,
            root: NodeId::from_index(1),
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// Creates a document whose root element is an empty `<tag/>`.
    ///
    /// Returns the document and the id of the root element.
    #[must_use]
    pub fn with_root_element(tag: &str) -> (Self, NodeId) {
        let mut doc = Self::new();
        let element = doc.create_element(tag);
        let root = doc.root();
        doc.append_child(root, element);
        (doc, element)
    }

    /// Parses an XML string with default options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed XML.
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        parser::parse_str(input)
    }

    /// Parses XML bytes, detecting the encoding from the BOM or declaration.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes cannot be decoded or the decoded
    /// text is not well-formed XML.
    pub fn parse_bytes(input: &[u8]) -> Result<Self, ParseError> {
        parser::parse_bytes_with_options(input, &ParseOptions::default())
    }

    /// Returns the document node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the single top-level element, if there is one.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| self.node(id).kind.is_element())
    }

    /// Returns the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns `true` if `id` is an element node.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).kind.is_element()
    }

    /// Returns the tag name of an element or the target of a PI.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. }
            | NodeKind::ProcessingInstruction { target: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Renames an element. Other node kinds are left untouched.
    pub fn rename_element(&mut self, id: NodeId, new_name: &str) {
        if let NodeKind::Element { name, .. } = &mut self.node_mut(id).kind {
            if name != new_name {
                *name = new_name.to_string();
            }
        }
    }

    /// Returns the concatenated text of a node and all its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text { content } | NodeKind::CData { content } => buf.push_str(content),
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, buf);
                }
            }
        }
    }

    /// Replaces every child of `id` with a single text node.
    ///
    /// An empty `text` leaves the element without children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        while let Some(child) = self.first_child(id) {
            self.detach(child);
        }
        if !text.is_empty() {
            let node = self.create_node(NodeKind::text(text));
            self.append_child(id, node);
        }
    }

    // --- Attributes ---

    /// Returns the attributes of an element node, or an empty slice.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns the value of an attribute by name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Returns the attribute names of an element in document order.
    #[must_use]
    pub fn attribute_names(&self, id: NodeId) -> Vec<&str> {
        self.attributes(id).iter().map(|a| a.name.as_str()).collect()
    }

    /// Sets an attribute, overwriting an existing value in place or
    /// appending a new attribute. Non-element nodes are ignored.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let NodeKind::Element { attributes, .. } = &mut self.node_mut(id).kind else {
            return;
        };
        match attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => value.clone_into(&mut attr.value),
            None => attributes.push(Attribute::new(name, value)),
        }
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let NodeKind::Element { attributes, .. } = &mut self.node_mut(id).kind else {
            return None;
        };
        let pos = attributes.iter().position(|a| a.name == name)?;
        Some(attributes.remove(pos).value)
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the parent of a node if that parent is an element.
    ///
    /// The root element's parent is the document node, so this is `None`
    /// for the root element and for detached nodes.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns the child elements of `id` named `name`, in document order.
    pub fn child_elements<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .filter(move |&child| matches!(&self.node(child).kind, NodeKind::Element { name: n, .. } if n == name))
    }

    /// Returns the first child element of `id` named `name`.
    #[must_use]
    pub fn first_child_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id, name).next()
    }

    /// Returns an iterator over a node and its ancestors (walking up to root).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Returns `true` if `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    // --- Mutation ---

    /// Allocates a new, unattached node and returns its `NodeId`.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    /// Allocates a new, unattached, empty element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_node(NodeKind::element(name))
    }

    /// Appends a child node to the end of a parent's child list.
    ///
    /// A child that is still attached elsewhere is detached first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    /// Inserts `new_child` before `reference` in the reference's parent.
    ///
    /// Does nothing if `reference` is unattached. A `new_child` that is
    /// still attached elsewhere is detached first.
    pub fn insert_before(&mut self, reference: NodeId, new_child: NodeId) {
        if reference == new_child {
            return;
        }
        let Some(parent) = self.node(reference).parent else {
            return;
        };
        self.detach(new_child);
        self.node_mut(new_child).parent = Some(parent);

        if let Some(prev) = self.node(reference).prev_sibling {
            self.node_mut(prev).next_sibling = Some(new_child);
            self.node_mut(new_child).prev_sibling = Some(prev);
        } else {
            self.node_mut(parent).first_child = Some(new_child);
        }

        self.node_mut(new_child).next_sibling = Some(reference);
        self.node_mut(reference).prev_sibling = Some(new_child);
    }

    /// Detaches a node from its parent.
    ///
    /// The node and its subtree stay allocated in the arena but are no
    /// longer reachable from the document node. Unattached nodes are a no-op.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };

        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }

        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let data = self.node_mut(id);
        data.parent = None;
        data.prev_sibling = None;
        data.next_sibling = None;
    }

    /// Deep-copies the subtree rooted at `node` of `source` into this arena.
    ///
    /// The copy is unattached. Returns the id of the copied root together
    /// with the `(source id, copy id)` pair of every copied node.
    pub fn import_subtree(
        &mut self,
        source: &Document,
        node: NodeId,
    ) -> (NodeId, Vec<(NodeId, NodeId)>) {
        let mut mapping = Vec::new();
        let copy = self.import_node(source, node, &mut mapping);
        (copy, mapping)
    }

    fn import_node(
        &mut self,
        source: &Document,
        node: NodeId,
        mapping: &mut Vec<(NodeId, NodeId)>,
    ) -> NodeId {
        let copy = self.create_node(source.node(node).kind.clone());
        mapping.push((node, copy));
        for child in source.children(node) {
            let child_copy = self.import_node(source, child, mapping);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Returns the number of allocated nodes, detached ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn company() -> (Document, NodeId) {
        Document::with_root_element("company")
    }

    #[test]
    fn test_with_root_element() {
        let (doc, root) = company();
        assert_eq!(doc.root_element(), Some(root));
        assert_eq!(doc.node_name(root), Some("company"));
        assert_eq!(doc.parent(root), Some(doc.root()));
        assert_eq!(doc.parent_element(root), None);
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn test_append_keeps_order() {
        let (mut doc, root) = company();
        let a = doc.create_element("location");
        let b = doc.create_element("description");
        let c = doc.create_element("location");
        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, c);

        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(doc.child_elements(root, "location").collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(doc.first_child_element(root, "description"), Some(b));
        assert_eq!(doc.first_child_element(root, "missing"), None);
        assert_eq!(doc.parent_element(b), Some(root));
    }

    #[test]
    fn test_child_elements_only_direct_children() {
        let doc = Document::parse_str(
            "<company><office><location/></office><location id=\"1\"/></company>",
        )
        .unwrap();
        let root = doc.root_element().unwrap();
        let found: Vec<_> = doc.child_elements(root, "location").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(doc.attribute(found[0], "id"), Some("1"));
    }

    #[test]
    fn test_insert_before_and_detach() {
        let (mut doc, root) = company();
        let a = doc.create_element("a");
        let c = doc.create_element("c");
        doc.append_child(root, a);
        doc.append_child(root, c);
        let b = doc.create_element("b");
        doc.insert_before(c, b);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c]);

        doc.detach(b);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.next_sibling(a), Some(c));
        assert_eq!(doc.prev_sibling(c), Some(a));
    }

    #[test]
    fn test_insert_before_first_child() {
        let (mut doc, root) = company();
        let b = doc.create_element("b");
        doc.append_child(root, b);
        let a = doc.create_element("a");
        doc.insert_before(b, a);
        assert_eq!(doc.first_child(root), Some(a));
        assert_eq!(doc.last_child(root), Some(b));
    }

    #[test]
    fn test_append_moves_attached_child() {
        let (mut doc, root) = company();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, a);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn test_detach_only_child_and_unattached() {
        let (mut doc, root) = company();
        let a = doc.create_element("a");
        doc.append_child(root, a);
        doc.detach(a);
        assert_eq!(doc.first_child(root), None);
        assert_eq!(doc.last_child(root), None);
        // detaching twice is harmless
        doc.detach(a);
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn test_attributes_last_write_wins_in_place() {
        let (mut doc, root) = company();
        doc.set_attribute(root, "type", "about");
        doc.set_attribute(root, "foundingyear", "2017");
        doc.set_attribute(root, "type", "history");
        assert_eq!(doc.attribute_names(root), vec!["type", "foundingyear"]);
        assert_eq!(doc.attribute(root, "type"), Some("history"));
        assert_eq!(doc.remove_attribute(root, "type"), Some("history".to_string()));
        assert_eq!(doc.remove_attribute(root, "type"), None);
        assert_eq!(doc.attribute_names(root), vec!["foundingyear"]);
    }

    #[test]
    fn test_set_attribute_on_text_is_ignored() {
        let mut doc = Document::new();
        let text = doc.create_node(NodeKind::text("hi"));
        doc.set_attribute(text, "a", "b");
        assert!(doc.attributes(text).is_empty());
    }

    #[test]
    fn test_text_content_round_trip() {
        let (mut doc, root) = company();
        let name = doc.create_element("name");
        doc.append_child(root, name);
        doc.set_text_content(name, "SUSE");
        assert_eq!(doc.text_content(root), "SUSE");
        doc.set_text_content(name, "openSUSE");
        assert_eq!(doc.text_content(name), "openSUSE");
        assert_eq!(doc.children(name).count(), 1);
        doc.set_text_content(name, "");
        assert_eq!(doc.first_child(name), None);
    }

    #[test]
    fn test_rename_element() {
        let (mut doc, root) = company();
        doc.rename_element(root, "firm");
        assert_eq!(doc.node_name(root), Some("firm"));
    }

    #[test]
    fn test_ancestors() {
        let (mut doc, root) = company();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a);
        doc.append_child(a, b);
        assert_eq!(doc.ancestors(b).collect::<Vec<_>>(), vec![b, a, root, doc.root()]);
        assert!(doc.is_ancestor_or_self(root, b));
        assert!(doc.is_ancestor_or_self(b, b));
        assert!(!doc.is_ancestor_or_self(b, a));
    }

    #[test]
    fn test_import_subtree() {
        let source = Document::parse_str(
            "<description type=\"about\"><line>one</line><line>two</line></description>",
        )
        .unwrap();
        let src_root = source.root_element().unwrap();

        let (mut doc, root) = company();
        let (copy, mapping) = doc.import_subtree(&source, src_root);
        assert_eq!(doc.parent(copy), None);
        doc.append_child(root, copy);

        assert_eq!(doc.attribute(copy, "type"), Some("about"));
        assert_eq!(doc.text_content(copy), "onetwo");
        // description, two lines, two text nodes
        assert_eq!(mapping.len(), 5);
        assert_eq!(mapping[0], (src_root, copy));
    }
}
