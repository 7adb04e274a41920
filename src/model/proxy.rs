//! The per-element view that every model wraps.

use std::fmt;

use tracing::debug;

use super::shared::SharedDocument;
use super::ProxyBacked;
use crate::error::{Error, Result};
use crate::serial::{self, SerializeOptions};
use crate::tree::{is_valid_name, Document, NodeId};

/// A non-owning view of one element in a [`SharedDocument`].
///
/// The proxy never caches node content: every read goes to the tree. When
/// the element is moved into another document by an assignment, the proxy
/// follows it there.
///
/// ```
/// use lazy_xml_model::model::ObjectProxy;
///
/// let company = ObjectProxy::new_root("company").unwrap();
/// company.set_attribute("name", "SUSE").unwrap();
/// assert_eq!(company.to_xml(), r#"<company name="SUSE"/>"#);
/// ```
#[derive(Clone)]
pub struct ObjectProxy {
    document: SharedDocument,
    node: NodeId,
}

impl ObjectProxy {
    /// Binds `node` of `document`.
    #[must_use]
    pub fn new(document: SharedDocument, node: NodeId) -> Self {
        Self { document, node }
    }

    /// Creates a new document whose root element is `<tag/>` and binds it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `tag` is not an XML name.
    pub fn new_root(tag: &str) -> Result<Self> {
        check_name(tag)?;
        let (doc, root) = Document::with_root_element(tag);
        Ok(Self::new(SharedDocument::new(doc), root))
    }

    /// Binds the root element of a shared document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootElement`] if the document has none.
    pub fn root_of(document: SharedDocument) -> Result<Self> {
        let root = document.read().root_element().ok_or(Error::MissingRootElement)?;
        Ok(Self::new(document, root))
    }

    /// Resolves the document and node this proxy currently refers to.
    pub(crate) fn locate(&self) -> (SharedDocument, NodeId) {
        let mut document = self.document.clone();
        let mut node = self.node;
        while let Some((next_doc, next_node)) = document.relocation(node) {
            document = next_doc;
            node = next_node;
        }
        (document, node)
    }

    /// Like [`locate`](Self::locate), rejecting deleted elements.
    pub(crate) fn writable(&self) -> Result<(SharedDocument, NodeId)> {
        let (document, node) = self.locate();
        if document.is_inert(node) {
            let tag = tag_of(&document, node);
            return Err(Error::UseAfterDelete { tag });
        }
        Ok((document, node))
    }

    /// The document the element currently lives in.
    #[must_use]
    pub fn document(&self) -> SharedDocument {
        self.locate().0
    }

    /// The id of the element within [`document`](Self::document).
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.locate().1
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        let (document, node) = self.locate();
        tag_of(&document, node)
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        let (document, node) = self.locate();
        let doc = document.read();
        doc.attribute(node, name).map(str::to_string)
    }

    /// Returns the attribute names in document order.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        let (document, node) = self.locate();
        let doc = document.read();
        doc.attribute_names(node).into_iter().map(str::to_string).collect()
    }

    /// Sets an attribute, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `name` is not an XML name and
    /// [`Error::UseAfterDelete`] if the element was deleted.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        check_name(name)?;
        let (document, node) = self.writable()?;
        document.write().set_attribute(node, name, value);
        Ok(())
    }

    /// Removes an attribute, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the element was deleted.
    pub fn remove_attribute(&self, name: &str) -> Result<Option<String>> {
        let (document, node) = self.writable()?;
        let old = document.write().remove_attribute(node, name);
        Ok(old)
    }

    /// The concatenated text content of the element.
    #[must_use]
    pub fn text(&self) -> String {
        let (document, node) = self.locate();
        let text = document.read().text_content(node);
        text
    }

    /// The parent element, or `None` for a document root or a removed element.
    #[must_use]
    pub fn parent(&self) -> Option<ObjectProxy> {
        let (document, node) = self.locate();
        let parent = document.read().parent_element(node)?;
        Some(Self::new(document, parent))
    }

    /// Returns `true` if the element has no parent element.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Returns `true` if the element, or one of its ancestors, was deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        let (document, node) = self.locate();
        document.is_inert(node)
    }

    /// Pretty-printed XML of this element's subtree, without a declaration.
    ///
    /// The output does not depend on where the element sits: nesting starts
    /// at column zero and closes without a trailing newline. A leaf element's
    /// XML is therefore a substring of its parent's. An element with child
    /// elements is re-indented inside its parent, so its standalone XML is
    /// not.
    ///
    /// ```
    /// use lazy_xml_model::model::ObjectProxy;
    ///
    /// let office = ObjectProxy::new_root("office").unwrap();
    /// office.set_attribute("city", "Provo").unwrap();
    /// assert_eq!(office.to_xml(), r#"<office city="Provo"/>"#);
    /// ```
    #[must_use]
    pub fn to_xml(&self) -> String {
        let (document, node) = self.locate();
        document.subtree_xml(node)
    }

    /// XML of this element's subtree with explicit options. The declaration
    /// flag is ignored.
    #[must_use]
    pub fn serialize(&self, options: &SerializeOptions) -> String {
        let (document, node) = self.locate();
        let doc = document.read();
        serial::serialize_node(&doc, node, options)
    }

    /// Removes the element and its subtree from the document.
    ///
    /// The proxy, and every other proxy into the removed subtree, stays
    /// readable but rejects further writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the element was already deleted
    /// and [`Error::RootDeletion`] if it has no parent element.
    pub fn delete(&self) -> Result<()> {
        let (document, node) = self.writable()?;
        if document.read().parent_element(node).is_none() {
            return Err(Error::RootDeletion);
        }
        debug!(tag = %tag_of(&document, node), node = node.into_raw(), "deleting element");
        remove_node(&document, node);
        Ok(())
    }

    /// Number of direct child elements named `tag`.
    #[must_use]
    pub fn child_count(&self, tag: &str) -> usize {
        let (document, node) = self.locate();
        let count = document.read().child_elements(node, tag).count();
        count
    }

    // --- Child access used by the field handles ---

    /// The first direct child element named `tag`.
    pub(crate) fn child_element(&self, tag: &str) -> Option<ObjectProxy> {
        let (document, node) = self.locate();
        let child = document.read().first_child_element(node, tag)?;
        Some(Self::new(document, child))
    }

    /// All direct child elements named `tag`, in document order.
    pub(crate) fn child_elements(&self, tag: &str) -> Vec<ObjectProxy> {
        let (document, node) = self.locate();
        let ids: Vec<NodeId> = document.read().child_elements(node, tag).collect();
        ids.into_iter()
            .map(|id| Self::new(document.clone(), id))
            .collect()
    }

    /// Returns the child named `tag`, creating it as the last child when
    /// absent. The flag is `true` when the child was created by this call.
    pub(crate) fn ensure_child(&self, tag: &str) -> Result<(ObjectProxy, bool)> {
        let (document, node) = self.writable()?;
        let existing = document.read().first_child_element(node, tag);
        if let Some(child) = existing {
            return Ok((Self::new(document, child), false));
        }
        let child = self.create_child(tag)?;
        Ok((child, true))
    }

    /// Creates an empty `<tag/>` as the last child.
    pub(crate) fn create_child(&self, tag: &str) -> Result<ObjectProxy> {
        let (document, node) = self.writable()?;
        let child = {
            let mut doc = document.write();
            let child = doc.create_element(tag);
            doc.append_child(node, child);
            child
        };
        debug!(tag, parent = node.into_raw(), node = child.into_raw(), "materialized child element");
        Ok(Self::new(document, child))
    }

    /// Attaches `value`'s element as the last child, renamed to `tag`.
    pub(crate) fn append_value(&self, tag: &str, value: &ObjectProxy) -> Result<ObjectProxy> {
        let (document, node) = self.writable()?;
        let adopted = adopt(&document, node, value, tag)?;
        document.write().append_child(node, adopted);
        Ok(Self::new(document, adopted))
    }

    /// Makes `value` the single child named `tag`.
    ///
    /// An existing child keeps its position: the new element is inserted in
    /// its place and the old one is removed.
    pub(crate) fn replace_value(&self, tag: &str, value: &ObjectProxy) -> Result<ObjectProxy> {
        let (document, node) = self.writable()?;
        let existing = document.read().first_child_element(node, tag);
        let Some(old) = existing else {
            return self.append_value(tag, value);
        };
        if *value == Self::new(document.clone(), old) {
            return Ok(Self::new(document, old));
        }
        let adopted = adopt(&document, node, value, tag)?;
        document.write().insert_before(old, adopted);
        debug!(tag, node = old.into_raw(), replacement = adopted.into_raw(), "replacing child element");
        remove_node(&document, old);
        Ok(Self::new(document, adopted))
    }

    /// Removes `child` if it is a direct child of this element named `tag`.
    pub(crate) fn remove_child(&self, tag: &str, child: &ObjectProxy) -> Result<bool> {
        let (document, node) = self.writable()?;
        let (child_doc, child_node) = child.locate();
        if !child_doc.ptr_eq(&document) {
            return Ok(false);
        }
        let is_member = {
            let doc = document.read();
            doc.parent(child_node) == Some(node) && doc.node_name(child_node) == Some(tag)
        };
        if !is_member {
            return Ok(false);
        }
        debug!(tag, node = child_node.into_raw(), "removing child element");
        remove_node(&document, child_node);
        Ok(true)
    }
}

/// Rejects tag and attribute names the serializer could not round-trip.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Detaches `node` and marks it deleted.
fn remove_node(document: &SharedDocument, node: NodeId) {
    document.write().detach(node);
    document.mark_deleted(node);
}

fn tag_of(document: &SharedDocument, node: NodeId) -> String {
    document.read().node_name(node).unwrap_or_default().to_string()
}

/// Brings `value`'s element into `document` so it can be attached under
/// `owner`, and returns its id there, renamed to `tag`.
///
/// An element of the same document is moved as is. An element of another
/// document is deep-copied, detached from its old parent, and every proxy
/// into the copied subtree is redirected to the copy. Proxies of `document`
/// that were following the element into `source` are pointed at the copy
/// directly, so neither document keeps the other alive.
fn adopt(document: &SharedDocument, owner: NodeId, value: &ObjectProxy, tag: &str) -> Result<NodeId> {
    let (source, node) = value.writable()?;

    if source.ptr_eq(document) {
        if document.read().is_ancestor_or_self(node, owner) {
            return Err(Error::CyclicAssignment {
                tag: tag_of(document, node),
            });
        }
        document.write().rename_element(node, tag);
        return Ok(node);
    }

    let (copy, mapping) = {
        let src = source.read();
        document.write().import_subtree(&src, node)
    };
    source.write().detach(node);
    for (old, new) in mapping {
        source.record_relocation(old, (document, new));
        document.reclaim(&source, old, new);
    }
    document.write().rename_element(copy, tag);
    debug!(tag, node = copy.into_raw(), "imported element from another document");
    Ok(copy)
}

impl PartialEq for ObjectProxy {
    fn eq(&self, other: &Self) -> bool {
        let (a_doc, a_node) = self.locate();
        let (b_doc, b_node) = other.locate();
        a_node == b_node && a_doc.ptr_eq(&b_doc)
    }
}

impl Eq for ObjectProxy {}

impl fmt::Debug for ObjectProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (document, node) = self.locate();
        match document.try_tag(node) {
            Some(tag) => f
                .debug_struct("ObjectProxy")
                .field("tag", &tag)
                .field("node", &node.into_raw())
                .finish(),
            None => f
                .debug_struct("ObjectProxy")
                .field("node", &node.into_raw())
                .finish(),
        }
    }
}

impl ProxyBacked for ObjectProxy {
    fn from_proxy(proxy: ObjectProxy) -> Self {
        proxy
    }

    fn proxy(&self) -> &ObjectProxy {
        self
    }
}
