//! Shared, single-threaded document handles.
//!
//! Every proxy into a document holds a [`SharedDocument`]. Besides the tree
//! itself the handle keeps the proxy-layer bookkeeping: which nodes were
//! deleted through a proxy, and where nodes that were moved into another
//! document now live.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::serial::{self, SerializeOptions};
use crate::tree::{Document, NodeId};

/// A reference-counted handle to a document and its proxy bookkeeping.
///
/// Cloning the handle is cheap and yields another handle to the same
/// document. Two handles are equal when they point at the same document.
///
/// A document is released with its last handle. Proxies whose element was
/// moved into another document only follow it while that document is alive;
/// afterwards they read the detached original.
///
/// Nothing is compacted while a handle exists: detached and replaced
/// subtrees stay in the arena, and the deleted and relocation tables only
/// grow. A long-lived document that is rewritten many times should be
/// re-parsed from its own XML now and then.
#[derive(Clone)]
pub struct SharedDocument(Rc<RefCell<DocumentState>>);

struct DocumentState {
    doc: Document,
    serialize: SerializeOptions,
    /// Nodes detached through a proxy. Their subtrees are read-only.
    deleted: HashSet<NodeId>,
    /// Nodes that moved away, keyed by their old id.
    relocated: HashMap<NodeId, Relocation>,
}

/// Where a moved node lives now.
///
/// The table never holds a strong handle to another document, so two
/// documents that exchanged nodes in both directions can still be dropped.
enum Relocation {
    /// Copied back into this document under a new id.
    Local(NodeId),
    /// Imported into another document.
    Foreign(Weak<RefCell<DocumentState>>, NodeId),
}

impl SharedDocument {
    /// Wraps a document using the default serialization options.
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self::with_serialize_options(doc, SerializeOptions::default())
    }

    /// Wraps a document. `to_xml` output on any proxy into it uses `options`.
    #[must_use]
    pub fn with_serialize_options(doc: Document, options: SerializeOptions) -> Self {
        Self(Rc::new(RefCell::new(DocumentState {
            doc,
            serialize: options,
            deleted: HashSet::new(),
            relocated: HashMap::new(),
        })))
    }

    /// Borrows the underlying document for reading.
    ///
    /// # Panics
    ///
    /// Panics if the document is being mutated, which cannot happen outside
    /// of a call into this crate.
    #[must_use]
    pub fn read(&self) -> Ref<'_, Document> {
        Ref::map(self.0.borrow(), |state| &state.doc)
    }

    pub(crate) fn write(&self) -> RefMut<'_, Document> {
        RefMut::map(self.0.borrow_mut(), |state| &mut state.doc)
    }

    /// Returns `true` if both handles refer to the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Serializes the whole document, XML declaration included.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let state = self.0.borrow();
        serial::serialize_with_options(&state.doc, &state.serialize)
    }

    /// Serializes the subtree rooted at `node`.
    pub(crate) fn subtree_xml(&self, node: NodeId) -> String {
        let state = self.0.borrow();
        serial::serialize_node(&state.doc, node, &state.serialize)
    }

    /// The tag of `node`, or `None` if the document is mutably borrowed.
    pub(crate) fn try_tag(&self, node: NodeId) -> Option<String> {
        let state = self.0.try_borrow().ok()?;
        let tag = state.doc.node_name(node).map(str::to_string);
        tag
    }

    /// Returns `true` if `node` or one of its ancestors was deleted.
    pub(crate) fn is_inert(&self, node: NodeId) -> bool {
        let state = self.0.borrow();
        if state.deleted.is_empty() {
            return false;
        }
        state.doc.ancestors(node).any(|id| state.deleted.contains(&id))
    }

    pub(crate) fn mark_deleted(&self, node: NodeId) {
        self.0.borrow_mut().deleted.insert(node);
    }

    /// Records that `node` of this document now lives at `target`.
    pub(crate) fn record_relocation(&self, node: NodeId, target: (&SharedDocument, NodeId)) {
        let (document, id) = target;
        let entry = if document.ptr_eq(self) {
            Relocation::Local(id)
        } else {
            Relocation::Foreign(Rc::downgrade(&document.0), id)
        };
        self.0.borrow_mut().relocated.insert(node, entry);
    }

    /// Rewrites entries that point at `old` in `source` to the local `new`,
    /// after `source` handed that node back to this document.
    pub(crate) fn reclaim(&self, source: &SharedDocument, old: NodeId, new: NodeId) {
        let mut state = self.0.borrow_mut();
        let source = Rc::as_ptr(&source.0);
        for entry in state.relocated.values_mut() {
            let handed_back = matches!(
                entry,
                Relocation::Foreign(doc, id) if *id == old && std::ptr::eq(doc.as_ptr(), source)
            );
            if handed_back {
                *entry = Relocation::Local(new);
            }
        }
    }

    /// Where `node` moved to, if it moved and its new document is alive.
    pub(crate) fn relocation(&self, node: NodeId) -> Option<(SharedDocument, NodeId)> {
        match self.0.borrow().relocated.get(&node)? {
            Relocation::Local(id) => Some((self.clone(), *id)),
            Relocation::Foreign(doc, id) => doc.upgrade().map(|rc| (Self(rc), *id)),
        }
    }
}

impl PartialEq for SharedDocument {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SharedDocument {}

impl fmt::Debug for SharedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(state) => f
                .debug_struct("SharedDocument")
                .field("nodes", &state.doc.node_count())
                .field("deleted", &state.deleted.len())
                .field("relocated", &state.relocated.len())
                .finish(),
            Err(_) => f.write_str("SharedDocument(<borrowed>)"),
        }
    }
}

impl From<Document> for SharedDocument {
    fn from(doc: Document) -> Self {
        Self::new(doc)
    }
}
