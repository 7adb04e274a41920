//! Fields stored as the text of a child element.

use std::fmt;

use tracing::debug;

use super::{FieldDecl, ObjectProxy};
use crate::error::Result;

/// A field stored as the text content of at most one child element.
///
/// The child element is created on the first [`set`](Self::set).
#[derive(Clone, Copy)]
pub struct ElementField<'a> {
    owner: &'a ObjectProxy,
    decl: &'static FieldDecl,
}

impl<'a> ElementField<'a> {
    /// Binds the field `decl` to `owner`.
    #[must_use]
    pub fn new(owner: &'a ObjectProxy, decl: &'static FieldDecl) -> Self {
        Self { owner, decl }
    }

    /// The field declaration.
    #[must_use]
    pub fn declaration(&self) -> &'static FieldDecl {
        self.decl
    }

    /// The child element's text, or `None` if there is no such element.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.owner
            .child_element(self.decl.backing_name)
            .map(|child| child.text())
    }

    /// Replaces the child element's content with `value`, creating the
    /// element as the owner's last child if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeCoercion`](crate::Error::AttributeCoercion)
    /// if the declared validator rejects the value and
    /// [`Error::UseAfterDelete`](crate::Error::UseAfterDelete) if the owner
    /// was deleted.
    pub fn set(&self, value: impl AsRef<str>) -> Result<()> {
        let value = value.as_ref();
        self.decl.validate(value)?;
        let (child, _) = self.owner.ensure_child(self.decl.backing_name)?;
        let (document, node) = child.locate();
        document.write().set_text_content(node, value);
        debug!(field = self.decl.name, node = node.into_raw(), "set element text");
        Ok(())
    }

    /// Removes the child element. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`](crate::Error::UseAfterDelete) if the
    /// owner was deleted.
    pub fn remove(&self) -> Result<bool> {
        match self.owner.child_element(self.decl.backing_name) {
            Some(child) => self.owner.remove_child(self.decl.backing_name, &child),
            None => self.owner.writable().map(|_| false),
        }
    }

    /// Returns `true` if the child element exists.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.owner.child_element(self.decl.backing_name).is_some()
    }
}

impl fmt::Debug for ElementField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementField")
            .field("name", &self.decl.name)
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::FieldKind;

    static MOTTO: FieldDecl = FieldDecl::new("motto", FieldKind::Element, "motto");

    #[test]
    fn test_set_materializes_once() {
        let owner = ObjectProxy::new_root("company").unwrap();
        let field = ElementField::new(&owner, &MOTTO);
        assert_eq!(field.get(), None);

        field.set("Open source").unwrap();
        field.set("Open & free").unwrap();
        assert_eq!(field.get().as_deref(), Some("Open & free"));
        assert_eq!(
            owner.serialize(&crate::serial::SerializeOptions::default().indent(false)),
            "<company><motto>Open &amp; free</motto></company>"
        );
    }

    #[test]
    fn test_remove() {
        let owner = ObjectProxy::new_root("company").unwrap();
        let field = ElementField::new(&owner, &MOTTO);
        assert!(!field.remove().unwrap());
        field.set("x").unwrap();
        assert!(field.is_present());
        assert!(field.remove().unwrap());
        assert!(!field.is_present());
        assert_eq!(owner.to_xml(), "<company/>");
    }
}
