//! Single child objects.

use std::fmt;
use std::marker::PhantomData;

use super::{child_fields, Assignments, FieldDecl, ObjectProxy, ProxyBacked};
use crate::error::Result;

/// A field holding at most one child element, exposed as a model `M`.
///
/// The child is either absent or present. Reading never creates it; the
/// write paths ([`set`](Self::set), [`build`](Self::build),
/// [`build_with`](Self::build_with), and
/// [`assign_attributes`](Self::assign_attributes)) create it on first use.
pub struct SingleChildField<'a, M> {
    owner: &'a ObjectProxy,
    decl: &'static FieldDecl,
    model: PhantomData<fn() -> M>,
}

impl<'a, M: ProxyBacked> SingleChildField<'a, M> {
    /// Binds the field `decl` to `owner`.
    #[must_use]
    pub fn new(owner: &'a ObjectProxy, decl: &'static FieldDecl) -> Self {
        Self {
            owner,
            decl,
            model: PhantomData,
        }
    }

    /// The field declaration.
    #[must_use]
    pub fn declaration(&self) -> &'static FieldDecl {
        self.decl
    }

    /// The child, or `None` if it was never created or has been removed.
    ///
    /// Repeated reads return equal models.
    #[must_use]
    pub fn get(&self) -> Option<M> {
        self.owner.child_element(self.decl.backing_name).map(M::from_proxy)
    }

    /// Returns `true` if the child exists.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.owner.child_element(self.decl.backing_name).is_some()
    }

    /// Binds `value` as the child.
    ///
    /// An existing child is replaced in place and becomes deleted. An element
    /// from another document is copied in and `value` follows the copy, so a
    /// subsequent [`get`](Self::get) returns a model equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`](crate::Error::UseAfterDelete) if
    /// either side was deleted and
    /// [`Error::CyclicAssignment`](crate::Error::CyclicAssignment) if `value`
    /// is the owner or one of its ancestors.
    pub fn set(&self, value: &M) -> Result<()> {
        self.owner
            .replace_value(self.decl.backing_name, value.proxy())
            .map(|_| ())
    }

    /// Returns the child, creating an empty one if it is absent.
    ///
    /// Never replaces an existing child.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`](crate::Error::UseAfterDelete) if the
    /// owner was deleted.
    pub fn build(&self) -> Result<M> {
        let (child, _) = self.owner.ensure_child(self.decl.backing_name)?;
        Ok(M::from_proxy(child))
    }

    /// Like [`build`](Self::build), writing `attributes` onto the child only
    /// when this call created it.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), plus any error of an individual attribute
    /// write. Writes before the failing one stay applied. An undeclared key
    /// that is not an XML name fails with
    /// [`Error::InvalidName`](crate::Error::InvalidName) before anything is
    /// written.
    pub fn build_with<I, K, V>(&self, attributes: I) -> Result<M>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let assignments = Assignments::new(child_fields::<M>(self.decl), attributes)?;
        let (child, created) = self.owner.ensure_child(self.decl.backing_name)?;
        if created {
            assignments.apply(&child)?;
        }
        Ok(M::from_proxy(child))
    }

    /// Creates the child if absent, then overwrites exactly the given
    /// attributes on it. Other attributes are left alone.
    ///
    /// Keys are matched against `M`'s declared fields by field name or by
    /// backing name, so declared validators run. Undeclared keys are written
    /// as raw attributes.
    ///
    /// # Errors
    ///
    /// As [`build_with`](Self::build_with).
    pub fn assign_attributes<I, K, V>(&self, attributes: I) -> Result<M>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let assignments = Assignments::new(child_fields::<M>(self.decl), attributes)?;
        let child = self.build()?;
        assignments.apply(child.proxy())?;
        Ok(child)
    }
}

impl<M: ProxyBacked + fmt::Debug> fmt::Debug for SingleChildField<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleChildField")
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
    use crate::Error;

    static DESCRIPTION: FieldDecl =
        FieldDecl::new("description", FieldKind::SingleChild, "description");

    fn field(owner: &ObjectProxy) -> SingleChildField<'_, ObjectProxy> {
        SingleChildField::new(owner, &DESCRIPTION)
    }

    #[test]
    fn test_build_is_idempotent() {
        let company = ObjectProxy::new_root("company").unwrap();
        let first = field(&company).build().unwrap();
        let second = field(&company).build().unwrap();
        assert_eq!(first, second);
        assert_eq!(company.to_xml(), "<company>\n  <description/>\n</company>");
    }

    #[test]
    fn test_build_with_applies_only_on_creation() {
        let company = ObjectProxy::new_root("company").unwrap();
        field(&company).build_with([("type", "about")]).unwrap();
        field(&company).build_with([("type", "history")]).unwrap();
        let desc = field(&company).get().unwrap();
        assert_eq!(desc.attribute("type").as_deref(), Some("about"));
    }

    #[test]
    fn test_assign_attributes_overwrites_named_keys() {
        let company = ObjectProxy::new_root("company").unwrap();
        field(&company)
            .build_with([("type", "about"), ("website", "http://www.suse.com")])
            .unwrap();
        field(&company)
            .assign_attributes([("type", "history")])
            .unwrap();
        let desc = field(&company).get().unwrap();
        assert_eq!(desc.attribute("type").as_deref(), Some("history"));
        assert_eq!(desc.attribute("website").as_deref(), Some("http://www.suse.com"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let company = ObjectProxy::new_root("company").unwrap();
        let first = field(&company).build().unwrap();
        let _tail = company.create_child("location").unwrap();
        let replacement = ObjectProxy::new_root("description").unwrap();
        replacement.set_attribute("type", "new").unwrap();
        field(&company).set(&replacement).unwrap();

        assert!(first.is_deleted());
        assert_eq!(field(&company).get(), Some(replacement.clone()));
        assert_eq!(
            company.to_xml(),
            "<company>\n  <description type=\"new\"/>\n  <location/>\n</company>"
        );
        // the replaced child rejects writes but stays readable
        assert!(first.set_attribute("type", "old").unwrap_err().is_use_after_delete());
        assert_eq!(first.tag(), "description");
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let company = ObjectProxy::new_root("company").unwrap();
        let desc = field(&company).build().unwrap();
        field(&company).set(&desc).unwrap();
        assert!(!desc.is_deleted());
        assert_eq!(field(&company).get(), Some(desc));
    }

    #[test]
    fn test_set_ancestor_is_cyclic() {
        let company = ObjectProxy::new_root("company").unwrap();
        let desc = field(&company).build().unwrap();
        let err = field(&desc).set(&company).unwrap_err();
        assert!(matches!(err, Error::CyclicAssignment { .. }), "{err}");
    }

    #[test]
    fn test_adopted_element_is_renamed() {
        let company = ObjectProxy::new_root("company").unwrap();
        let about = ObjectProxy::new_root("about").unwrap();
        field(&company).set(&about).unwrap();
        assert_eq!(about.tag(), "description");
        assert_eq!(field(&company).get(), Some(about));
    }
}
