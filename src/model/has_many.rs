//! Repeated child objects and the collection view over them.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use super::{child_fields, Assignments, FieldDecl, ObjectProxy, ProxyBacked};
use crate::error::{Error, Result};

/// A field holding zero or more child elements sharing one tag.
///
/// Members are the owner's direct children with the backing tag, in
/// document order. Same-tag elements deeper in the tree are not members.
pub struct RepeatedChildField<'a, M> {
    owner: &'a ObjectProxy,
    decl: &'static FieldDecl,
    model: PhantomData<fn() -> M>,
}

impl<'a, M: ProxyBacked> RepeatedChildField<'a, M> {
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

    /// A live view over the members. Empty, never absent.
    #[must_use]
    pub fn list(&self) -> CollectionProxy<M> {
        CollectionProxy::new(self.owner.clone(), self.decl)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list().len()
    }

    /// Returns `true` if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// The member at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<M> {
        self.list().get(index)
    }

    /// A snapshot iterator over the members in document order.
    pub fn iter(&self) -> std::vec::IntoIter<M> {
        self.list().iter()
    }

    /// Appends `value` as the last member.
    ///
    /// # Errors
    ///
    /// See [`CollectionProxy::push`].
    pub fn append(&self, value: &M) -> Result<()> {
        self.list().push(value)
    }

    /// Alias of [`append`](Self::append).
    ///
    /// # Errors
    ///
    /// See [`CollectionProxy::push`].
    pub fn push(&self, value: &M) -> Result<()> {
        self.append(value)
    }

    /// Creates a new last member carrying `attributes`.
    ///
    /// # Errors
    ///
    /// See [`CollectionProxy::build`].
    pub fn build<I, K, V>(&self, attributes: I) -> Result<M>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.list().build(attributes)
    }

    /// Removes `value` if it is a member.
    ///
    /// # Errors
    ///
    /// See [`CollectionProxy::remove`].
    pub fn remove(&self, value: &M) -> Result<bool> {
        self.list().remove(value)
    }

    /// Removes and returns the member at `index`.
    ///
    /// # Errors
    ///
    /// See [`CollectionProxy::remove_at`].
    pub fn remove_at(&self, index: usize) -> Result<M> {
        self.list().remove_at(index)
    }
}

impl<M: ProxyBacked + fmt::Debug> fmt::Debug for RepeatedChildField<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeatedChildField")
            .field("name", &self.decl.name)
            .field("members", &self.list().to_vec())
            .finish()
    }
}

/// An ordered, index-addressable live view over a repeated field.
///
/// The view stores only its owner and the field declaration; every read
/// goes to the tree, so it never goes stale when the document changes
/// underneath it.
pub struct CollectionProxy<M> {
    owner: ObjectProxy,
    decl: &'static FieldDecl,
    model: PhantomData<fn() -> M>,
}

impl<M: ProxyBacked> CollectionProxy<M> {
    /// Creates the view over `decl`'s members of `owner`.
    #[must_use]
    pub fn new(owner: ObjectProxy, decl: &'static FieldDecl) -> Self {
        Self {
            owner,
            decl,
            model: PhantomData,
        }
    }

    /// The element owning the members.
    #[must_use]
    pub fn owner(&self) -> &ObjectProxy {
        &self.owner
    }

    fn members(&self) -> Vec<ObjectProxy> {
        self.owner.child_elements(self.decl.backing_name)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members().len()
    }

    /// Returns `true` if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner.child_element(self.decl.backing_name).is_none()
    }

    /// The member at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<M> {
        self.members().into_iter().nth(index).map(M::from_proxy)
    }

    /// The first member.
    #[must_use]
    pub fn first(&self) -> Option<M> {
        self.owner
            .child_element(self.decl.backing_name)
            .map(M::from_proxy)
    }

    /// The last member.
    #[must_use]
    pub fn last(&self) -> Option<M> {
        self.members().pop().map(M::from_proxy)
    }

    /// A snapshot iterator over the members in document order.
    ///
    /// Changes made while iterating are not reflected in the iterator.
    pub fn iter(&self) -> std::vec::IntoIter<M> {
        self.to_vec().into_iter()
    }

    /// The members in document order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<M> {
        self.members().into_iter().map(M::from_proxy).collect()
    }

    /// Returns `true` if `value` is a member.
    #[must_use]
    pub fn contains(&self, value: &M) -> bool {
        self.position(value).is_some()
    }

    /// The index of `value` among the members.
    #[must_use]
    pub fn position(&self, value: &M) -> Option<usize> {
        let target = value.proxy();
        self.members().iter().position(|member| member == target)
    }

    /// Appends `value` as the last member.
    ///
    /// A value that is already a member moves to the end. A value from
    /// another document is copied in and follows the copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the owner or `value` was deleted
    /// and [`Error::CyclicAssignment`] if `value` is the owner or one of its
    /// ancestors.
    pub fn push(&self, value: &M) -> Result<()> {
        let member = self.owner.append_value(self.decl.backing_name, value.proxy())?;
        debug!(
            field = self.decl.name,
            node = member.node_id().into_raw(),
            "appended collection member"
        );
        Ok(())
    }

    /// Creates a new last member carrying `attributes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the owner was deleted, or the
    /// first failing attribute write. The member and the writes before the
    /// failure stay in place. An undeclared key that is not an XML name
    /// fails with [`Error::InvalidName`] before the member is created.
    pub fn build<I, K, V>(&self, attributes: I) -> Result<M>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let assignments = Assignments::new(child_fields::<M>(self.decl), attributes)?;
        let member = self.owner.create_child(self.decl.backing_name)?;
        assignments.apply(&member)?;
        Ok(M::from_proxy(member))
    }

    /// Removes `value` if it is a member. The removed element becomes
    /// deleted; the remaining members keep their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the owner was deleted.
    pub fn remove(&self, value: &M) -> Result<bool> {
        self.owner.remove_child(self.decl.backing_name, value.proxy())
    }

    /// Removes and returns the member at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] past the last member and
    /// [`Error::UseAfterDelete`] if the owner was deleted.
    pub fn remove_at(&self, index: usize) -> Result<M> {
        let members = self.members();
        let len = members.len();
        let member = members
            .into_iter()
            .nth(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        self.owner.remove_child(self.decl.backing_name, &member)?;
        Ok(M::from_proxy(member))
    }

    /// Removes every member and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the owner was deleted.
    pub fn clear(&self) -> Result<usize> {
        self.owner.writable()?;
        let mut removed = 0;
        for member in self.members() {
            if self.owner.remove_child(self.decl.backing_name, &member)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl<M> Clone for CollectionProxy<M> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            decl: self.decl,
            model: PhantomData,
        }
    }
}

impl<M: ProxyBacked + fmt::Debug> fmt::Debug for CollectionProxy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<M: ProxyBacked> IntoIterator for &CollectionProxy<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
