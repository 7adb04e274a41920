//! Attribute-backed fields.

use std::fmt;
use std::str::FromStr;

use super::{FieldDecl, ObjectProxy};
use crate::error::{Error, Result};

/// A field stored as an attribute of the owning element.
///
/// The owning element always exists, so nothing is materialized: writes go
/// straight to the element's attribute list.
#[derive(Clone, Copy)]
pub struct AttributeField<'a> {
    owner: &'a ObjectProxy,
    decl: &'static FieldDecl,
}

impl<'a> AttributeField<'a> {
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

    /// The current value, or `None` if the attribute is absent.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.owner.attribute(self.decl.backing_name)
    }

    /// Reads the value and parses it as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeCoercion`] if the value does not parse.
    pub fn parse<T>(&self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(value) = self.get() else {
            return Ok(None);
        };
        match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(err) => Err(Error::AttributeCoercion {
                field: self.decl.name.to_string(),
                value,
                reason: err.to_string(),
            }),
        }
    }

    /// Sets the attribute, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeCoercion`] if the declared validator rejects
    /// the value, in which case the element is unchanged, and
    /// [`Error::UseAfterDelete`] if the owner was deleted.
    pub fn set(&self, value: impl AsRef<str>) -> Result<()> {
        let value = value.as_ref();
        self.decl.validate(value)?;
        self.owner.set_attribute(self.decl.backing_name, value)
    }

    /// Removes the attribute, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterDelete`] if the owner was deleted.
    pub fn remove(&self) -> Result<Option<String>> {
        self.owner.remove_attribute(self.decl.backing_name)
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

impl fmt::Debug for AttributeField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeField")
            .field("name", &self.decl.name)
            .field("value", &self.get())
            .finish()
    }
}
