//! Typed object models over XML elements.
//!
//! A model is a thin wrapper around an [`ObjectProxy`] plus a static table of
//! [`FieldDecl`]s. Each declared field maps a name to an attribute, to the
//! text of a child element, to one child object, or to a collection of child
//! objects. Child elements are only created when a field is first written.
//!
//! Models are usually declared with [`xml_model!`](crate::xml_model):
//!
//! ```
//! use lazy_xml_model::prelude::*;
//!
//! xml_model! {
//!     /// A company.
//!     pub struct Company as "company" {
//!         attribute name = "name";
//!         has_one description: Description = "description";
//!     }
//! }
//!
//! xml_model! {
//!     /// What a company says about itself.
//!     pub struct Description as "description" {
//!         attribute kind = "type";
//!     }
//! }
//!
//! let company = Company::new();
//! assert!(company.description().get().is_none());
//! company.description().build_with([("type", "about")]).unwrap();
//! assert_eq!(company.description().get().unwrap().kind().get().as_deref(), Some("about"));
//! ```

mod attribute;
mod element;
mod has_many;
mod has_one;
mod macros;
mod proxy;
mod shared;

pub use attribute::AttributeField;
pub use element::ElementField;
pub use has_many::{CollectionProxy, RepeatedChildField};
pub use has_one::SingleChildField;
pub use proxy::ObjectProxy;
pub use shared::SharedDocument;

use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::{self, ParseOptions};
use crate::serial::SerializeOptions;
use crate::tree::{is_valid_name, Document, NodeId};
use proxy::check_name;

/// Checks a value before it is written. `Err` carries the reason.
pub type Validator = fn(&str) -> std::result::Result<(), String>;

/// Where a declared field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// An attribute of the owning element.
    Attribute,
    /// The text content of one child element.
    Element,
    /// At most one child element, exposed as a model.
    SingleChild,
    /// Any number of child elements, exposed as a collection of models.
    RepeatedChild,
}

/// A static field declaration.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    /// The accessor name.
    pub name: &'static str,
    /// How the field is stored.
    pub kind: FieldKind,
    /// The attribute or tag name in the XML.
    pub backing_name: &'static str,
    /// Optional check run before every write of an attribute or element field.
    pub validator: Option<Validator>,
    /// The child model's declarations, for single and repeated child fields.
    pub children: Option<fn() -> &'static [FieldDecl]>,
}

impl FieldDecl {
    /// Declares a field without a validator.
    ///
    /// # Panics
    ///
    /// Panics if `backing_name` is not an XML name. In a `static` or `const`
    /// this is a compile error.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind, backing_name: &'static str) -> Self {
        assert!(is_valid_name(backing_name), "backing name is not a valid XML name");
        Self {
            name,
            kind,
            backing_name,
            validator: None,
            children: None,
        }
    }

    /// Attaches a validator.
    #[must_use]
    pub const fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Attaches the child model's declarations to a child field.
    #[must_use]
    pub const fn with_children(mut self, children: fn() -> &'static [FieldDecl]) -> Self {
        self.children = Some(children);
        self
    }

    /// The child model's declarations, or an empty table when none were
    /// attached.
    #[must_use]
    pub fn child_fields(&self) -> &'static [FieldDecl] {
        self.children.map_or(&[], |children| children())
    }

    /// Runs the validator, if any, against `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeCoercion`] when the validator rejects it.
    pub fn validate(&self, value: &str) -> Result<()> {
        match self.validator {
            Some(check) => check(value).map_err(|reason| Error::AttributeCoercion {
                field: self.name.to_string(),
                value: value.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Returns `true` if `key` is this field's name or backing name.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.backing_name == key
    }
}

/// A type that wraps an [`ObjectProxy`].
pub trait ProxyBacked: Sized {
    /// Wraps a proxy.
    fn from_proxy(proxy: ObjectProxy) -> Self;

    /// The wrapped proxy.
    fn proxy(&self) -> &ObjectProxy;

    /// The type's field declarations. Untyped proxies declare none.
    fn declared_fields() -> &'static [FieldDecl] {
        &[]
    }
}

/// Options for creating or parsing a model's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    /// Root tag for new documents. Overrides the model's own.
    pub root_tag: Option<String>,
    /// Options for parsing.
    pub parse: ParseOptions,
    /// Options for `to_xml` and `document_xml`.
    pub serialize: SerializeOptions,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            root_tag: None,
            parse: ParseOptions::default().no_blanks(true),
            serialize: SerializeOptions::default(),
        }
    }
}

impl ModelOptions {
    /// Sets the root tag used for new documents.
    #[must_use]
    pub fn root_tag(mut self, tag: &str) -> Self {
        self.root_tag = Some(tag.to_string());
        self
    }

    /// Sets the parse options.
    #[must_use]
    pub fn parse(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Sets the serialize options.
    #[must_use]
    pub fn serialize(mut self, options: SerializeOptions) -> Self {
        self.serialize = options;
        self
    }
}

/// A declared object model bound to an XML element.
pub trait XmlModel: ProxyBacked {
    /// The model's type name.
    const TYPE_NAME: &'static str;
    /// Root tag for new documents. Defaults to the lowercased type name.
    ///
    /// Must be an XML name; `xml_model!` checks this at compile time.
    const ROOT_TAG: Option<&'static str> = None;
    /// The field declarations, in declaration order.
    const FIELDS: &'static [FieldDecl];

    /// Creates a new document holding an empty root element of this model.
    #[must_use]
    fn new() -> Self {
        create_root(&default_root_tag::<Self>(), SerializeOptions::default(), Self::TYPE_NAME)
    }

    /// Creates a new document with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the root tag set in `options` is not
    /// an XML name.
    fn with_options(options: &ModelOptions) -> Result<Self> {
        let tag = match options.root_tag.as_deref() {
            Some(tag) => {
                check_name(tag)?;
                tag.to_string()
            }
            None => default_root_tag::<Self>(),
        };
        Ok(create_root(&tag, options.serialize.clone(), Self::TYPE_NAME))
    }

    /// Creates a new document and writes `attributes` onto its root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] before creating anything if an
    /// undeclared key is not an XML name, otherwise the first failing write.
    fn with_attributes<I, K, V>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let assignments = Assignments::new(Self::FIELDS, attributes)?;
        let model = Self::new();
        assignments.apply(model.proxy())?;
        Ok(model)
    }

    /// Parses `input` and binds its root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the input is not well-formed.
    fn parse(input: &str) -> Result<Self> {
        Self::parse_with_options(input, &ModelOptions::default())
    }

    /// Parses `input` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the input is not well-formed.
    fn parse_with_options(input: &str, options: &ModelOptions) -> Result<Self> {
        let doc = parser::parse_str_with_options(input, &options.parse)?;
        let document = SharedDocument::with_serialize_options(doc, options.serialize.clone());
        Ok(Self::from_proxy(ObjectProxy::root_of(document)?))
    }

    /// Parses raw bytes, detecting the encoding, and binds the root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the bytes cannot be decoded or
    /// are not well-formed.
    fn parse_bytes(input: &[u8]) -> Result<Self> {
        let options = ModelOptions::default();
        let doc = parser::parse_bytes_with_options(input, &options.parse)?;
        let document = SharedDocument::with_serialize_options(doc, options.serialize);
        Ok(Self::from_proxy(ObjectProxy::root_of(document)?))
    }

    /// Takes ownership of a document and binds its root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootElement`] if the document has none.
    fn from_document(doc: Document) -> Result<Self> {
        Ok(Self::from_proxy(ObjectProxy::root_of(SharedDocument::new(doc))?))
    }

    /// Binds an arbitrary element of a shared document.
    #[must_use]
    fn from_node(document: SharedDocument, node: NodeId) -> Self {
        Self::from_proxy(ObjectProxy::new(document, node))
    }

    /// Pretty-printed XML of this model's subtree.
    #[must_use]
    fn to_xml(&self) -> String {
        self.proxy().to_xml()
    }

    /// The whole document this model lives in, XML declaration included.
    #[must_use]
    fn document_xml(&self) -> String {
        self.proxy().document().to_xml()
    }

    /// Removes this model's element from its document.
    ///
    /// # Errors
    ///
    /// See [`ObjectProxy::delete`].
    fn delete(&self) -> Result<()> {
        self.proxy().delete()
    }

    /// Looks up a declared field by name and binds it to this model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if no field has that name.
    fn field(&self, name: &str) -> Result<Field<'_>> {
        let decl = Self::declaration(name).ok_or_else(|| Error::UnknownField {
            model: Self::TYPE_NAME,
            name: name.to_string(),
        })?;
        Ok(Field::bind(self.proxy(), decl))
    }

    /// The declaration of the field called `name`.
    #[must_use]
    fn declaration(name: &str) -> Option<&'static FieldDecl> {
        Self::FIELDS.iter().find(|decl| decl.name == name)
    }
}

/// A field bound to a proxy, resolved by name at runtime.
#[derive(Debug)]
pub enum Field<'a> {
    /// An attribute field.
    Attribute(AttributeField<'a>),
    /// A child element text field.
    Element(ElementField<'a>),
    /// A single child object.
    SingleChild(SingleChildField<'a, ObjectProxy>),
    /// A collection of child objects.
    RepeatedChild(RepeatedChildField<'a, ObjectProxy>),
}

impl<'a> Field<'a> {
    /// Binds `decl` to `owner` as the variant matching its kind.
    #[must_use]
    pub fn bind(owner: &'a ObjectProxy, decl: &'static FieldDecl) -> Self {
        match decl.kind {
            FieldKind::Attribute => Self::Attribute(AttributeField::new(owner, decl)),
            FieldKind::Element => Self::Element(ElementField::new(owner, decl)),
            FieldKind::SingleChild => Self::SingleChild(SingleChildField::new(owner, decl)),
            FieldKind::RepeatedChild => Self::RepeatedChild(RepeatedChildField::new(owner, decl)),
        }
    }

    /// The field's declaration.
    #[must_use]
    pub fn declaration(&self) -> &'static FieldDecl {
        match self {
            Self::Attribute(f) => f.declaration(),
            Self::Element(f) => f.declaration(),
            Self::SingleChild(f) => f.declaration(),
            Self::RepeatedChild(f) => f.declaration(),
        }
    }

    /// The field's kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.declaration().kind
    }
}

/// The declared root tag, else the lowercased type name.
fn default_root_tag<M: XmlModel>() -> String {
    M::ROOT_TAG.map_or_else(|| M::TYPE_NAME.to_lowercase(), str::to_string)
}

/// Wraps a fresh document whose root element is `<tag/>`.
fn create_root<M: ProxyBacked>(tag: &str, serialize: SerializeOptions, model: &'static str) -> M {
    let (doc, root) = Document::with_root_element(tag);
    debug!(model, tag, "created document");
    let document = SharedDocument::with_serialize_options(doc, serialize);
    M::from_proxy(ObjectProxy::new(document, root))
}

/// The declarations bulk writes onto a child of `decl` resolve against.
pub(crate) fn child_fields<M: ProxyBacked>(decl: &FieldDecl) -> &'static [FieldDecl] {
    match decl.children {
        Some(children) => children(),
        None => M::declared_fields(),
    }
}

/// A checked batch of key/value writes.
///
/// Keys naming one of the attribute or element fields in `fields` (by field
/// name or backing name) go through that field, validator included. Other
/// keys become raw attributes; their names are checked when the batch is
/// built, so nothing is written for a batch with an invalid name.
pub(crate) struct Assignments {
    fields: &'static [FieldDecl],
    values: Vec<(String, String)>,
}

impl Assignments {
    pub(crate) fn new<I, K, V>(fields: &'static [FieldDecl], values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let values: Vec<(String, String)> = values
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        let batch = Self { fields, values };
        for (key, _) in &batch.values {
            if batch.resolve(key).is_none() {
                check_name(key)?;
            }
        }
        Ok(batch)
    }

    fn resolve(&self, key: &str) -> Option<&'static FieldDecl> {
        self.fields.iter().find(|decl| {
            decl.matches(key) && matches!(decl.kind, FieldKind::Attribute | FieldKind::Element)
        })
    }

    /// Writes the batch in order, stopping at the first failure.
    pub(crate) fn apply(&self, proxy: &ObjectProxy) -> Result<()> {
        for (key, value) in &self.values {
            match self.resolve(key) {
                Some(decl) if decl.kind == FieldKind::Element => {
                    ElementField::new(proxy, decl).set(value)?;
                }
                Some(decl) => AttributeField::new(proxy, decl).set(value)?,
                None => proxy.set_attribute(key, value)?,
            }
        }
        Ok(())
    }
}
