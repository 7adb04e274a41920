//! # lazy-xml-model
//!
//! Typed object models over a mutable XML tree. Attributes, child-element
//! text, single child objects, and collections of child objects are exposed
//! as ordinary accessors, while the XML backing each of them is only created
//! the first time it is written.
//!
//! The XML tree is the single source of truth: proxies hold a node handle
//! and nothing else, so every read sees the current document and every write
//! goes straight into it.
//!
//! ## Quick Start
//!
//! ```
//! use lazy_xml_model::prelude::*;
//!
//! xml_model! {
//!     /// A company.
//!     pub struct Company as "company" {
//!         attribute name = "name";
//!         has_one description: Description = "description";
//!         has_many locations: Location = "location";
//!     }
//! }
//!
//! xml_model! {
//!     /// What a company says about itself.
//!     pub struct Description as "description" {
//!         attribute kind = "type";
//!         attribute founding_year = "foundingyear";
//!     }
//! }
//!
//! xml_model! {
//!     /// An office.
//!     pub struct Location as "location" {
//!         attribute city = "city";
//!     }
//! }
//!
//! let company = Company::parse(r#"<company name="SUSE"><location city="Nuremberg"/></company>"#)?;
//! assert!(company.description().get().is_none());
//!
//! company.description().assign_attributes([("type", "about"), ("foundingyear", "1992")])?;
//! assert_eq!(company.description().get().unwrap().founding_year().get().as_deref(), Some("1992"));
//!
//! company.locations().build([("city", "Prague")])?;
//! assert_eq!(company.locations().len(), 2);
//!
//! company.description().get().unwrap().delete()?;
//! assert!(!company.to_xml().contains("description"));
//! # Ok::<(), lazy_xml_model::Error>(())
//! ```

pub mod encoding;
pub mod error;
pub mod model;
pub mod parser;
pub mod serial;
pub mod tree;

pub use error::{Error, ParseError, Result};
pub use model::{ObjectProxy, SharedDocument, XmlModel};
pub use tree::{Attribute, Document, NodeId};

/// The names needed to declare and use models.
pub mod prelude {
    pub use crate::model::{
        CollectionProxy, Field, FieldKind, ModelOptions, ObjectProxy, ProxyBacked,
        SharedDocument, XmlModel,
    };
    pub use crate::xml_model;
}
