//! Deletion and the read-only state of deleted elements.

#![allow(clippy::unwrap_used)]

mod common;

use common::{company, Company, Description, Location, COMPANY_XML};
use lazy_xml_model::prelude::*;
use lazy_xml_model::Error;

#[test]
fn test_root_deletion_is_rejected() {
    let company = company();
    let before = company.document_xml();
    let err = company.delete().unwrap_err();
    assert!(matches!(err, Error::RootDeletion), "{err}");
    assert_eq!(company.document_xml(), before);
}

#[test]
fn test_new_model_is_a_root() {
    let description = Description::new();
    assert!(description.proxy().is_root());
    assert!(matches!(description.delete(), Err(Error::RootDeletion)));
}

#[test]
fn test_delete_twice() {
    let company = company();
    let description = company.description().get().unwrap();
    description.delete().unwrap();
    let err = description.delete().unwrap_err();
    assert!(err.is_use_after_delete(), "{err}");
}

#[test]
fn test_reads_after_delete_are_permitted() {
    let company = company();
    let description = company.description().get().unwrap();
    description.delete().unwrap();

    assert_eq!(description.kind().get().as_deref(), Some("about"));
    assert_eq!(description.proxy().tag(), "description");
    assert!(description.proxy().parent().is_none());
    assert!(description.to_xml().starts_with("<description"));
}

#[test]
fn test_writes_after_delete_are_rejected() {
    let company = company();
    let description = company.description().get().unwrap();
    description.delete().unwrap();

    assert!(description.kind().set("history").unwrap_err().is_use_after_delete());
    assert!(description.kind().remove().unwrap_err().is_use_after_delete());
    assert_eq!(description.kind().get().as_deref(), Some("about"));

    let other = Company::new();
    let err = other.description().set(&description).unwrap_err();
    assert!(err.is_use_after_delete(), "{err}");
    assert!(!other.description().is_present());
}

xml_model! {
    /// The company root, seen through its office.
    pub struct Holding as "company" {
        has_one office: Office = "office";
    }
}

xml_model! {
    /// An office with its own locations.
    pub struct Office as "office" {
        has_many locations: Location = "location";
    }
}

#[test]
fn test_descendants_of_deleted_element_are_inert() {
    let holding = Holding::parse(COMPANY_XML).unwrap();
    let office = holding.office().get().unwrap();
    let beijing = office.locations().get(0).unwrap();
    office.delete().unwrap();

    assert!(beijing.proxy().is_deleted());
    assert_eq!(beijing.city().get().as_deref(), Some("Beijing"));
    assert!(beijing.city().set("Shanghai").unwrap_err().is_use_after_delete());
    assert!(beijing.delete().unwrap_err().is_use_after_delete());
}

#[test]
fn test_builders_on_deleted_owner_are_rejected() {
    let holding = Holding::parse(COMPANY_XML).unwrap();
    let office = holding.office().get().unwrap();
    office.delete().unwrap();

    let err = office.locations().build([("city", "Taipei")]).unwrap_err();
    assert!(err.is_use_after_delete(), "{err}");
    assert!(office
        .locations()
        .append(&Location::new())
        .unwrap_err()
        .is_use_after_delete());
    assert!(office.locations().list().clear().unwrap_err().is_use_after_delete());
    assert_eq!(office.locations().len(), 1);
    assert!(holding.office().get().is_none());
    assert!(!holding.to_xml().contains("Beijing"));
}

#[test]
fn test_replaced_child_is_inert() {
    let company = company();
    let old = company.description().get().unwrap();
    company.description().set(&Description::new()).unwrap();
    assert!(old.kind().set("x").unwrap_err().is_use_after_delete());
    assert_eq!(old.kind().get().as_deref(), Some("about"));
}

#[test]
fn test_deleted_member_cannot_be_reappended() {
    let company = company();
    let location = company.locations().remove_at(0).unwrap();
    let err = company.locations().append(&location).unwrap_err();
    assert!(err.is_use_after_delete(), "{err}");
    assert_eq!(company.locations().len(), 2);
}
