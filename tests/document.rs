//! The document facade: parsing, wrapping, options, and serialization.

#![allow(clippy::unwrap_used)]

mod common;

use common::{company, Company, CompanyBasic, Description, COMPANY_XML};
use lazy_xml_model::parser::ParseOptions;
use lazy_xml_model::prelude::*;
use lazy_xml_model::serial::SerializeOptions;
use lazy_xml_model::{Document, Error};

#[test]
fn test_root_tags() {
    assert_eq!(Company::new().to_xml(), "<company/>");
    assert_eq!(Description::new().to_xml(), "<description/>");
    assert_eq!(CompanyBasic::new().to_xml(), "<companybasic/>");
    let renamed = Company::with_options(&ModelOptions::default().root_tag("firm")).unwrap();
    assert_eq!(renamed.to_xml(), "<firm/>");
}

#[test]
fn test_malformed_document() {
    for input in ["", "<company>", "<company></firm>", "<a/><b/>", "<a x=\"1\" x=\"2\"/>"] {
        let err = Company::parse(input).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)), "{input:?}: {err}");
    }
}

#[test]
fn test_malformed_document_location() {
    let err = Company::parse("<company>\n  <description>\n</company>").unwrap_err();
    let Error::MalformedDocument(parse) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(parse.location.line, 3);
}

#[test]
fn test_depth_limit() {
    let options = ModelOptions::default().parse(ParseOptions::default().max_depth(2));
    assert!(Company::parse_with_options("<company><a/></company>", &options).is_ok());
    assert!(Company::parse_with_options("<company><a><b/></a></company>", &options).is_err());
}

#[test]
fn test_parse_bytes_with_declared_encoding() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><company name=\"M\xFCnchen AG\"/>";
    let company = Company::parse_bytes(bytes).unwrap();
    assert_eq!(company.name().get().as_deref(), Some("M\u{fc}nchen AG"));
}

#[test]
fn test_from_document() {
    let doc = Document::parse_str("<company name=\"SUSE\"/>").unwrap();
    let company = Company::from_document(doc).unwrap();
    assert_eq!(company.name().get().as_deref(), Some("SUSE"));
    assert!(matches!(
        Company::from_document(Document::new()),
        Err(Error::MissingRootElement)
    ));
}

#[test]
fn test_from_node_shares_the_document() {
    let company = company();
    let node = company.description().get().unwrap().proxy().node_id();
    let description = Description::from_node(company.proxy().document(), node);
    description.kind().set("history").unwrap();
    assert_eq!(
        company.description().get().unwrap().kind().get().as_deref(),
        Some("history")
    );
}

#[test]
fn test_to_xml_of_child_is_independent_of_ancestry() {
    let company = company();
    let description = company.description().get().unwrap();
    let xml = description.to_xml();
    assert!(xml.starts_with("<description type=\"about\""));
    assert!(!xml.starts_with(' '));
    assert!(company.to_xml().contains(&xml));
}

#[test]
fn test_nested_child_xml_is_reindented() {
    let company = Company::parse("<company><description><line/></description></company>").unwrap();
    let description = company.description().get().unwrap();
    assert_eq!(description.to_xml(), "<description>\n  <line/>\n</description>");
    assert_eq!(
        company.to_xml(),
        "<company>\n  <description>\n    <line/>\n  </description>\n</company>"
    );
    assert!(!company.to_xml().contains(&description.to_xml()));
}

#[test]
fn test_document_xml() {
    let company = Company::new();
    company.name().set("SUSE").unwrap();
    assert_eq!(
        company.document_xml(),
        "<?xml version=\"1.0\"?>\n<company name=\"SUSE\"/>\n"
    );
}

#[test]
fn test_serialize_options_are_carried() {
    let options = ModelOptions::default()
        .serialize(SerializeOptions::default().indent(false).declaration(false));
    let company = Company::parse_with_options(COMPANY_XML, &options).unwrap();
    let xml = company.document_xml();
    assert!(xml.starts_with("<company name=\"SUSE\"><motto>"), "{xml}");
    assert!(xml.ends_with("</company>\n"), "{xml}");
    assert_eq!(xml.matches('\n').count(), 1);
}

#[test]
fn test_structural_round_trip() {
    let company = company();
    company.locations().build([("city", "Taipei")]).unwrap();
    company.description().get().unwrap().delete().unwrap();

    let reparsed = Company::parse(&company.document_xml()).unwrap();
    assert_eq!(reparsed.to_xml(), company.to_xml());
    assert_eq!(reparsed.locations().len(), 4);
    assert!(reparsed.description().get().is_none());
}

#[test]
fn test_untyped_root_proxy() {
    let shared = SharedDocument::new(Document::parse_str(COMPANY_XML).unwrap());
    let root = ObjectProxy::root_of(shared.clone()).unwrap();
    assert_eq!(root.tag(), "company");
    assert_eq!(root.attribute("name").as_deref(), Some("SUSE"));
    assert!(root.is_root());
    assert_eq!(root.document(), shared);
}

#[test]
fn test_invalid_root_tags_are_rejected() {
    for tag in ["", "my firm", "9lives"] {
        let err = Company::with_options(&ModelOptions::default().root_tag(tag)).unwrap_err();
        assert!(err.is_invalid_name(), "{tag:?}: {err}");
    }
    assert!(ObjectProxy::new_root("two words").is_err());
}
