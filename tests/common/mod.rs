//! Models and fixtures shared by the integration tests.

#![allow(dead_code)]

use lazy_xml_model::prelude::*;

pub const COMPANY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<company name="SUSE">
  <motto>Have a lot of fun</motto>
  <description type="about" foundingyear="1992" numberemployees="~1000" headquarters="Nuremberg" website="http://www.suse.com"/>
  <location city="Nuremberg" country="DE"/>
  <location city="Prague" country="CZ"/>
  <location city="Provo" country="US"/>
  <office>
    <location city="Beijing" country="CN"/>
  </office>
</company>
"#;

pub fn year(value: &str) -> Result<(), String> {
    match value.parse::<u16>() {
        Ok(y) if (1000..=9999).contains(&y) => Ok(()),
        _ => Err("expected a four digit year".to_string()),
    }
}

xml_model! {
    /// A company with a description and offices.
    pub struct Company as "company" {
        attribute name = "name";
        element motto = "motto";
        has_one description: Description = "description";
        has_many locations: Location = "location";
    }
}

xml_model! {
    /// What a company says about itself.
    pub struct Description as "description" {
        attribute kind = "type";
        attribute founding_year = "foundingyear", validate = year;
        attribute number_employees = "numberemployees";
        attribute headquarters = "headquarters";
        attribute website = "website";
    }
}

xml_model! {
    /// An office location.
    pub struct Location as "location" {
        attribute city = "city";
        attribute country = "country";
    }
}

xml_model! {
    /// A model without a declared root tag.
    pub struct CompanyBasic {
        has_one description: Description = "description";
    }
}

pub fn company() -> Company {
    Company::parse(COMPANY_XML).unwrap_or_else(|e| panic!("fixture failed to parse: {e}"))
}

pub fn cities(company: &Company) -> Vec<String> {
    company
        .locations()
        .iter()
        .map(|l| l.city().get().unwrap_or_default())
        .collect()
}
