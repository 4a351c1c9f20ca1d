//! Default-valued templates for new cases and new entities.
//!
//! The XML lives under `resources/` and is compiled into the binary.

use crate::config::CoreConfig;
use crate::document::{xml, CaseDocument, Element};
use crate::errors::CaseResult;

const CASE_XML: &str = include_str!("../resources/case.xml");
const REGION_XML: &str = include_str!("../resources/region.xml");
const MATERIAL_XML: &str = include_str!("../resources/material.xml");
const BOUNDARY_CONDITION_XML: &str = include_str!("../resources/boundary_condition.xml");

/// A fresh case at the current schema version, with one material and no regions.
pub fn new_case() -> CaseResult<CaseDocument> {
    CaseDocument::from_xml_str(CASE_XML)
}

fn fragment(xml_text: &str) -> CaseResult<Element> {
    xml::parse_element(xml_text, &CoreConfig::default())
}

pub fn region(name: &str, material: u64) -> CaseResult<Element> {
    let mut el = fragment(REGION_XML)?;
    if let Some(n) = el.child_mut("name") {
        n.set_text(name);
    }
    if let Some(m) = el.child_mut("material") {
        m.set_text(material.to_string());
    }
    Ok(el)
}

pub fn material(name: &str) -> CaseResult<Element> {
    let mut el = fragment(MATERIAL_XML)?;
    if let Some(n) = el.child_mut("name") {
        n.set_text(name);
    }
    Ok(el)
}

pub fn boundary_condition(name: &str, physical_type: &str, geometrical_type: &str) -> CaseResult<Element> {
    let mut el = fragment(BOUNDARY_CONDITION_XML)?;
    for (tag, value) in [
        ("name", name),
        ("physicalType", physical_type),
        ("geometricalType", geometrical_type),
    ] {
        if let Some(n) = el.child_mut(tag) {
            n.set_text(value);
        }
    }
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::CURRENT_VERSION;

    #[test]
    fn case_template_is_current() {
        let doc = new_case().unwrap();
        assert_eq!(doc.version().unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn entity_templates_parse() {
        assert_eq!(region("fluid", 1).unwrap().child_text("name"), Some("fluid"));
        assert_eq!(material("water").unwrap().child_text("phase"), Some("gas"));
        let bc = boundary_condition("inlet", "velocityInlet", "patch").unwrap();
        assert_eq!(bc.child_text("physicalType"), Some("velocityInlet"));
        assert!(bc.descend(&["wall", "velocity", "type"]).is_some());
    }
}
