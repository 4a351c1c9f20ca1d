//! XML reading and writing for case documents.
//!
//! - element and attribute names are stored without namespace prefixes
//! - `xmlns` declarations are dropped on read and the configured namespace is
//!   written back on the root element
//! - whitespace-only text is ignored; other text is trimmed
//! - output is indented, one element per line, attributes in stored order

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::CoreConfig;
use crate::document::element::Element;
use crate::errors::{CaseError, CaseResult};

/// Parse a full document or a fragment into its root element.
pub fn parse_element(xml: &str, cfg: &CoreConfig) -> CaseResult<Element> {
    if xml.len() > cfg.limits.max_document_bytes {
        return Err(CaseError::invalid_argument(format!(
            "document is {} bytes, limit is {}",
            xml.len(),
            cfg.limits.max_document_bytes
        )));
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() >= cfg.limits.max_depth {
                    return Err(CaseError::invalid_argument(format!(
                        "document nesting exceeds {} levels",
                        cfg.limits.max_depth
                    )));
                }
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                let el = open_element(&start)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| CaseError::xml("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                append_text(&mut stack, text.trim())?;
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = std::str::from_utf8(&raw).map_err(CaseError::xml)?;
                append_text(&mut stack, text.trim())?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(CaseError::xml("unexpected end of document"));
    }
    root.ok_or_else(|| CaseError::xml("document has no root element"))
}

fn open_element(start: &BytesStart<'_>) -> CaseResult<Element> {
    let tag = std::str::from_utf8(start.local_name().as_ref())
        .map_err(CaseError::xml)?
        .to_string();
    let mut el = Element::new(tag);

    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key;
        if key.as_ref() == b"xmlns" || key.prefix().map(|p| p.as_ref() == b"xmlns").unwrap_or(false) {
            continue;
        }
        let name = std::str::from_utf8(key.local_name().as_ref())
            .map_err(CaseError::xml)?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        el.set_attribute(name, value);
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) -> CaseResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(el);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        None => Err(CaseError::xml("multiple root elements")),
    }
}

fn append_text(stack: &mut [Element], text: &str) -> CaseResult<()> {
    if text.is_empty() {
        return Ok(());
    }
    let top = stack
        .last_mut()
        .ok_or_else(|| CaseError::xml("text outside of the root element"))?;
    let joined = match top.has_text() {
        true => format!("{}{}", top.text(), text),
        false => text.to_string(),
    };
    top.set_text(joined);
    Ok(())
}

/// Serialize a document root, adding the XML declaration and namespace.
pub fn write_document(root: &Element, cfg: &CoreConfig) -> String {
    let mut out = String::from("<?xml version='1.0' encoding='UTF-8'?>\n");
    write_node(&mut out, root, 0, cfg.document.indent, Some(&cfg.document.namespace));
    out
}

/// Serialize a subtree without declaration or namespace.
pub fn write_fragment(el: &Element, indent: usize) -> String {
    let mut out = String::new();
    write_node(&mut out, el, 0, indent, None);
    out
}

fn write_node(out: &mut String, el: &Element, level: usize, indent: usize, namespace: Option<&str>) {
    let pad = " ".repeat(level * indent);
    out.push_str(&pad);
    out.push('<');
    out.push_str(el.tag());
    if let Some(ns) = namespace {
        out.push_str(&format!(" xmlns=\"{}\"", escape(ns)));
    }
    for (k, v) in el.attributes() {
        out.push_str(&format!(" {k}=\"{}\"", escape(v)));
    }

    if el.children().is_empty() {
        if el.has_text() {
            out.push('>');
            out.push_str(&escape(el.text()));
            out.push_str(&format!("</{}>\n", el.tag()));
        } else {
            out.push_str("/>\n");
        }
        return;
    }

    out.push_str(">\n");
    if el.has_text() && !el.text().is_empty() {
        out.push_str(&" ".repeat((level + 1) * indent));
        out.push_str(&escape(el.text()));
        out.push('\n');
    }
    for child in el.children() {
        write_node(out, child, level + 1, indent, None);
    }
    out.push_str(&pad);
    out.push_str(&format!("</{}>\n", el.tag()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_namespace_and_whitespace() {
        let xml = r#"<?xml version="1.0"?>
<configuration xmlns="http://www.baramcfd.org/baram" version="3">
  <general>
    <timeTransient> false </timeTransient>
    <empty/>
  </general>
</configuration>"#;
        let root = parse_element(xml, &CoreConfig::default()).unwrap();
        assert_eq!(root.tag(), "configuration");
        assert_eq!(root.attribute("version"), Some("3"));
        assert_eq!(root.attribute("xmlns"), None);
        let general = root.child("general").unwrap();
        assert_eq!(general.child_text("timeTransient"), Some("false"));
        assert!(!general.child("empty").unwrap().has_text());
    }

    #[test]
    fn write_then_parse_is_stable() {
        let el = Element::new("configuration")
            .with_attribute("version", "6")
            .with_child(Element::leaf("name", "a < b & \"c\""))
            .with_child(Element::new("list"));
        let cfg = CoreConfig::default();
        let text = write_document(&el, &cfg);
        assert!(text.contains("xmlns=\"http://www.baramcfd.org/baram\""));
        let back = parse_element(&text, &cfg).unwrap();
        assert_eq!(back, el);
        assert_eq!(write_document(&back, &cfg), text);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_depth = 2;
        let e = parse_element("<a><b><c/></b></a>", &cfg);
        assert!(e.is_ok());
        let e = parse_element("<a><b><c><d/></c></b></a>", &cfg).unwrap_err();
        assert!(e.to_string().contains("nesting"));
    }

    #[test]
    fn rejects_unbalanced_input() {
        assert!(parse_element("<a><b></a>", &CoreConfig::default()).is_err());
        assert!(parse_element("", &CoreConfig::default()).is_err());
    }
}
