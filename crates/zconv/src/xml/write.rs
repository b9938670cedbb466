//! Node to XML tree mapping and serialization (encode side)

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result};
use crate::node::{Node, ATTRIBUTES_KEY, VALUE_KEY};
use crate::xml::model::{Content, Document, Element};
use crate::xml::parser::is_valid_name;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Build a document whose root element is named `root_tag` and holds `node`.
///
/// Array items and numeric keys directly under the root use `item_tag`, or
/// the root tag when none is given.
pub(crate) fn node_to_document(
    node: &Node,
    root_tag: &str,
    item_tag: Option<&str>,
) -> Result<Document> {
    check_name(root_tag)?;
    let mut root = Element::new(root_tag);
    fill_element(&mut root, node, item_tag.unwrap_or(root_tag))?;
    Ok(Document { root })
}

/// Populate `element` from `node`; `inherited` names children that have no
/// usable key of their own.
fn fill_element(element: &mut Element, node: &Node, inherited: &str) -> Result<()> {
    match node {
        Node::Scalar(text) => push_text(element, text),
        Node::Array(items) => {
            for item in items {
                let child = named_element(inherited, item)?;
                element.children.push(Content::Element(child));
            }
        }
        Node::Object(obj) => {
            if let Some(attrs) = obj.get(ATTRIBUTES_KEY) {
                element.attributes = attributes(attrs)?;
            }
            match obj.get(VALUE_KEY) {
                Some(Node::Scalar(text)) => push_text(element, text),
                Some(_) => {
                    return Err(Error::bare(ErrorKind::InvalidValue {
                        key: VALUE_KEY.to_string(),
                    }))
                }
                None => {}
            }

            for (key, value) in obj {
                if key == ATTRIBUTES_KEY || key == VALUE_KEY {
                    continue;
                }
                let name = if is_numeric_key(key) { inherited } else { key };
                match value {
                    Node::Array(items) => {
                        for item in items {
                            let child = named_element(name, item)?;
                            element.children.push(Content::Element(child));
                        }
                    }
                    _ => {
                        let child = named_element(name, value)?;
                        element.children.push(Content::Element(child));
                    }
                }
            }
        }
    }
    Ok(())
}

fn named_element(name: &str, node: &Node) -> Result<Element> {
    check_name(name)?;
    let mut element = Element::new(name);
    fill_element(&mut element, node, name)?;
    Ok(element)
}

fn push_text(element: &mut Element, text: &str) {
    if !text.is_empty() {
        element.children.push(Content::Text(text.to_string()));
    }
}

fn attributes(node: &Node) -> Result<IndexMap<String, String>> {
    let Node::Object(attrs) = node else {
        return Err(Error::bare(ErrorKind::InvalidAttributes));
    };

    let mut result = IndexMap::with_capacity(attrs.len());
    for (name, value) in attrs {
        check_name(name)?;
        let Node::Scalar(value) = value else {
            return Err(Error::bare(ErrorKind::InvalidAttributes));
        };
        result.insert(name.clone(), value.clone());
    }
    Ok(result)
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::bare(ErrorKind::InvalidName {
            name: name.to_string(),
        }))
    }
}

/// Keys such as `0`, `12` or `-1.5e3` that only make sense as positions
pub(crate) fn is_numeric_key(key: &str) -> bool {
    let starts_numeric = key
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'));
    let numeric_bytes = key
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'));
    starts_numeric && numeric_bytes && key.parse::<f64>().is_ok()
}

/// Serialize a document, optionally preceded by the XML declaration.
///
/// With `indent`, elements holding only child elements are laid out one
/// child per line; elements carrying text are kept on one line so their
/// text reads back unchanged.
pub(crate) fn serialize_document(doc: &Document, declaration: bool, indent: Option<usize>) -> String {
    let mut output = String::new();
    if declaration {
        output.push_str(DECLARATION);
        output.push('\n');
    }
    serialize_element(&doc.root, &mut output, indent, 0);
    output.push('\n');
    output
}

fn serialize_element(element: &Element, output: &mut String, indent: Option<usize>, level: usize) {
    output.push('<');
    output.push_str(&element.name);

    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }

    if element.children.is_empty() {
        output.push_str("/>");
        return;
    }
    output.push('>');

    let has_text = element
        .children
        .iter()
        .any(|child| matches!(child, Content::Text(_)));

    match indent {
        Some(width) if !has_text => {
            for child in element.elements() {
                output.push('\n');
                output.push_str(&" ".repeat(width * (level + 1)));
                serialize_element(child, output, indent, level + 1);
            }
            output.push('\n');
            output.push_str(&" ".repeat(width * level));
        }
        _ => {
            for child in &element.children {
                match child {
                    Content::Element(child) => serialize_element(child, output, None, level + 1),
                    Content::Text(text) => push_escaped_text(output, text),
                }
            }
        }
    }

    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

fn push_escaped_text(output: &mut String, text: &str) {
    // Whitespace-only text would be dropped on the way back in.
    if text.trim().is_empty() {
        output.push_str("<![CDATA[");
        output.push_str(text);
        output.push_str("]]>");
    } else {
        output.push_str(&escape_text(text));
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Object;

    fn encode(node: &Node, root: &str) -> Result<String> {
        let doc = node_to_document(node, root, None)?;
        Ok(serialize_document(&doc, false, None))
    }

    #[test]
    fn test_scalar_root() -> Result<()> {
        assert_eq!(encode(&Node::from("hi"), "r")?, "<r>hi</r>\n");
        Ok(())
    }

    #[test]
    fn test_array_values_become_siblings() -> Result<()> {
        let mut obj = Object::new();
        obj.insert("x", vec![Node::from("1"), Node::from("2")]);
        assert_eq!(encode(&Node::Object(obj), "r")?, "<r><x>1</x><x>2</x></r>\n");
        Ok(())
    }

    #[test]
    fn test_attributes_and_value() -> Result<()> {
        let mut inner = Object::new();
        inner.insert(ATTRIBUTES_KEY, [("id", "7"), ("q", "a\"b")].into_iter().collect::<Object>());
        inner.insert(VALUE_KEY, "text & more");
        inner.insert("child", "c");
        let mut obj = Object::new();
        obj.insert("item", inner);

        assert_eq!(
            encode(&Node::Object(obj), "r")?,
            "<r><item id=\"7\" q=\"a&quot;b\">text &amp; more<child>c</child></item></r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_root_attributes_apply_to_root() -> Result<()> {
        let mut obj = Object::new();
        obj.insert(ATTRIBUTES_KEY, [("a", "1")].into_iter().collect::<Object>());
        obj.insert(VALUE_KEY, "hi");
        assert_eq!(encode(&Node::Object(obj), "r")?, "<r a=\"1\">hi</r>\n");
        Ok(())
    }

    #[test]
    fn test_numeric_keys_use_inherited_name() -> Result<()> {
        let mut list = Object::new();
        list.insert("0", "a");
        list.insert("1", "b");
        let mut obj = Object::new();
        obj.insert("entry", list);
        assert_eq!(
            encode(&Node::Object(obj), "r")?,
            "<r><entry><entry>a</entry><entry>b</entry></entry></r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_signed_non_finite_keys_are_names() {
        let mut obj = Object::new();
        obj.insert("-inf", "a");
        let kind = encode(&Node::Object(obj), "r").err().map(|e| e.kind().clone());
        assert_eq!(
            kind,
            Some(ErrorKind::InvalidName {
                name: "-inf".to_string()
            })
        );
    }

    #[test]
    fn test_root_array_uses_item_tag() -> Result<()> {
        let rows = Node::from(vec![Node::from("a"), Node::from("b")]);
        let doc = node_to_document(&rows, "rows", Some("row"))?;
        assert_eq!(
            serialize_document(&doc, false, None),
            "<rows><row>a</row><row>b</row></rows>\n"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_reserved_values_fail_fast() {
        let mut obj = Object::new();
        obj.insert(ATTRIBUTES_KEY, "flat");
        assert_eq!(
            encode(&Node::Object(obj), "r").err().map(|e| e.kind().clone()),
            Some(ErrorKind::InvalidAttributes)
        );

        let mut obj = Object::new();
        obj.insert(VALUE_KEY, Object::new());
        assert!(matches!(
            encode(&Node::Object(obj), "r").err().map(|e| e.kind().clone()),
            Some(ErrorKind::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_names_fail_fast() {
        let mut obj = Object::new();
        obj.insert("has space", "x");
        assert!(matches!(
            encode(&Node::Object(obj), "r").err().map(|e| e.kind().clone()),
            Some(ErrorKind::InvalidName { .. })
        ));
        assert!(encode(&Node::from("x"), "1bad").is_err());
    }

    #[test]
    fn test_pretty_print_keeps_text_inline() -> Result<()> {
        let mut inner = Object::new();
        inner.insert(VALUE_KEY, "t");
        inner.insert("b", "1");
        let mut obj = Object::new();
        obj.insert("a", inner);
        obj.insert("c", "2");

        let doc = node_to_document(&Node::Object(obj), "r", None)?;
        assert_eq!(
            serialize_document(&doc, true, Some(2)),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r>\n  <a>t<b>1</b></a>\n  <c>2</c>\n</r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_whitespace_text_is_wrapped_in_cdata() -> Result<()> {
        assert_eq!(encode(&Node::from("  "), "r")?, "<r><![CDATA[  ]]></r>\n");
        Ok(())
    }

    #[test]
    fn test_numeric_key_detection() {
        assert!(is_numeric_key("0"));
        assert!(is_numeric_key("42"));
        assert!(is_numeric_key("-1.5"));
        assert!(is_numeric_key("1e5"));
        assert!(!is_numeric_key("inf"));
        assert!(!is_numeric_key("-inf"));
        assert!(!is_numeric_key("+nan"));
        assert!(!is_numeric_key("-infinity"));
        assert!(!is_numeric_key("-"));
        assert!(!is_numeric_key("item1"));
        assert!(!is_numeric_key(""));
    }
}
