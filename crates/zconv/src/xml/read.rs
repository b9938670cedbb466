//! XML tree to node mapping (decode side)

use crate::node::{Node, Object, ATTRIBUTES_KEY, VALUE_KEY};
use crate::xml::model::Element;

/// Map one element (and its subtree) onto a node.
///
/// - attributes land under `@attributes`, in document order
/// - an element whose only content is text becomes a bare scalar, or
///   `_value` next to `@attributes` when it has attributes
/// - text mixed with child elements is concatenated into `_value`
/// - children sharing a tag name are collected into an array
pub(crate) fn element_to_node(element: &Element) -> Node {
    let mut obj = Object::new();

    if !element.attributes.is_empty() {
        let attrs: Object = element
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), Node::from(value.as_str())))
            .collect();
        obj.insert(ATTRIBUTES_KEY, attrs);
    }

    if let Some(text) = element.sole_text() {
        if obj.is_empty() {
            return Node::from(text);
        }
        obj.insert(VALUE_KEY, text);
        return Node::Object(obj);
    }

    let text = element.text();
    if !text.is_empty() {
        obj.insert(VALUE_KEY, text);
    }

    for child in element.elements() {
        let value = element_to_node(child);
        // Decoded elements are never arrays, so an array here is a group
        // started by an earlier sibling.
        match obj.get_mut(&child.name) {
            Some(Node::Array(group)) => group.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Node::from(vec![first, value]);
            }
            None => {
                obj.insert(child.name.clone(), value);
            }
        }
    }

    Node::Object(obj)
}
