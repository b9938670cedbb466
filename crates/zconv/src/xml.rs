//! XML codec
//!
//! Decoding maps an XML document onto a [`Node`] tree using the attribute /
//! text / repeated-sibling conventions described in [`read`]; encoding
//! applies the inverse rules.
//!
//! ```
//! use zconv::{xml, Node};
//! # fn main() -> Result<(), zconv::Error> {
//! let node = xml::decode("<r><x>1</x><x>2</x></r>")?;
//! let x = node.as_object().and_then(|obj| obj.get("x"));
//! assert_eq!(x, Some(&Node::from(vec![Node::from("1"), Node::from("2")])));
//!
//! let text = xml::encode(&node, "r")?;
//! assert_eq!(xml::decode(&text)?, node);
//! # Ok(())
//! # }
//! ```

pub mod model;
pub mod parser;
pub mod read;
pub mod write;

pub use model::{Content, Document, Element};
pub use parser::{Parser, DEFAULT_MAX_DEPTH};

use tracing::{debug, warn};

use crate::error::Result;
use crate::node::{Node, Object};

/// Configuration for the XML codec
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlConfig {
    /// Drop the document element when decoding and return its content.
    /// When false, decoding yields `{root_tag: content}` and encoding
    /// expects that same single-key shape.
    pub unwrap_root: bool,
    /// Tag for array items and numeric keys directly under the root
    /// (defaults to the root tag)
    pub item_tag: Option<String>,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
    /// Pretty-print with this many spaces per level
    pub indent: Option<usize>,
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: u16,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            unwrap_root: true,
            item_tag: None,
            declaration: true,
            indent: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XmlConfig {
    pub fn with_item_tag(mut self, tag: impl Into<String>) -> Self {
        self.item_tag = Some(tag.into());
        self
    }

    pub const fn with_indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    pub const fn without_declaration(mut self) -> Self {
        self.declaration = false;
        self
    }

    pub const fn keep_root(mut self) -> Self {
        self.unwrap_root = false;
        self
    }
}

/// A decoded document together with the tag of its document element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub root: String,
    pub node: Node,
}

/// Decode XML text with the default configuration
pub fn decode(input: &str) -> Result<Node> {
    decode_document(input, &XmlConfig::default()).map(|decoded| decoded.node)
}

/// Decode XML text, keeping the name of the document element
pub fn decode_document(input: &str, config: &XmlConfig) -> Result<Decoded> {
    let mut parser = Parser::with_max_depth(input.as_bytes(), config.max_depth);
    let doc = parser.parse()?;
    let content = read::element_to_node(&doc.root);
    debug!(root = %doc.root.name, "decoded xml document");

    let node = if config.unwrap_root {
        content
    } else {
        let mut wrapper = Object::new();
        wrapper.insert(doc.root.name.clone(), content);
        Node::Object(wrapper)
    };

    Ok(Decoded {
        root: doc.root.name,
        node,
    })
}

/// Decode XML text, returning the `{"xml_error": "true"}` marker instead of
/// an error when the markup is malformed
pub fn decode_or_sentinel(input: &str, config: &XmlConfig) -> Node {
    match decode_document(input, config) {
        Ok(decoded) => decoded.node,
        Err(err) => {
            warn!(error = %err, "malformed xml, returning error marker");
            Node::xml_error()
        }
    }
}

/// Encode a node as an XML document with the default configuration
pub fn encode(node: &Node, root_tag: &str) -> Result<String> {
    encode_with_config(node, root_tag, &XmlConfig::default())
}

/// Encode a node as an XML document
pub fn encode_with_config(node: &Node, root_tag: &str, config: &XmlConfig) -> Result<String> {
    let (root_tag, body) = match (config.unwrap_root, node) {
        (false, Node::Object(obj)) if obj.len() == 1 => match obj.iter().next() {
            Some((tag, body)) => (tag.as_str(), body),
            None => (root_tag, node),
        },
        _ => (root_tag, node),
    };

    let doc = write::node_to_document(body, root_tag, config.item_tag.as_deref())?;
    debug!(root = %root_tag, "encoded xml document");
    Ok(write::serialize_document(
        &doc,
        config.declaration,
        config.indent,
    ))
}
