//! JSON codec backed by `serde_json`

use tracing::debug;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::node::{Array, Node, Object};

/// Configuration for JSON output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonConfig {
    /// Indent nested values instead of writing a single line
    pub pretty: bool,
}

impl JsonConfig {
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Decode JSON text into a node.
///
/// Numbers keep their textual form, booleans become `"true"`/`"false"` and
/// `null` becomes an empty scalar. Object key order is preserved.
pub fn decode(input: &str) -> Result<Node> {
    let value: serde_json::Value = serde_json::from_str(input).map_err(|err| {
        let pos = Pos::new(0, to_u32(err.line()), to_u32(err.column()));
        Error::at(ErrorKind::JsonParse, err.to_string(), pos)
    })?;
    debug!("decoded json document");
    Ok(from_json_value(value))
}

/// Encode a node as compact JSON; every scalar is written as a string
pub fn encode(node: &Node) -> Result<String> {
    encode_with_config(node, JsonConfig::default())
}

pub fn encode_with_config(node: &Node, config: JsonConfig) -> Result<String> {
    let result = if config.pretty {
        serde_json::to_string_pretty(node)
    } else {
        serde_json::to_string(node)
    };
    result.map_err(|err| Error::with_message(ErrorKind::Serialize, Span::empty(), err.to_string()))
}

fn from_json_value(value: serde_json::Value) -> Node {
    match value {
        serde_json::Value::Null => Node::from(""),
        serde_json::Value::Bool(b) => Node::from(b.to_string()),
        serde_json::Value::Number(n) => Node::from(n.to_string()),
        serde_json::Value::String(s) => Node::Scalar(s),
        serde_json::Value::Array(items) => {
            Node::Array(items.into_iter().map(from_json_value).collect::<Array>())
        }
        serde_json::Value::Object(map) => Node::Object(
            map.into_iter()
                .map(|(key, value)| (key, from_json_value(value)))
                .collect::<Object>(),
        ),
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
