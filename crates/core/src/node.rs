//! Telegraph DOM node model.
//!
//! This module defines the [`Node`] and [`NodeChild`] types that make up a
//! Telegraph content tree, plus [`serialize_nodes`] for producing the exact
//! JSON shape the API expects.
//!
//! # Example
//!
//! ```rust
//! use telepress_core::{Node, NodeChild};
//!
//! let paragraph = Node::with_children("p", vec![NodeChild::text("Hello")]);
//! assert_eq!(paragraph.tag, "p");
//! assert_eq!(paragraph.children.len(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// A single element in a Telegraph content tree.
///
/// On the wire a Node is a JSON object with a `tag`, an optional `attrs`
/// object and an optional `children` array. An empty attribute map or child
/// list is omitted during serialization, and an omitted field deserializes
/// back to the empty collection, so trees survive a round trip through the
/// API unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Name of the DOM element.
    pub tag: String,

    /// Attributes of the DOM element.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    /// Child nodes, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeChild>,
}

/// One entry in a node's child list: either raw text or a nested element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeChild {
    /// A raw text leaf, serialized as a bare JSON string.
    Text(String),
    /// A nested element.
    Element(Node),
}

impl Node {
    /// Creates a node with no attributes and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attrs: BTreeMap::new(), children: Vec::new() }
    }

    /// Creates a node with the given children.
    pub fn with_children(tag: impl Into<String>, children: Vec<NodeChild>) -> Self {
        Self { tag: tag.into(), attrs: BTreeMap::new(), children }
    }

    /// Adds an attribute, replacing any previous value for the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Appends a child.
    pub fn child(mut self, child: impl Into<NodeChild>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl NodeChild {
    /// Creates a text child.
    pub fn text(value: impl Into<String>) -> Self {
        NodeChild::Text(value.into())
    }

    /// Returns the text content if this child is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeChild::Text(text) => Some(text),
            NodeChild::Element(_) => None,
        }
    }

    /// Returns the node if this child is an element.
    pub fn as_element(&self) -> Option<&Node> {
        match self {
            NodeChild::Text(_) => None,
            NodeChild::Element(node) => Some(node),
        }
    }
}

impl From<Node> for NodeChild {
    fn from(node: Node) -> Self {
        NodeChild::Element(node)
    }
}

impl From<&str> for NodeChild {
    fn from(text: &str) -> Self {
        NodeChild::Text(text.to_string())
    }
}

impl From<String> for NodeChild {
    fn from(text: String) -> Self {
        NodeChild::Text(text)
    }
}

/// Converts a content tree into the wire form expected by the API.
///
/// Text elements become bare JSON strings, with empty strings dropped;
/// element nodes become their `{tag, attrs?, children?}` objects without any
/// further transformation. This is the inverse of the tree builder's output
/// shape, not of the rewrite pipeline (rewriting is lossy).
pub fn serialize_nodes(nodes: &[NodeChild]) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(nodes.len());
    for child in nodes {
        match child {
            NodeChild::Text(text) => {
                if !text.is_empty() {
                    values.push(Value::String(text.clone()));
                }
            }
            NodeChild::Element(node) => values.push(serde_json::to_value(node)?),
        }
    }
    Ok(values)
}
