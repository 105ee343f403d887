//! HTML fragment to node-tree conversion.
//!
//! The builder parses a fragment and descends the resulting DOM directly,
//! producing a [`NodeChild`] sequence in exact document order. The
//! normalization pipeline runs once, at the top-level entry point; recursion
//! into children operates on the already-filtered tree.
//!
//! # Example
//!
//! ```rust
//! use telepress_core::html_to_nodes;
//!
//! let nodes = html_to_nodes("<p>Hello <strong>World</strong>!</p>");
//! let json = serde_json::to_string(&nodes).unwrap();
//! assert_eq!(
//!     json,
//!     r#"[{"tag":"p","children":["Hello ",{"tag":"strong","children":["World"]},"!"]}]"#
//! );
//! ```

use scraper::Html;

use crate::node::{Node, NodeChild};
use crate::normalize::normalize_html;

/// Converts an HTML fragment into a Telegraph content tree.
///
/// The fragment is run through the full rewrite pipeline first, then parsed
/// and walked recursively. Pure and side-effect-free: identical input always
/// produces an identical tree.
pub fn html_to_nodes(html: &str) -> Vec<NodeChild> {
    html_to_nodes_raw(&normalize_html(html))
}

/// Converts an HTML fragment into a content tree without normalizing it.
///
/// Useful for content that has already been filtered to supported tags and
/// attributes; arbitrary input belongs in [`html_to_nodes`] instead.
pub fn html_to_nodes_raw(html: &str) -> Vec<NodeChild> {
    let fragment = Html::parse_fragment(html);
    build_children(*fragment.root_element())
}

fn build_children(parent: ego_tree::NodeRef<'_, scraper::Node>) -> Vec<NodeChild> {
    let mut children = Vec::new();

    for child in parent.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                // Surrounding newlines are parser artifacts; inner whitespace
                // is significant. Empty results stay in — callers filter them
                // during wire serialization.
                children.push(NodeChild::Text(text.trim_matches('\n').to_string()));
            }
            scraper::Node::Element(el) => {
                children.push(NodeChild::Element(Node {
                    tag: el.name().to_lowercase(),
                    attrs: el
                        .attrs()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                    children: build_children(child),
                }));
            }
            _ => {}
        }
    }

    children
}
