//! Node types for the message tree
#![allow(clippy::must_use_candidate)] // Builder/constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved record key holding the tag of the grammar record a node matches.
pub const BOTSID: &str = "BOTSID";

/// Flat mapping of field identifier to raw field content.
pub type Record = BTreeMap<String, String>;

/// A node in the message tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Field values of this node, keyed by field identifier
    #[serde(default)]
    pub record: Record,

    /// Child nodes, already in output order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty node (no record content, no children)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node for the given record tag
    pub fn with_tag(tag: impl Into<String>) -> Self {
        let mut record = Record::new();
        record.insert(BOTSID.to_string(), tag.into());
        Self {
            record,
            children: Vec::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with_field(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.insert(id.into(), value.into());
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Record tag of this node, with surrounding whitespace removed
    pub fn tag(&self) -> Option<&str> {
        self.record.get(BOTSID).map(|tag| tag.trim())
    }

    /// Raw value of a field
    pub fn field(&self, id: &str) -> Option<&str> {
        self.record.get(id).map(String::as_str)
    }

    /// True when the node carries any record content
    pub fn has_content(&self) -> bool {
        !self.record.is_empty()
    }

    /// Find all children with the given record tag
    pub fn find_children(&self, tag: &str) -> Vec<&Node> {
        self.children
            .iter()
            .filter(|c| c.tag() == Some(tag))
            .collect()
    }
}
