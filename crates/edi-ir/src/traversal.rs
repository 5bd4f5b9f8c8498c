//! Traversal and cursor APIs for navigating the message tree
//!
//! Lookups are expressed as tag paths. The first tag of a path always names
//! the node the cursor stands on; each following tag selects children by
//! their record tag.

use crate::node::Node;

/// A cursor standing on one node of the message tree
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    node: &'a Node,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given node
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }

    /// All nodes reached by a tag path whose first tag names this node.
    ///
    /// `["STX", "MHD"]` on a cursor standing on an `STX` node yields every
    /// `MHD` child in tree order. A mismatch anywhere yields nothing.
    pub fn get_loop(&self, tags: &[&str]) -> Vec<&'a Node> {
        let Some((first, rest)) = tags.split_first() else {
            return Vec::new();
        };
        if self.node.tag() != Some(*first) {
            return Vec::new();
        }
        let mut found = vec![self.node];
        for tag in rest {
            found = found
                .into_iter()
                .flat_map(|node| node.find_children(tag))
                .collect();
        }
        found
    }

    /// Value of `field` in the first node reached by a tag path.
    pub fn get_value(&self, tags: &[&str], field: &str) -> Option<&'a str> {
        self.get_loop(tags)
            .into_iter()
            .find_map(|node| node.field(field))
    }
}
