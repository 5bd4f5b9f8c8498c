//! JSON rendering of message trees
//!
//! A message becomes `{ "<tag>": { fields..., "<child tag>": [ ... ] } }`.
//! Children are grouped per tag into arrays in tree order. The tree is only
//! read; nothing is removed from it while rendering. A child tag equal to a
//! field id of its parent cannot be represented and is an error.

use crate::{Error, Result};
use edi_ir::{BOTSID, Node};
use serde_json::{Map, Value};

/// Renders messages as JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    indented: bool,
}

impl JsonRenderer {
    pub fn new(indented: bool) -> Self {
        Self { indented }
    }

    /// JSON value for one message
    pub fn message_value(&self, node: &Node) -> Result<Value> {
        let tag = node.tag().unwrap_or_default();
        let mut message = Map::new();
        message.insert(tag.to_string(), Value::Object(node_object(node, tag)?));
        Ok(Value::Object(message))
    }

    /// Text for one message
    pub fn render(&self, node: &Node) -> Result<String> {
        self.to_text(&self.message_value(node)?)
    }

    /// Text for several messages, as a JSON array
    pub fn render_all(&self, nodes: &[&Node]) -> Result<String> {
        let values = nodes
            .iter()
            .map(|node| self.message_value(node))
            .collect::<Result<Vec<_>>>()?;
        self.to_text(&Value::Array(values))
    }

    fn to_text(&self, value: &Value) -> Result<String> {
        let text = if self.indented {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

fn node_object(node: &Node, path: &str) -> Result<Map<String, Value>> {
    let mut object: Map<String, Value> = node
        .record
        .iter()
        .filter(|(id, _)| id.as_str() != BOTSID)
        .map(|(id, value)| (id.clone(), Value::String(value.clone())))
        .collect();

    for child in &node.children {
        let tag = child.tag().unwrap_or_default();
        let child_path = format!("{path}/{tag}");
        let entry = object
            .entry(tag.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(items) = entry else {
            return Err(Error::tag_collision(path, tag));
        };
        items.push(Value::Object(node_object(child, &child_path)?));
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> Node {
        Node::with_tag("ORDER")
            .with_field("ID", "PO1")
            .with_child(Node::with_tag("LINE").with_field("SKU", "A"))
            .with_child(Node::with_tag("NOTE").with_field("TEXT", "rush"))
            .with_child(Node::with_tag("LINE").with_field("SKU", "B"))
    }

    #[test]
    fn test_children_grouped_by_tag() {
        let value = JsonRenderer::default().message_value(&order()).unwrap();

        assert_eq!(
            value,
            json!({
                "ORDER": {
                    "ID": "PO1",
                    "LINE": [{"SKU": "A"}, {"SKU": "B"}],
                    "NOTE": [{"TEXT": "rush"}]
                }
            })
        );
    }

    #[test]
    fn test_child_tag_equal_to_field_id_is_rejected() {
        let node = Node::with_tag("ORDER")
            .with_field("NOTE", "inline")
            .with_child(Node::with_tag("LINE").with_child(Node::with_tag("NOTE").with_field("TEXT", "rush")))
            .with_child(Node::with_tag("NOTE").with_field("TEXT", "lost"));

        let err = JsonRenderer::default().render(&node).unwrap_err();
        assert!(matches!(
            err,
            Error::TagCollision { ref path, ref tag } if path == "ORDER" && tag == "NOTE"
        ));
    }

    #[test]
    fn test_render_compact_and_indented() {
        let node = Node::with_tag("ORDER").with_field("ID", "PO1");

        assert_eq!(
            JsonRenderer::new(false).render(&node).unwrap(),
            r#"{"ORDER":{"ID":"PO1"}}"#
        );
        assert_eq!(
            JsonRenderer::new(true).render(&node).unwrap(),
            "{\n  \"ORDER\": {\n    \"ID\": \"PO1\"\n  }\n}"
        );
    }

    #[test]
    fn test_render_all_wraps_array() {
        let first = Node::with_tag("ORDER").with_field("ID", "1");
        let second = Node::with_tag("ORDER").with_field("ID", "2");

        assert_eq!(
            JsonRenderer::new(false).render_all(&[&first, &second]).unwrap(),
            r#"[{"ORDER":{"ID":"1"}},{"ORDER":{"ID":"2"}}]"#
        );
    }
}
