//! Structured output of the visible scene graph.

use drafter_core::Node;

/// Copy of `node` without its hidden descendants, or `None` if `node` itself
/// is hidden.
fn visible(node: &Node) -> Option<Node> {
    if node.is_hidden() {
        return None;
    }
    let mut copy = node.clone();
    *copy.children_mut() = node.children().iter().filter_map(visible).collect();
    Some(copy)
}

pub(super) fn render(root: &Node, pretty: bool) -> Result<String, serde_json::Error> {
    let tree = visible(root);
    if pretty {
        serde_json::to_string_pretty(&tree)
    } else {
        serde_json::to_string(&tree)
    }
}

#[cfg(test)]
mod tests {
    use drafter_core::{Entity, geometry::Point};
    use serde_json::{Value, json};

    use super::*;

    fn point(x: f64, y: f64) -> Node {
        Node::with_entities([Entity::Point {
            position: Point::new(x, y),
        }])
    }

    #[test]
    fn test_hidden_children_are_pruned() {
        let mut hidden = point(5.0, 5.0).with_name("secret");
        hidden.set_hidden(true);
        let root = Node::new()
            .with_name("root")
            .with_child(point(1.0, 2.0))
            .with_child(hidden);

        let out: Value = serde_json::from_str(&render(&root, false).unwrap()).unwrap();
        assert_eq!(out["name"], json!("root"));
        let children = out["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0]["entities"][0],
            json!({"type": "point", "position": {"x": 1.0, "y": 2.0}})
        );
        assert!(!out.to_string().contains("secret"));
    }

    #[test]
    fn test_hidden_root() {
        let mut root = point(0.0, 0.0);
        root.set_hidden(true);
        assert_eq!(render(&root, true).unwrap(), "null");
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let out = render(&point(0.0, 0.0), true).unwrap();
        assert!(out.contains("\n  \"id\""), "{out}");
    }
}
