//! Indented dump of the whole scene graph, hidden nodes included.

use std::fmt::Write;

use drafter_core::{Entity, Node};

pub(super) fn render(root: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0);
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{}", node.feature().unwrap_or("node"));
    if !node.name().is_empty() {
        let _ = write!(out, " {:?}", node.name());
    }
    if node.is_hidden() {
        out.push_str(" (hidden)");
    }
    if node.z() != 0.0 {
        let _ = write!(out, " z={}", node.z());
    }
    out.push('\n');

    for entity in node.entities() {
        let _ = writeln!(out, "{indent}  - {}", describe(entity));
    }
    for (key, value) in node.attributes() {
        let _ = writeln!(out, "{indent}  @{key} = {value}");
    }
    for child in node.children() {
        write_node(out, child, depth + 1);
    }
}

fn describe(entity: &Entity) -> String {
    match entity {
        Entity::Point { position } => format!("point ({}, {})", position.x(), position.y()),
        Entity::Segment { start, end } => format!(
            "segment ({}, {}) -> ({}, {})",
            start.x(),
            start.y(),
            end.x(),
            end.y()
        ),
        Entity::Circle { center, radius } => {
            format!("circle ({}, {}) r={radius}", center.x(), center.y())
        }
        Entity::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => format!(
            "arc ({}, {}) r={radius} {:.1}deg..{:.1}deg",
            center.x(),
            center.y(),
            start_angle.to_degrees(),
            end_angle.to_degrees()
        ),
        Entity::Polycurve(curve) => format!(
            "polycurve {} vertices{}",
            curve.vertices().len(),
            if curve.is_closed() { ", closed" } else { "" }
        ),
        Entity::Polyface(face) => format!("polyface {} holes", face.holes().len()),
        Entity::Text { content, .. } => format!("text {content:?}"),
    }
}

#[cfg(test)]
mod tests {
    use drafter_core::{
        entity::{Polycurve, Polyface},
        geometry::Point,
    };

    use super::*;

    #[test]
    fn test_dump_includes_hidden_nodes() {
        let mut hidden = Node::with_entities([Entity::Circle {
            center: Point::new(1.0, 2.0),
            radius: 3.0,
        }])
        .with_name("hole");
        hidden.set_hidden(true);
        let root = Node::new().with_child(hidden);

        assert_eq!(
            render(&root),
            "node\n  node \"hole\" (hidden)\n    - circle (1, 2) r=3\n"
        );
    }

    #[test]
    fn test_dump_shows_draw_order_and_faces() {
        let outer = Polycurve::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)],
            true,
        );
        let mut node = Node::with_entities([Entity::Polyface(Polyface::new(vec![outer]))]);
        node.set_z(2.0);

        assert_eq!(render(&node), "node z=2\n  - polyface 0 holes\n");
    }
}
