//! SVG rendering of a scene graph.

use std::{f64::consts::PI, fmt::Write};

use log::trace;
use svg::{self, node::element as svg_element};

use drafter_core::{
    Entity, Node,
    entity::{Polycurve, bulge_arc},
    geometry::{Bounds, Point},
    style::Style,
};

use super::Settings;

type SvgNode = Box<dyn svg::Node>;

/// Render every visible node of `root` into an SVG document.
pub(super) fn render(root: &Node, settings: &Settings) -> String {
    let bounds = visible_bounds(root);
    let view = if bounds.is_empty() {
        Bounds::from_point(Point::new(0.0, 0.0)).inflate(settings.padding)
    } else {
        bounds.inflate(settings.padding)
    };

    let writer = Writer { settings };
    let mut doc = svg::Document::new()
        .set(
            "viewBox",
            format!(
                "{} {} {} {}",
                writer.num(view.min_x()),
                writer.num(view.min_y()),
                writer.num(view.width()),
                writer.num(view.height())
            ),
        )
        .set("width", writer.num(view.width()))
        .set("height", writer.num(view.height()));

    if let Some(background) = &settings.background {
        doc = doc.add(
            svg_element::Rectangle::new()
                .set("x", writer.num(view.min_x()))
                .set("y", writer.num(view.min_y()))
                .set("width", writer.num(view.width()))
                .set("height", writer.num(view.height()))
                .set("fill", background),
        );
    }

    if let Some(group) = writer.node(root, &Style::default()) {
        doc = doc.add(group);
    }
    doc.to_string()
}

/// Bounds of every entity outside hidden subtrees.
fn visible_bounds(node: &Node) -> Bounds {
    if node.is_hidden() {
        return Bounds::default();
    }
    let own = node
        .entities()
        .iter()
        .fold(Bounds::default(), |acc, entity| acc.merge(&entity.bounds()));
    node.children()
        .iter()
        .fold(own, |acc, child| acc.merge(&visible_bounds(child)))
}

struct Writer<'a> {
    settings: &'a Settings,
}

impl Writer<'_> {
    /// Format a number with the configured precision, without trailing zeros.
    fn num(&self, value: f64) -> String {
        let text = format!("{:.*}", self.settings.precision, value);
        let text = if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.')
        } else {
            &text
        };
        match text {
            "-0" => "0".to_string(),
            other => other.to_string(),
        }
    }

    fn point(&self, p: Point) -> String {
        format!("{} {}", self.num(p.x()), self.num(p.y()))
    }

    /// Render `node` and its visible descendants as a group, or `None` if
    /// nothing in the subtree draws.
    fn node(&self, node: &Node, parent: &Style) -> Option<svg_element::Group> {
        if node.is_hidden() {
            trace!(id:% = node.id(); "Skipping hidden node");
            return None;
        }
        let style = node.style().inherit(parent);

        let mut group = svg_element::Group::new();
        let mut empty = true;
        for entity in node.entities() {
            group = group.add(self.entity(entity, &style));
            empty = false;
        }
        for child in node.children_by_z() {
            if let Some(child) = self.node(child, &style) {
                group = group.add(child);
                empty = false;
            }
        }
        if empty {
            return None;
        }

        if let Some(feature) = node.feature() {
            group = group.set("data-feature", feature);
        }
        if !node.name().is_empty() {
            group = group.set("data-name", node.name());
        }
        // Group opacity compounds, so only the node that sets it writes it.
        if let Some(opacity) = node.style().opacity {
            group = group.set("opacity", opacity);
        }
        Some(group)
    }

    fn entity(&self, entity: &Entity, style: &Style) -> SvgNode {
        match entity {
            Entity::Point { position } => {
                let path = svg_element::Path::new()
                    .set("d", format!("M {} h 0", self.point(*position)))
                    .set("stroke-linecap", "round");
                Box::new(self.stroked(path, style, false))
            }
            Entity::Segment { start, end } => {
                let path = svg_element::Path::new().set(
                    "d",
                    format!("M {} L {}", self.point(*start), self.point(*end)),
                );
                Box::new(self.stroked(path, style, false))
            }
            Entity::Circle { center, radius } => {
                let circle = svg_element::Circle::new()
                    .set("cx", self.num(center.x()))
                    .set("cy", self.num(center.y()))
                    .set("r", self.num(*radius));
                Box::new(self.stroked(circle, style, true))
            }
            Entity::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let path = svg_element::Path::new().set(
                    "d",
                    self.arc_data(*center, *radius, *start_angle, *end_angle),
                );
                Box::new(self.stroked(path, style, false))
            }
            Entity::Polycurve(curve) => {
                let path = svg_element::Path::new().set("d", self.polycurve_data(curve));
                Box::new(self.stroked(path, style, curve.is_closed()))
            }
            // Holes are subpaths; even-odd filling leaves them empty whatever
            // their winding.
            Entity::Polyface(face) => {
                let data = face
                    .loops()
                    .iter()
                    .map(|curve| self.polycurve_data(curve))
                    .collect::<Vec<_>>()
                    .join(" ");
                let path = svg_element::Path::new()
                    .set("d", data)
                    .set("fill-rule", "evenodd");
                Box::new(self.stroked(path, style, true))
            }
            Entity::Text {
                position,
                content,
                size,
                rotation,
            } => {
                let color = style.stroke.color.unwrap_or(self.settings.stroke);
                let mut text = svg_element::Text::new(content.as_str())
                    .set("x", self.num(position.x()))
                    .set("y", self.num(position.y()))
                    .set("font-size", self.num(*size))
                    .set("fill", &color);
                if *rotation != 0.0 {
                    text = text.set(
                        "transform",
                        format!(
                            "rotate({} {})",
                            self.num(rotation.to_degrees()),
                            self.point(*position)
                        ),
                    );
                }
                Box::new(text)
            }
        }
    }

    /// Apply the resolved stroke and fill attributes to `element`.
    fn stroked<T>(&self, element: T, style: &Style, closed: bool) -> T
    where
        T: svg::Node,
    {
        let mut element = element;
        let stroke = &style.stroke;
        let color = stroke.color.unwrap_or(self.settings.stroke);
        element.assign("stroke", &color);
        element.assign(
            "stroke-width",
            self.num(stroke.width.unwrap_or(self.settings.stroke_width)),
        );
        if let Some(dasharray) = stroke.pattern.as_ref().and_then(|p| p.to_svg_value()) {
            element.assign("stroke-dasharray", dasharray);
        }
        if let Some(opacity) = stroke.opacity {
            element.assign("stroke-opacity", opacity);
        }
        if stroke.scaled != Some(true) {
            element.assign("vector-effect", "non-scaling-stroke");
        }

        if closed {
            let fill = style.fill.color.unwrap_or(self.settings.fill);
            element.assign("fill", &fill);
            if let Some(opacity) = style.fill.opacity {
                element.assign("fill-opacity", opacity);
            }
        } else {
            element.assign("fill", "none");
        }
        element
    }

    /// Path data for a counter-clockwise arc. A full turn is split in two,
    /// since one arc command cannot start and end at the same point.
    fn arc_data(&self, center: Point, radius: f64, start: f64, end: f64) -> String {
        let sweep = (end - start).rem_euclid(2.0 * PI);
        let sweep = if sweep == 0.0 && end != start {
            2.0 * PI
        } else {
            sweep
        };
        let at = |angle: f64| {
            Point::new(
                center.x() + radius * angle.cos(),
                center.y() + radius * angle.sin(),
            )
        };

        let mut data = format!("M {}", self.point(at(start)));
        let r = self.num(radius);
        if sweep >= 2.0 * PI {
            let _ = write!(data, " A {r} {r} 0 0 1 {}", self.point(at(start + PI)));
            let _ = write!(data, " A {r} {r} 0 0 1 {}", self.point(at(start)));
        } else {
            let large = u8::from(sweep > PI);
            let _ = write!(data, " A {r} {r} 0 {large} 1 {}", self.point(at(start + sweep)));
        }
        data
    }

    fn polycurve_data(&self, curve: &Polycurve) -> String {
        let Some(first) = curve.vertices().first() else {
            return String::new();
        };
        let mut data = format!("M {}", self.point(*first));
        for (a, b, bulge) in curve.edges() {
            match bulge_arc(a, b, bulge) {
                Some((_, radius, _, _)) => {
                    let r = self.num(radius);
                    let large = u8::from(bulge.abs() > 1.0);
                    let sweep = u8::from(bulge > 0.0);
                    let _ = write!(data, " A {r} {r} 0 {large} {sweep} {}", self.point(b));
                }
                None => {
                    let _ = write!(data, " L {}", self.point(b));
                }
            }
        }
        if curve.is_closed() {
            data.push_str(" Z");
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use drafter_core::{color::Color, entity::Polyface};

    use super::*;
    use crate::{
        config::AppConfig,
        export::{Options, Settings},
    };

    fn settings() -> Settings {
        Settings::resolve(&Options::new(), &AppConfig::default()).unwrap()
    }

    fn leaf(entity: Entity) -> Node {
        Node::with_entities([entity])
    }

    #[test]
    fn test_num_trims_zeros() {
        let settings = settings();
        let writer = Writer {
            settings: &settings,
        };
        assert_eq!(writer.num(1.5), "1.5");
        assert_eq!(writer.num(2.0), "2");
        assert_eq!(writer.num(1.0 / 3.0), "0.333");
        assert_eq!(writer.num(-0.0001), "0");
        assert_eq!(writer.num(100.0), "100");
    }

    #[test]
    fn test_view_box_includes_padding() {
        let root = Node::new().with_child(leaf(Entity::Segment {
            start: Point::new(0.0, 0.0),
            end: Point::new(20.0, 10.0),
        }));
        let out = render(&root, &settings());
        assert!(out.contains(r#"viewBox="-10 -10 40 30""#), "{out}");
        assert!(out.contains(r#"d="M 0 0 L 20 10""#), "{out}");
        assert!(out.contains(r#"vector-effect="non-scaling-stroke""#));
        assert!(out.contains(r#"fill="none""#));
    }

    #[test]
    fn test_hidden_subtree_is_skipped() {
        let mut hidden = leaf(Entity::Circle {
            center: Point::new(100.0, 100.0),
            radius: 5.0,
        });
        hidden.set_hidden(true);
        let root = Node::new()
            .with_child(leaf(Entity::Point {
                position: Point::new(0.0, 0.0),
            }))
            .with_child(hidden);

        let out = render(&root, &settings());
        assert!(!out.contains("<circle"));
        // Hidden geometry does not grow the drawing.
        assert!(out.contains(r#"viewBox="-10 -10 20 20""#), "{out}");
    }

    #[test]
    fn test_styles_are_inherited() {
        let mut root = Node::new().with_child(leaf(Entity::Circle {
            center: Point::new(0.0, 0.0),
            radius: 1.0,
        }));
        root.style_mut().stroke.color = Some(Color::new("red").unwrap());
        root.style_mut().stroke.scaled = Some(true);
        root.style_mut().fill.color = Some(Color::new("blue").unwrap());

        let out = render(&root, &settings());
        let red = Color::new("red").unwrap().to_string();
        let blue = Color::new("blue").unwrap().to_string();
        assert!(out.contains(&format!(r#"stroke="{red}""#)), "{out}");
        assert!(out.contains(&format!(r#"fill="{blue}""#)), "{out}");
        assert!(!out.contains("vector-effect"));
    }

    #[test]
    fn test_polycurve_with_bulge() {
        let curve = Polycurve::with_bulges(
            vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(2.0, 2.0)],
            vec![1.0, 0.0, 0.0],
            true,
        );
        let out = render(&Node::with_entities([Entity::Polycurve(curve)]), &settings());
        assert!(out.contains(r#"d="M 0 0 A 1 1 0 0 1 2 0 L 2 2 L 0 0 Z""#), "{out}");
    }

    #[test]
    fn test_polyface_has_hole_subpath() {
        let outer = Polycurve::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
            ],
            true,
        );
        let hole = Polycurve::new(
            vec![
                Point::new(1.0, 1.0),
                Point::new(2.0, 1.0),
                Point::new(2.0, 2.0),
            ],
            true,
        );
        let face = Entity::Polyface(Polyface::new(vec![outer, hole]));
        let out = render(&leaf(face), &settings());
        assert!(
            out.contains(r#"d="M 0 0 L 4 0 L 4 4 L 0 0 Z M 1 1 L 2 1 L 2 2 L 1 1 Z""#),
            "{out}"
        );
        assert!(out.contains(r#"fill-rule="evenodd""#), "{out}");
        assert!(!out.contains(r#"fill="none""#), "{out}");
    }

    #[test]
    fn test_children_draw_in_z_order() {
        let mut below = leaf(Entity::Circle {
            center: Point::new(0.0, 0.0),
            radius: 1.0,
        });
        below.set_z(-1.0);
        let root = Node::new()
            .with_child(leaf(Entity::Segment {
                start: Point::new(0.0, 0.0),
                end: Point::new(1.0, 0.0),
            }))
            .with_child(below);

        let out = render(&root, &settings());
        let circle = out.find("<circle").unwrap();
        let path = out.find("<path").unwrap();
        assert!(circle < path, "{out}");
    }

    #[test]
    fn test_full_arc_is_split() {
        let settings = settings();
        let writer = Writer {
            settings: &settings,
        };
        let data = writer.arc_data(Point::new(0.0, 0.0), 1.0, 0.0, 2.0 * PI);
        assert_eq!(data, "M 1 0 A 1 1 0 0 1 -1 0 A 1 1 0 0 1 1 0");
    }

    #[test]
    fn test_empty_drawing_and_background() {
        let mut settings = settings();
        settings.background = Some(Color::new("ivory").unwrap());
        let out = render(&Node::new(), &settings);
        assert!(out.contains(r#"viewBox="-10 -10 20 20""#), "{out}");
        assert!(out.contains("<rect"));
        assert!(!out.contains("<g"));
    }
}
