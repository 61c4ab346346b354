//! Entity payloads: the geometry a scene node carries.
//!
//! Entities are plain values. Features build them, the alignment transforms
//! move them, and renderers read them; the engine never looks inside them
//! beyond [`Entity::transform`] and [`Entity::bounds`].

use std::f64::consts::PI;

use serde::Serialize;

use crate::{align::Similarity, geometry::{Bounds, Point}};

/// A polyline whose edges may be circular arcs.
///
/// `bulges[i]` describes the edge from `vertices[i]` to `vertices[i + 1]`
/// (wrapping to `vertices[0]` for the closing edge). A bulge of `0` is a
/// straight edge; otherwise it is the ratio of sagitta to half chord,
/// positive for counter-clockwise arcs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polycurve {
    vertices: Vec<Point>,
    bulges: Vec<f64>,
    closed: bool,
}

impl Polycurve {
    /// A polycurve with straight edges.
    pub fn new(vertices: Vec<Point>, closed: bool) -> Self {
        let bulges = vec![0.0; vertices.len()];
        Self {
            vertices,
            bulges,
            closed,
        }
    }

    /// Build from vertices and per-edge bulges. Missing bulges are straight.
    pub fn with_bulges(vertices: Vec<Point>, mut bulges: Vec<f64>, closed: bool) -> Self {
        bulges.resize(vertices.len(), 0.0);
        Self {
            vertices,
            bulges,
            closed,
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn bulges(&self) -> &[f64] {
        &self.bulges
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Number of drawable edges.
    pub fn edge_count(&self) -> usize {
        match self.vertices.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Edge `index` as `(start, end, bulge)`.
    pub fn edge(&self, index: usize) -> Option<(Point, Point, f64)> {
        if index >= self.edge_count() {
            return None;
        }
        let next = (index + 1) % self.vertices.len();
        Some((self.vertices[index], self.vertices[next], self.bulges[index]))
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point, Point, f64)> + '_ {
        (0..self.edge_count()).filter_map(|i| self.edge(i))
    }

    /// The same curve traversed backwards.
    pub fn reversed(&self) -> Self {
        let vertices = self.vertices.iter().rev().copied().collect();
        let n = self.bulges.len();
        // Edge i runs from vertex i to i + 1; reversed, it becomes edge n - 2 - i
        // with the opposite bend. The closing edge keeps the last slot.
        let flip = |bulge: f64| if bulge == 0.0 { 0.0 } else { -bulge };
        let mut bulges: Vec<f64> = (0..n.saturating_sub(1))
            .rev()
            .map(|i| flip(self.bulges[i]))
            .collect();
        if n > 0 {
            bulges.push(flip(self.bulges[n - 1]));
        }
        Self {
            vertices,
            bulges,
            closed: self.closed,
        }
    }

    // Similarities preserve orientation, so bulges are unchanged.
    fn transform(&self, t: &Similarity) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| t.apply(*v)).collect(),
            bulges: self.bulges.clone(),
            closed: self.closed,
        }
    }

    fn bounds(&self) -> Bounds {
        self.edges()
            .fold(Bounds::from_points(self.vertices.iter().copied()), |acc, (a, b, bulge)| {
                acc.merge(&bulge_bounds(a, b, bulge))
            })
    }
}

/// A filled region bounded by closed loops. The first loop is the outer
/// boundary, every further loop a hole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyface {
    loops: Vec<Polycurve>,
}

impl Polyface {
    /// Build a face from its boundary loops, closing any that are open.
    pub fn new(loops: Vec<Polycurve>) -> Self {
        let loops = loops
            .into_iter()
            .map(|mut curve| {
                curve.set_closed(true);
                curve
            })
            .collect();
        Self { loops }
    }

    pub fn loops(&self) -> &[Polycurve] {
        &self.loops
    }

    pub fn outer(&self) -> Option<&Polycurve> {
        self.loops.first()
    }

    pub fn holes(&self) -> &[Polycurve] {
        self.loops.get(1..).unwrap_or_default()
    }
}

/// A geometric payload owned by a scene node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Point {
        position: Point,
    },
    Segment {
        start: Point,
        end: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    /// Counter-clockwise arc from `start_angle` to `end_angle` (radians).
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Polycurve(Polycurve),
    Polyface(Polyface),
    Text {
        position: Point,
        content: String,
        size: f64,
        /// Rotation in radians, counter-clockwise.
        rotation: f64,
    },
}

impl Entity {
    /// Short lowercase name of the entity kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::Segment { .. } => "segment",
            Self::Circle { .. } => "circle",
            Self::Arc { .. } => "arc",
            Self::Polycurve(_) => "polycurve",
            Self::Polyface(_) => "polyface",
            Self::Text { .. } => "text",
        }
    }

    /// Apply a similarity transform.
    pub fn transform(&self, t: &Similarity) -> Entity {
        let scale = t.scale_factor();
        let turn = t.rotation_angle();
        match self {
            Self::Point { position } => Self::Point {
                position: t.apply(*position),
            },
            Self::Segment { start, end } => Self::Segment {
                start: t.apply(*start),
                end: t.apply(*end),
            },
            Self::Circle { center, radius } => Self::Circle {
                center: t.apply(*center),
                radius: radius * scale,
            },
            Self::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => Self::Arc {
                center: t.apply(*center),
                radius: radius * scale,
                start_angle: start_angle + turn,
                end_angle: end_angle + turn,
            },
            Self::Polycurve(curve) => Self::Polycurve(curve.transform(t)),
            Self::Polyface(face) => Self::Polyface(Polyface {
                loops: face.loops.iter().map(|curve| curve.transform(t)).collect(),
            }),
            Self::Text {
                position,
                content,
                size,
                rotation,
            } => Self::Text {
                position: t.apply(*position),
                content: content.clone(),
                size: size * scale,
                rotation: rotation + turn,
            },
        }
    }

    /// Axis-aligned bounds of the geometry. Text contributes its anchor only.
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Point { position } | Self::Text { position, .. } => Bounds::from_point(*position),
            Self::Segment { start, end } => Bounds::from_points([*start, *end]),
            Self::Circle { center, radius } => circle_bounds(*center, *radius),
            Self::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => arc_bounds(*center, *radius, *start_angle, *end_angle),
            Self::Polycurve(curve) => curve.bounds(),
            Self::Polyface(face) => face
                .loops
                .iter()
                .fold(Bounds::default(), |acc, curve| acc.merge(&curve.bounds())),
        }
    }

    /// The characteristic points of the entity, used for member access and
    /// snapping.
    pub fn anchor_points(&self) -> Vec<Point> {
        match self {
            Self::Point { position } | Self::Text { position, .. } => vec![*position],
            Self::Segment { start, end } => vec![*start, *end],
            Self::Circle { center, .. } => vec![*center],
            Self::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => vec![
                polar(*center, *radius, *start_angle),
                polar(*center, *radius, *end_angle),
            ],
            Self::Polycurve(curve) => curve.vertices.clone(),
            Self::Polyface(face) => face
                .loops
                .iter()
                .flat_map(|curve| curve.vertices.iter().copied())
                .collect(),
        }
    }
}

fn polar(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(
        center.x() + radius * angle.cos(),
        center.y() + radius * angle.sin(),
    )
}

fn circle_bounds(center: Point, radius: f64) -> Bounds {
    Bounds::from_points([
        Point::new(center.x() - radius, center.y() - radius),
        Point::new(center.x() + radius, center.y() + radius),
    ])
}

/// Bounds of a counter-clockwise arc: its endpoints plus every axis extreme
/// the sweep passes through.
fn arc_bounds(center: Point, radius: f64, start: f64, end: f64) -> Bounds {
    let sweep = (end - start).rem_euclid(2.0 * PI);
    let sweep = if sweep == 0.0 && end != start { 2.0 * PI } else { sweep };

    let mut bounds = Bounds::from_points([
        polar(center, radius, start),
        polar(center, radius, start + sweep),
    ]);
    for quadrant in 0..4 {
        let angle = f64::from(quadrant) * PI / 2.0;
        if (angle - start).rem_euclid(2.0 * PI) <= sweep {
            bounds = bounds.include(polar(center, radius, angle));
        }
    }
    bounds
}

/// Bounds of one polycurve edge.
fn bulge_bounds(a: Point, b: Point, bulge: f64) -> Bounds {
    let chord = b.sub_point(a);
    if bulge == 0.0 || chord.is_zero() {
        return Bounds::from_points([a, b]);
    }
    let Some((center, radius, start, end)) = bulge_arc(a, b, bulge) else {
        return Bounds::from_points([a, b]);
    };
    arc_bounds(center, radius, start, end)
}

/// Convert a bulged edge to `(center, radius, start_angle, end_angle)` of a
/// counter-clockwise arc covering the same points.
pub fn bulge_arc(a: Point, b: Point, bulge: f64) -> Option<(Point, f64, f64, f64)> {
    let chord = b.sub_point(a);
    let half = chord.length() / 2.0;
    if bulge == 0.0 || half == 0.0 {
        return None;
    }
    let radius = half * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    // Signed distance from the chord midpoint to the center, along the left normal.
    let offset = half * (1.0 - bulge * bulge) / (2.0 * bulge);
    let normal = Point::new(-chord.y(), chord.x()).scale(1.0 / (2.0 * half));
    let center = a.midpoint(b).add_point(normal.scale(offset));

    let angle_a = a.sub_point(center).angle();
    let angle_b = b.sub_point(center).angle();
    if bulge > 0.0 {
        Some((center, radius, angle_a, angle_b))
    } else {
        Some((center, radius, angle_b, angle_a))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_polycurve_edges() {
        let open = Polycurve::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)], false);
        assert_eq!(open.edge_count(), 2);
        assert_eq!(open.bulges().len(), open.vertices().len());

        let mut closed = open.clone();
        closed.set_closed(true);
        assert_eq!(closed.edge_count(), 3);
        assert_eq!(closed.edge(2), Some((p(1.0, 1.0), p(0.0, 0.0), 0.0)));
        assert_eq!(closed.edge(3), None);
    }

    #[test]
    fn test_transform_scales_radius_and_text() {
        let t = Similarity::scaling(2.0, p(0.0, 0.0)).then(&Similarity::translation(1.0, 1.0));
        let circle = Entity::Circle {
            center: p(1.0, 1.0),
            radius: 3.0,
        };
        assert_eq!(
            circle.transform(&t),
            Entity::Circle {
                center: p(3.0, 3.0),
                radius: 6.0
            }
        );

        let text = Entity::Text {
            position: p(0.0, 0.0),
            content: "A".to_string(),
            size: 10.0,
            rotation: 0.0,
        };
        let Entity::Text { size, position, .. } = text.transform(&t) else {
            panic!("expected text");
        };
        assert_eq!(size, 20.0);
        assert_eq!(position, p(1.0, 1.0));
    }

    #[test]
    fn test_arc_bounds_include_extremes() {
        let arc = Entity::Arc {
            center: p(0.0, 0.0),
            radius: 1.0,
            start_angle: 0.0,
            end_angle: PI,
        };
        let b = arc.bounds();
        assert_approx_eq!(f64, b.max_y(), 1.0);
        assert_approx_eq!(f64, b.min_x(), -1.0);
        assert_approx_eq!(f64, b.max_x(), 1.0);
        assert_approx_eq!(f64, b.min_y(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bulge_arc_semicircle() {
        // bulge 1 is a half circle, swept counter-clockwise from a to b.
        let (center, radius, start, end) = bulge_arc(p(0.0, 0.0), p(2.0, 0.0), 1.0).unwrap();
        assert_approx_eq!(f64, center.x(), 1.0);
        assert_approx_eq!(f64, center.y(), 0.0);
        assert_approx_eq!(f64, radius, 1.0);
        assert_approx_eq!(f64, start.abs(), PI);
        assert_approx_eq!(f64, end, 0.0);

        let curve = Entity::Polycurve(Polycurve::with_bulges(
            vec![p(0.0, 0.0), p(2.0, 0.0)],
            vec![1.0],
            false,
        ));
        let b = curve.bounds();
        assert_approx_eq!(f64, b.min_y(), -1.0);
        assert_approx_eq!(f64, b.max_y(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_negates_bulges() {
        let curve = Polycurve::with_bulges(
            vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0)],
            vec![1.0, 0.5, 0.25],
            true,
        );
        let back = curve.reversed();
        assert_eq!(back.vertices(), &[p(2.0, 2.0), p(2.0, 0.0), p(0.0, 0.0)]);
        assert_eq!(back.bulges(), &[-0.5, -1.0, -0.25]);
        assert_eq!(back.reversed(), curve);
    }

    #[test]
    fn test_polyface_loops() {
        let outer = Polycurve::new(vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)], false);
        let hole = Polycurve::new(vec![p(1.0, 1.0), p(2.0, 1.0), p(2.0, 2.0)], true);
        let face = Entity::Polyface(Polyface::new(vec![outer, hole]));
        assert_eq!(face.kind(), "polyface");
        assert_eq!(face.anchor_points().len(), 7);

        let Entity::Polyface(moved) = face.transform(&Similarity::translation(1.0, 0.0)) else {
            panic!("expected polyface");
        };
        assert!(moved.loops().iter().all(Polycurve::is_closed));
        assert_eq!(moved.holes().len(), 1);
        assert_eq!(moved.outer().unwrap().vertices()[0], p(1.0, 0.0));

        let b = face.bounds();
        assert_eq!((b.min_x(), b.max_x(), b.max_y()), (0.0, 4.0, 4.0));
        assert!(Polyface::new(Vec::new()).holes().is_empty());
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Entity::Point {
            position: p(1.0, 2.0),
        })
        .unwrap();
        assert_eq!(json["type"], "point");
        assert_eq!(json["position"]["x"], 1.0);
    }
}
