//! Entity constructors. Each appends a child node holding the new entity.

use crate::{
    entity::{Entity, Polycurve, Polyface},
    error::{Error, Result},
    features::args::Args,
    geometry::{Bounds, Point},
    node::{Node, Order},
    sketch::Sketch,
    value::Value,
};

/// Default text height when `text` is called without a size.
const DEFAULT_TEXT_SIZE: f64 = 12.0;

fn append(sketch: Sketch, entity: Entity) -> Sketch {
    let child = sketch.with_node(Node::with_entities([entity]));
    sketch.add([child])
}

/// `point(x, y)` or `point(p)`
pub(crate) fn point(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("point", values);
    let (position, _) = args.point_or_coordinates(0)?;
    Ok(append(sketch, Entity::Point { position }))
}

/// `segment(p0, p1)` or `segment(x0, y0, x1, y1)`
pub(crate) fn segment(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("segment", values);
    let (start, used) = args.point_or_coordinates(0)?;
    let (end, _) = args.point_or_coordinates(used)?;
    Ok(append(sketch, Entity::Segment { start, end }))
}

/// `circle(center, r)` or `circle(x, y, r)`
pub(crate) fn circle(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("circle", values);
    let (center, used) = args.point_or_coordinates(0)?;
    let radius = args.positive(used)?;
    Ok(append(sketch, Entity::Circle { center, radius }))
}

/// `arc(center, r, start_deg, end_deg)`, swept counter-clockwise.
pub(crate) fn arc(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("arc", values);
    let (center, used) = args.point_or_coordinates(0)?;
    let radius = args.positive(used)?;
    let start_angle = args.number(used + 1)?.to_radians();
    let end_angle = args.number(used + 2)?.to_radians();
    Ok(append(
        sketch,
        Entity::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        },
    ))
}

/// `polycurve(p0, p1, ...)` or `polycurve([p0, p1, ...])`
pub(crate) fn polycurve(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("polycurve", values);
    let vertices = match values {
        [list @ Value::List(items)] if list.as_point().is_none() => {
            let nested = Args::new("polycurve", items);
            (0..nested.len())
                .map(|i| nested.point(i))
                .collect::<Result<Vec<_>>>()?
        }
        _ => (0..args.len())
            .map(|i| args.point(i))
            .collect::<Result<Vec<_>>>()?,
    };
    if vertices.len() < 2 {
        return Err(args.error(vertices.len(), "a polycurve needs at least two vertices"));
    }
    Ok(append(
        sketch,
        Entity::Polycurve(Polycurve::new(vertices, false)),
    ))
}

/// `rectangle(x, y, w, h)`: a closed polycurve with a corner at `(x, y)`.
pub(crate) fn rectangle(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("rectangle", values);
    let (corner, used) = args.point_or_coordinates(0)?;
    let width = args.number(used)?;
    let height = args.number(used + 1)?;
    let (x, y) = (corner.x(), corner.y());
    let vertices = vec![
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ];
    Ok(append(
        sketch,
        Entity::Polycurve(Polycurve::new(vertices, true)),
    ))
}

/// `polyface(outer, hole...)`: a filled region bounded by closed loops.
///
/// Each argument is a list of at least three points, a polycurve, or a
/// sketch contributing every polycurve it draws. Loops are closed; the first
/// one found is the outer boundary.
pub(crate) fn polyface(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("polyface", values);
    let mut loops = Vec::new();
    for i in 0..args.len() {
        let found = face_loops(&args, i)?;
        if found.is_empty() {
            return Err(args.error(i, "expected a closed outline, found no polycurve"));
        }
        loops.extend(found);
    }
    if loops.is_empty() {
        return Err(args.error(0, "a polyface needs at least one loop"));
    }
    Ok(append(sketch, Entity::Polyface(Polyface::new(loops))))
}

fn face_loops(args: &Args<'_>, index: usize) -> Result<Vec<Polycurve>> {
    let Some(value) = args.get(index) else {
        return Ok(Vec::new());
    };
    match value {
        Value::List(items) if value.as_point().is_none() => {
            let points = items
                .iter()
                .map(|item| {
                    item.as_point()
                        .ok_or_else(|| args.error(index, "expected a list of points"))
                })
                .collect::<Result<Vec<_>>>()?;
            if points.len() < 3 {
                return Err(args.error(index, "a loop needs at least three points"));
            }
            Ok(vec![Polycurve::new(points, true)])
        }
        Value::Sketch(part) => Ok(part
            .node()
            .subtree_entities(Order::Pre)
            .flat_map(|entity| match entity {
                Entity::Polycurve(curve) => vec![curve.clone()],
                Entity::Polyface(face) => face.loops().to_vec(),
                _ => Vec::new(),
            })
            .collect()),
        Value::Entity(Entity::Polycurve(curve)) => Ok(vec![curve.clone()]),
        Value::Entity(Entity::Polyface(face)) => Ok(face.loops().to_vec()),
        other => Err(args.error(index, format!("expected a loop, got {}", other.type_name()))),
    }
}

/// `text(position, content, size?, rotation_deg?)`
pub(crate) fn text(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("text", values);
    let position = args.point(0)?;
    let content = match args.get(1) {
        Some(Value::Number(n)) => n.to_string(),
        _ => args.string(1)?.to_string(),
    };
    let size = match args.get(2) {
        Some(_) => args.positive(2)?,
        None => DEFAULT_TEXT_SIZE,
    };
    let rotation = args.number_or(3, 0.0)?.to_radians();
    Ok(append(
        sketch,
        Entity::Text {
            position,
            content,
            size,
            rotation,
        },
    ))
}

/// `bbox()`: a closed rectangle around everything drawn so far.
pub(crate) fn bbox(sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    let bounds = sketch
        .node()
        .subtree_entities(Order::Level)
        .fold(Bounds::default(), |acc, entity| acc.merge(&entity.bounds()));
    if bounds.is_empty() {
        return Err(Error::EmptyShape);
    }
    let vertices = vec![
        Point::new(bounds.min_x(), bounds.min_y()),
        Point::new(bounds.max_x(), bounds.min_y()),
        Point::new(bounds.max_x(), bounds.max_y()),
        Point::new(bounds.min_x(), bounds.max_y()),
    ];
    Ok(append(
        sketch,
        Entity::Polycurve(Polycurve::new(vertices, true)),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::Registry;

    fn sketch() -> Sketch {
        Sketch::new(Arc::new(Registry::with_builtins()))
    }

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    #[test]
    fn test_point_appends_child() {
        let out = sketch().call("point", &[n(5.0), n(10.0)]).unwrap();
        assert!(out.node().entities().is_empty());
        assert_eq!(out.node().children().len(), 1);
        assert_eq!(
            out.first_entity().unwrap(),
            &Entity::Point {
                position: Point::new(5.0, 10.0)
            }
        );
        assert_eq!(out.node().feature(), Some("point"));
    }

    #[test]
    fn test_circle_forms() {
        let a = sketch().call("circle", &[n(1.0), n(2.0), n(3.0)]).unwrap();
        let b = sketch()
            .call("circle", &[Value::from(Point::new(1.0, 2.0)), n(3.0)])
            .unwrap();
        assert_eq!(a.first_entity().unwrap(), b.first_entity().unwrap());

        let err = sketch().call("circle", &[n(0.0), n(0.0), n(-1.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { index: 2, .. }));
    }

    #[test]
    fn test_rectangle_is_closed_polycurve() {
        let out = sketch()
            .call("rectangle", &[n(0.0), n(0.0), n(4.0), n(2.0)])
            .unwrap();
        let Entity::Polycurve(curve) = out.first_entity().unwrap() else {
            panic!("expected a polycurve");
        };
        assert!(curve.is_closed());
        assert_eq!(curve.vertices()[2], Point::new(4.0, 2.0));
    }

    #[test]
    fn test_polycurve_requires_two_vertices() {
        let err = sketch()
            .call("polycurve", &[Value::from(Point::new(0.0, 0.0))])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { feature, .. } if feature == "polycurve"));
    }

    #[test]
    fn test_polyface_from_points_and_sketch() {
        let square = |x: f64, w: f64| {
            Value::List(vec![
                Value::from(Point::new(x, x)),
                Value::from(Point::new(x + w, x)),
                Value::from(Point::new(x + w, x + w)),
                Value::from(Point::new(x, x + w)),
            ])
        };
        let hole = sketch()
            .call("circle", &[n(0.0), n(0.0), n(1.0)])
            .and_then(|s| s.call("rectangle", &[n(2.0), n(2.0), n(1.0), n(1.0)]))
            .unwrap();

        let out = sketch()
            .call("polyface", &[square(0.0, 10.0), Value::from(hole)])
            .unwrap();
        let Entity::Polyface(face) = out.first_entity().unwrap() else {
            panic!("expected a polyface");
        };
        assert_eq!(face.loops().len(), 2);
        assert_eq!(face.outer().unwrap().vertices()[2], Point::new(10.0, 10.0));
        assert_eq!(face.holes()[0].vertices()[0], Point::new(2.0, 2.0));
        assert!(face.loops().iter().all(Polycurve::is_closed));
    }

    #[test]
    fn test_polyface_rejects_missing_loops() {
        let err = sketch().call("polyface", &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { index: 0, .. }));

        let short = Value::List(vec![
            Value::from(Point::new(0.0, 0.0)),
            Value::from(Point::new(1.0, 0.0)),
            Value::from(Point::new(1.0, 1.0)),
        ]);
        let only_circle = sketch().call("circle", &[n(0.0), n(0.0), n(1.0)]).unwrap();
        let err = sketch()
            .call("polyface", &[short, Value::from(only_circle)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { index: 1, .. }));

        let err = sketch().call("polyface", &[n(3.0)]).unwrap_err();
        assert!(err.to_string().contains("expected a loop, got number"));
    }

    #[test]
    fn test_bbox_of_empty_sketch() {
        assert_eq!(sketch().call("bbox", &[]).unwrap_err(), Error::EmptyShape);
    }
}
