//! Transformation features. Each maps every entity of the subtree through a
//! [`Similarity`].

use log::trace;

use crate::{
    align::Similarity,
    error::Result,
    features::args::Args,
    geometry::Point,
    sketch::Sketch,
    value::Value,
};

fn apply(mut sketch: Sketch, t: &Similarity) -> Sketch {
    sketch.node_mut().transform(t);
    sketch
}

/// `translate(dx, dy)` or `translate(vector)`
pub(crate) fn translate(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("translate", values);
    let (offset, _) = args.point_or_coordinates(0)?;
    Ok(apply(sketch, &Similarity::translation(offset.x(), offset.y())))
}

/// `rotate(degrees, origin?)`, counter-clockwise around `origin` (default `(0, 0)`).
pub(crate) fn rotate(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("rotate", values);
    let angle = args.number(0)?.to_radians();
    let origin = args.point_or(1, Point::default())?;
    Ok(apply(sketch, &Similarity::rotation(angle, origin)))
}

/// `scale(factor, origin?)`
pub(crate) fn scale(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("scale", values);
    let factor = args.positive(0)?;
    let origin = args.point_or(1, Point::default())?;
    Ok(apply(sketch, &Similarity::scaling(factor, origin)))
}

/// `transform(dx, dy, degrees?, factor?)` or `transform(offset, degrees?, factor?)`
///
/// Scale and rotate about the origin, then translate.
pub(crate) fn transform(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("transform", values);
    let (offset, used) = args.point_or_coordinates(0)?;
    let angle = args.number_or(used, 0.0)?.to_radians();
    let factor = match args.get(used + 1) {
        Some(_) => args.positive(used + 1)?,
        None => 1.0,
    };
    let t = Similarity::scaling(factor, Point::default())
        .then(&Similarity::rotation(angle, Point::default()))
        .then(&Similarity::translation(offset.x(), offset.y()));
    Ok(apply(sketch, &t))
}

/// `orient(s0, s1, d0, d1)`: map `s0` onto `d0` and the direction `s0 -> s1`
/// onto `d0 -> d1`, scaling by the ratio of the two lengths.
pub(crate) fn orient(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("orient", values);
    let s0 = args.point(0)?;
    let s1 = args.point(1)?;
    let d0 = args.point(2)?;
    let d1 = args.point(3)?;
    let t = Similarity::correspondence(s0, s1, d0, d1)?;
    trace!(
        rotation = t.rotation_angle(),
        scale = t.scale_factor();
        "Orienting sketch"
    );
    Ok(apply(sketch, &t))
}

/// `snap(source, destination, offset?)`
///
/// With two segments, maps the source segment onto the destination segment
/// like [`orient`]. With two points, translates the source point onto the
/// destination point. `offset` shifts the result along the destination
/// direction.
pub(crate) fn snap(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("snap", values);
    let offset = args.number_or(2, 0.0)?;

    let (t, direction) = match (args.segment(0), args.segment(1)) {
        (Ok((s0, s1)), Ok((d0, d1))) => (
            Similarity::correspondence(s0, s1, d0, d1)?,
            d1.sub_point(d0).normalize(),
        ),
        _ => {
            let source = args.point(0)?;
            let destination = args.point(1)?;
            let delta = destination.sub_point(source);
            (Similarity::translation(delta.x(), delta.y()), None)
        }
    };

    let shift = direction.map_or(Point::default(), |d| d.scale(offset));
    let t = t.then(&Similarity::translation(shift.x(), shift.y()));
    Ok(apply(sketch, &t))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{entity::Entity, error::Error, registry::Registry};

    fn sketch() -> Sketch {
        Sketch::new(Arc::new(Registry::with_builtins()))
    }

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn p(x: f64, y: f64) -> Value {
        Value::from(Point::new(x, y))
    }

    fn unit_segment() -> Sketch {
        sketch()
            .call("segment", &[p(0.0, 0.0), p(1.0, 0.0)])
            .unwrap()
    }

    fn segment_ends(sketch: &Sketch) -> (Point, Point) {
        match sketch.first_entity().unwrap() {
            Entity::Segment { start, end } => (*start, *end),
            other => panic!("expected segment, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_forms() {
        let a = unit_segment().call("translate", &[n(2.0), n(3.0)]).unwrap();
        let b = unit_segment().call("translate", &[p(2.0, 3.0)]).unwrap();
        assert_eq!(segment_ends(&a), segment_ends(&b));
        assert_eq!(segment_ends(&a).0, Point::new(2.0, 3.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let out = unit_segment().call("rotate", &[n(90.0)]).unwrap();
        let (_, end) = segment_ends(&out);
        assert_approx_eq!(f64, end.x(), 0.0, epsilon = 1e-12);
        assert_approx_eq!(f64, end.y(), 1.0);
    }

    #[test]
    fn test_transform_scales_rotates_then_translates() {
        let out = unit_segment()
            .call("transform", &[n(1.0), n(2.0), n(90.0), n(3.0)])
            .unwrap();
        let (start, end) = segment_ends(&out);
        assert_eq!(start, Point::new(1.0, 2.0));
        assert_approx_eq!(f64, end.x(), 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, end.y(), 5.0);

        let moved = unit_segment().call("transform", &[p(2.0, 0.0)]).unwrap();
        assert_eq!(segment_ends(&moved).1, Point::new(3.0, 0.0));

        let err = unit_segment()
            .call("transform", &[p(0.0, 0.0), n(0.0), n(0.0)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { index: 2, .. }));
    }

    #[test]
    fn test_orient_axis_aligned_is_exact() {
        let source = unit_segment();
        let out = source
            .call("orient", &[p(0.0, 0.0), p(1.0, 0.0), p(5.0, 5.0), p(5.0, 15.0)])
            .unwrap();
        assert_eq!(segment_ends(&out), (Point::new(5.0, 5.0), Point::new(5.0, 15.0)));
        // The operand is untouched.
        assert_eq!(segment_ends(&source), (Point::new(0.0, 0.0), Point::new(1.0, 0.0)));
    }

    #[test]
    fn test_orient_degenerate() {
        let err = unit_segment()
            .call("orient", &[p(1.0, 1.0), p(1.0, 1.0), p(0.0, 0.0), p(1.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateAlignment(_)));
    }

    #[test]
    fn test_snap_segment_onto_sketch_segment() {
        let destination = sketch()
            .call("segment", &[p(5.0, 5.0), p(5.0, 15.0)])
            .unwrap();
        let out = unit_segment()
            .call(
                "snap",
                &[Value::from(unit_segment()), Value::from(destination)],
            )
            .unwrap();
        assert_eq!(segment_ends(&out), (Point::new(5.0, 5.0), Point::new(5.0, 15.0)));
    }

    #[test]
    fn test_snap_points_with_offset() {
        let out = unit_segment()
            .call(
                "snap",
                &[
                    Value::List(vec![p(0.0, 0.0), p(1.0, 0.0)]),
                    Value::List(vec![p(0.0, 0.0), p(0.0, 2.0)]),
                    n(1.0),
                ],
            )
            .unwrap();
        let (start, end) = segment_ends(&out);
        assert_approx_eq!(f64, start.y(), 1.0);
        assert_approx_eq!(f64, end.y(), 3.0);

        let moved = unit_segment()
            .call("snap", &[p(1.0, 0.0), p(4.0, 4.0)])
            .unwrap();
        assert_eq!(segment_ends(&moved).1, Point::new(4.0, 4.0));
    }
}
