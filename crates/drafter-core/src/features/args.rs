//! Argument decoding shared by the built-in features.

use crate::{
    entity::Entity,
    error::{Error, Result},
    geometry::Point,
    sketch::Sketch,
    value::Value,
};

/// Positional arguments of one feature call.
pub(crate) struct Args<'a> {
    feature: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) fn new(feature: &'static str, values: &'a [Value]) -> Self {
        Self { feature, values }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// The argument at `index`; a missing argument and an explicit null are
    /// both `None`.
    pub(crate) fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    pub(crate) fn error(&self, index: usize, reason: impl Into<String>) -> Error {
        Error::invalid_argument(self.feature, index, reason)
    }

    fn expected(&self, index: usize, what: &str) -> Error {
        match self.get(index) {
            Some(value) => self.error(index, format!("expected {what}, got {}", value.type_name())),
            None => self.error(index, format!("missing {what}")),
        }
    }

    pub(crate) fn number(&self, index: usize) -> Result<f64> {
        self.get(index)
            .and_then(Value::as_number)
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.expected(index, "a number"))
    }

    pub(crate) fn number_or(&self, index: usize, default: f64) -> Result<f64> {
        match self.get(index) {
            Some(_) => self.number(index),
            None => Ok(default),
        }
    }

    /// A strictly positive number.
    pub(crate) fn positive(&self, index: usize) -> Result<f64> {
        let n = self.number(index)?;
        if n > 0.0 {
            Ok(n)
        } else {
            Err(self.error(index, format!("expected a positive number, got {n}")))
        }
    }

    /// A number within `[0, 1]`.
    pub(crate) fn unit_interval(&self, index: usize) -> Result<f64> {
        let n = self.number(index)?;
        if (0.0..=1.0).contains(&n) {
            Ok(n)
        } else {
            Err(self.error(index, format!("expected a value between 0 and 1, got {n}")))
        }
    }

    pub(crate) fn string(&self, index: usize) -> Result<&'a str> {
        self.get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| self.expected(index, "a string"))
    }

    pub(crate) fn boolean_or(&self, index: usize, default: bool) -> Result<bool> {
        match self.get(index) {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| self.expected(index, "a boolean")),
            None => Ok(default),
        }
    }

    pub(crate) fn point(&self, index: usize) -> Result<Point> {
        self.get(index)
            .and_then(Value::as_point)
            .ok_or_else(|| self.expected(index, "a point"))
    }

    pub(crate) fn point_or(&self, index: usize, default: Point) -> Result<Point> {
        match self.get(index) {
            Some(_) => self.point(index),
            None => Ok(default),
        }
    }

    /// Either a point at `index`, or two numbers at `index` and `index + 1`.
    /// Returns the point and the number of arguments consumed.
    pub(crate) fn point_or_coordinates(&self, index: usize) -> Result<(Point, usize)> {
        match self.get(index) {
            Some(Value::Number(_)) => {
                Ok((Point::new(self.number(index)?, self.number(index + 1)?), 2))
            }
            _ => Ok((self.point(index)?, 1)),
        }
    }

    /// A directed segment: a segment entity, a sketch whose first entity is
    /// a segment or a two-vertex polycurve, or a list of two points.
    pub(crate) fn segment(&self, index: usize) -> Result<(Point, Point)> {
        self.get(index)
            .and_then(as_segment)
            .ok_or_else(|| self.expected(index, "a segment"))
    }

    pub(crate) fn sketch(&self, index: usize) -> Result<&'a Sketch> {
        self.get(index)
            .and_then(Value::as_sketch)
            .ok_or_else(|| self.expected(index, "a sketch"))
    }
}

fn as_segment(value: &Value) -> Option<(Point, Point)> {
    match value {
        Value::List(items) => match items.as_slice() {
            [start, end] => Some((start.as_point()?, end.as_point()?)),
            _ => None,
        },
        _ => match value.as_entity()? {
            Entity::Segment { start, end } => Some((*start, *end)),
            Entity::Polycurve(curve) => match curve.vertices() {
                [start, end] => Some((*start, *end)),
                _ => None,
            },
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_null_arguments() {
        let values = [Value::Number(1.0), Value::Null];
        let args = Args::new("demo", &values);

        assert_eq!(args.number(0).unwrap(), 1.0);
        assert_eq!(args.number_or(1, 7.0).unwrap(), 7.0);
        assert_eq!(args.number_or(5, 3.0).unwrap(), 3.0);

        let err = args.number(1).unwrap_err();
        assert_eq!(err, Error::invalid_argument("demo", 1, "missing a number"));
    }

    #[test]
    fn test_type_mismatch_reports_type() {
        let values = [Value::from("x")];
        let args = Args::new("demo", &values);
        let err = args.number(0).unwrap_err();
        assert_eq!(
            err,
            Error::invalid_argument("demo", 0, "expected a number, got string")
        );
    }

    #[test]
    fn test_point_or_coordinates() {
        let values = [Value::Number(1.0), Value::Number(2.0), Value::from(Point::new(3.0, 4.0))];
        let args = Args::new("demo", &values);
        assert_eq!(args.point_or_coordinates(0).unwrap(), (Point::new(1.0, 2.0), 2));
        assert_eq!(args.point_or_coordinates(2).unwrap(), (Point::new(3.0, 4.0), 1));
    }

    #[test]
    fn test_segment_from_list() {
        let values = [Value::List(vec![
            Value::List(vec![Value::Number(0.0), Value::Number(0.0)]),
            Value::List(vec![Value::Number(1.0), Value::Number(0.0)]),
        ])];
        let args = Args::new("demo", &values);
        assert_eq!(
            args.segment(0).unwrap(),
            (Point::new(0.0, 0.0), Point::new(1.0, 0.0))
        );
    }

    #[test]
    fn test_positive_and_unit_interval() {
        let values = [Value::Number(0.0), Value::Number(1.5)];
        let args = Args::new("demo", &values);
        assert!(args.positive(0).is_err());
        assert!(args.unit_interval(1).is_err());
        assert_eq!(args.unit_interval(0).unwrap(), 0.0);
    }
}
