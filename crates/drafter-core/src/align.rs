//! Alignment geometry used by features to assemble sketches from parts.
//!
//! - [`Similarity`] - rotation, uniform scale and translation, including the
//!   point-correspondence construction behind `orient` and `snap`
//! - [`fillet`] - trim points and bulge of a tangent arc replacing a corner
//!
//! A similarity is stored as the complex map `z -> m·z + t`. Building the
//! correspondence transform as a complex quotient keeps axis-aligned cases
//! exact: no trigonometry is involved.

use std::f64::consts::PI;

use crate::{
    error::{Error, Result},
    geometry::Point,
};

/// Collinearity tolerance on the sine of the turn angle.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// A 2-D similarity transform: rotation + uniform scale + translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Real part of the complex multiplier.
    a: f64,
    /// Imaginary part of the complex multiplier.
    b: f64,
    tx: f64,
    ty: f64,
}

impl Similarity {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::identity()
        }
    }

    /// Rotation by `angle` radians (counter-clockwise) around `origin`.
    pub fn rotation(angle: f64, origin: Point) -> Self {
        Self::about(angle.cos(), angle.sin(), origin)
    }

    /// Uniform scaling by `factor` around `origin`.
    pub fn scaling(factor: f64, origin: Point) -> Self {
        Self::about(factor, 0.0, origin)
    }

    /// The unique similarity mapping `s0 -> d0` and the direction of
    /// `s1 - s0` onto the direction of `d1 - d0`, scaled by
    /// `|d1 - d0| / |s1 - s0|`.
    ///
    /// # Errors
    ///
    /// [`Error::DegenerateAlignment`] when either segment has zero length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drafter_core::{align::Similarity, geometry::Point};
    /// let t = Similarity::correspondence(
    ///     Point::new(0.0, 0.0),
    ///     Point::new(1.0, 0.0),
    ///     Point::new(5.0, 5.0),
    ///     Point::new(5.0, 15.0),
    /// )
    /// .unwrap();
    /// assert_eq!(t.apply(Point::new(0.0, 0.0)), Point::new(5.0, 5.0));
    /// assert_eq!(t.scale_factor(), 10.0);
    /// ```
    pub fn correspondence(s0: Point, s1: Point, d0: Point, d1: Point) -> Result<Self> {
        let u = s1.sub_point(s0);
        let v = d1.sub_point(d0);
        if u.is_zero() {
            return Err(Error::DegenerateAlignment("source segment has zero length"));
        }
        if v.is_zero() {
            return Err(Error::DegenerateAlignment(
                "destination segment has zero length",
            ));
        }

        // m = v / u
        let denominator = u.dot(u);
        let a = v.dot(u) / denominator;
        let b = u.cross(v) / denominator;

        let mapped = Self {
            a,
            b,
            tx: 0.0,
            ty: 0.0,
        }
        .apply(s0);
        Ok(Self {
            a,
            b,
            tx: d0.x() - mapped.x(),
            ty: d0.y() - mapped.y(),
        })
    }

    fn about(a: f64, b: f64, origin: Point) -> Self {
        let linear = Self {
            a,
            b,
            tx: 0.0,
            ty: 0.0,
        };
        let moved = linear.apply(origin);
        Self {
            a,
            b,
            tx: origin.x() - moved.x(),
            ty: origin.y() - moved.y(),
        }
    }

    /// Map a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x() - self.b * p.y() + self.tx,
            self.b * p.x() + self.a * p.y() + self.ty,
        )
    }

    /// Map a direction; translation does not apply.
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.a * v.x() - self.b * v.y(), self.b * v.x() + self.a * v.y())
    }

    /// Compose: the returned transform applies `self` first, then `next`.
    pub fn then(&self, next: &Similarity) -> Self {
        let translated = next.apply(Point::new(self.tx, self.ty));
        Self {
            a: next.a * self.a - next.b * self.b,
            b: next.a * self.b + next.b * self.a,
            tx: translated.x(),
            ty: translated.y(),
        }
    }

    /// Rotation component in radians.
    pub fn rotation_angle(&self) -> f64 {
        self.b.atan2(self.a)
    }

    /// Uniform scale component (always non-negative).
    pub fn scale_factor(&self) -> f64 {
        self.a.hypot(self.b)
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Self::identity()
    }
}

/// The arc that replaces a corner: trim points on both incident segments and
/// the bulge of the arc running from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fillet {
    pub start: Point,
    pub end: Point,
    /// Ratio of sagitta to half chord; positive for a counter-clockwise arc.
    pub bulge: f64,
}

/// Normalize an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    if angle <= -PI {
        angle += 2.0 * PI;
    } else if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

/// Fillet the corner `a -> b -> c` with an arc of `radius`.
///
/// The turn angle is the signed angle from `b - a` to `c - b`; a left
/// (counter-clockwise) turn yields a positive bulge. The trim distance
/// measured from `b` is `|r / tan(θ / 2)|` where `θ` is the unsigned angle
/// between the two segment directions.
///
/// Trim points are not checked against the segment lengths; callers that
/// chain corners do that themselves.
///
/// # Errors
///
/// [`Error::InvalidFillet`] when the radius is not positive, the points are
/// collinear, either segment is empty, or the half chord between the trim
/// points exceeds the radius (a shallow turn).
pub fn fillet(a: Point, b: Point, c: Point, radius: f64) -> Result<Fillet> {
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(Error::InvalidFillet(format!(
            "radius must be positive, got {radius}"
        )));
    }

    let incoming = b.sub_point(a);
    let outgoing = c.sub_point(b);
    let (Some(v0), Some(v1)) = (incoming.normalize(), outgoing.normalize()) else {
        return Err(Error::InvalidFillet(
            "corner has a zero-length segment".to_string(),
        ));
    };

    let turn = normalize_angle(v1.angle() - v0.angle());
    if turn.sin().abs() < COLLINEAR_EPSILON {
        return Err(Error::InvalidFillet("corner points are collinear".to_string()));
    }

    let angle = turn.abs();
    let tangent = (radius / (angle / 2.0).tan()).abs();

    let start = b.sub_point(v0.scale(tangent));
    let end = b.add_point(v1.scale(tangent));

    let half_chord = start.distance(end) / 2.0;
    if half_chord > radius {
        return Err(Error::InvalidFillet(format!(
            "radius {radius} does not fit a {:.1} degree turn",
            angle.to_degrees()
        )));
    }
    let sagitta = radius - (radius * radius - half_chord * half_chord).sqrt();
    let bulge = turn.signum() * (sagitta / half_chord);

    Ok(Fillet { start, end, bulge })
}

#[cfg(test)]
mod tests {
    use float_cmp::{approx_eq, assert_approx_eq};

    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_correspondence_maps_anchor_exactly() {
        let t = Similarity::correspondence(p(0.0, 0.0), p(1.0, 0.0), p(5.0, 5.0), p(5.0, 15.0))
            .unwrap();

        assert_eq!(t.apply(p(0.0, 0.0)), p(5.0, 5.0));
        assert_eq!(t.apply(p(1.0, 0.0)), p(5.0, 15.0));
        assert_eq!(t.scale_factor(), 10.0);
        assert_approx_eq!(f64, t.rotation_angle(), PI / 2.0);

        let a = t.apply(p(2.0, 3.0));
        let b = t.apply(p(4.0, -1.0));
        assert_approx_eq!(f64, a.distance(b), 10.0 * p(2.0, 3.0).distance(p(4.0, -1.0)));
    }

    #[test]
    fn test_correspondence_degenerate() {
        let err = Similarity::correspondence(p(1.0, 1.0), p(1.0, 1.0), p(0.0, 0.0), p(1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateAlignment(_)));

        let err = Similarity::correspondence(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 2.0), p(2.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateAlignment(_)));
    }

    #[test]
    fn test_rotation_about_origin_point() {
        let t = Similarity::rotation(PI / 2.0, p(1.0, 1.0));
        let r = t.apply(p(2.0, 1.0));
        assert_approx_eq!(f64, r.x(), 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, r.y(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_then_composes_in_order() {
        let scale = Similarity::scaling(2.0, p(0.0, 0.0));
        let shift = Similarity::translation(1.0, 0.0);
        assert_eq!(scale.then(&shift).apply(p(1.0, 1.0)), p(3.0, 2.0));
        assert_eq!(shift.then(&scale).apply(p(1.0, 1.0)), p(4.0, 2.0));
    }

    #[test]
    fn test_fillet_right_angle_left_turn() {
        let f = fillet(p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), 2.0).unwrap();

        assert_approx_eq!(f64, f.start.distance(p(10.0, 0.0)), 2.0, epsilon = 1e-9);
        assert_approx_eq!(f64, f.end.distance(p(10.0, 0.0)), 2.0, epsilon = 1e-9);
        assert_approx_eq!(f64, f.start.y(), 0.0);
        assert_approx_eq!(f64, f.end.x(), 10.0);
        assert!(f.bulge > 0.0);
        assert_approx_eq!(f64, f.bulge, (PI / 8.0).tan(), epsilon = 1e-9);
    }

    #[test]
    fn test_fillet_right_turn_is_negative() {
        let f = fillet(p(0.0, 0.0), p(10.0, 0.0), p(10.0, -10.0), 2.0).unwrap();
        assert!(f.bulge < 0.0);
    }

    #[test]
    fn test_fillet_trim_distance_follows_turn_angle() {
        // 120 degree turn: trim distance r / tan(60°).
        let b = p(10.0, 0.0);
        let c = p(5.0, 5.0 * 3.0_f64.sqrt());
        let f = fillet(p(0.0, 0.0), b, c, 3.0).unwrap();
        assert!(approx_eq!(f64, f.start.distance(b), f.end.distance(b), epsilon = 1e-9));
        assert_approx_eq!(f64, f.start.distance(b), 3.0_f64.sqrt(), epsilon = 1e-9);
        assert_approx_eq!(f64, f.start.distance(f.end), 3.0_f64.sqrt(), epsilon = 1e-9);
        assert!(f.bulge > 0.0);
    }

    #[test]
    fn test_fillet_shallow_turn_is_rejected() {
        let b = p(10.0, 0.0);
        // 30 degree turn: trim distance 7.46, half chord 7.2 > r.
        let err = fillet(p(0.0, 0.0), b, p(10.0 + 5.0 * 3.0_f64.sqrt(), 5.0), 2.0).unwrap_err();
        assert!(matches!(err, Error::InvalidFillet(_)));

        // 60 degree turn: trim distance 3.4641, half chord 3 > r.
        let err = fillet(p(0.0, 0.0), b, p(15.0, 5.0 * 3.0_f64.sqrt()), 2.0).unwrap_err();
        assert!(matches!(err, Error::InvalidFillet(msg) if msg.contains("60.0 degree")));
    }

    #[test]
    fn test_fillet_trim_may_pass_segment_end() {
        // The corner itself does not clip to the segment lengths.
        let f = fillet(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), 5.0).unwrap();
        assert_approx_eq!(f64, f.start.x(), -4.0, epsilon = 1e-9);
        assert_approx_eq!(f64, f.end.y(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert_approx_eq!(f64, normalize_angle(3.0 * PI), PI);
        assert_approx_eq!(f64, normalize_angle(-PI), PI);
        assert_approx_eq!(f64, normalize_angle(PI / 4.0), PI / 4.0);
        assert_approx_eq!(f64, normalize_angle(-3.0 * PI / 2.0), PI / 2.0);
    }
}
