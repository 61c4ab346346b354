//! Composition and curve operations.

use std::f64::consts::PI;

use crate::{
    align::{Fillet, fillet as fillet_corner},
    entity::{Entity, Polycurve, bulge_arc},
    error::{Error, Result},
    features::args::Args,
    geometry::Point,
    node::Node,
    sketch::Sketch,
    value::Value,
};

/// Slack when checking that neighbouring fillets fit on a shared edge.
const EDGE_EPSILON: f64 = 1e-9;

/// Distance under which two curve ends count as the same point.
const JOIN_EPSILON: f64 = 1e-9;

/// `add(sketch, ...)`: append the given sketches as children.
pub(crate) fn add(sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("add", values);
    let children = (0..args.len())
        .filter(|&i| args.get(i).is_some())
        .map(|i| args.sketch(i).cloned())
        .collect::<Result<Vec<_>>>()?;
    Ok(sketch.add(children))
}

/// `new()`: an empty sketch in the caller's context.
pub(crate) fn new(sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    Ok(sketch.blank())
}

/// `close()`: close every polycurve of the subtree.
pub(crate) fn close(mut sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    sketch.node_mut().for_each_mut(&mut |node| {
        for entity in node.entities_mut() {
            if let Entity::Polycurve(curve) = entity {
                curve.set_closed(true);
            }
        }
    });
    Ok(sketch)
}

/// `explode()`: replace every polycurve by its edges, as segments and arcs.
pub(crate) fn explode(mut sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    sketch.node_mut().for_each_mut(&mut |node| {
        let exploded = node
            .entities()
            .iter()
            .flat_map(|entity| match entity {
                Entity::Polycurve(curve) => curve.edges().map(edge_entity).collect(),
                other => vec![other.clone()],
            })
            .collect();
        *node.entities_mut() = exploded;
    });
    Ok(sketch)
}

fn edge_entity((start, end, bulge): (Point, Point, f64)) -> Entity {
    match bulge_arc(start, end, bulge) {
        Some((center, radius, start_angle, end_angle)) => Entity::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        },
        None => Entity::Segment { start, end },
    }
}

/// `join()`: chain the segments, arcs and open polycurves of the subtree
/// into polycurves wherever their ends meet.
///
/// The pieces leave their nodes and the chains are appended as one new
/// child. Pieces are reversed as needed; a chain whose ends meet is closed.
pub(crate) fn join(mut sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    let mut pieces = Vec::new();
    sketch.node_mut().for_each_mut(&mut |node| {
        node.entities_mut().retain(|entity| match open_piece(entity) {
            Some(piece) => {
                pieces.push(piece);
                false
            }
            None => true,
        });
    });
    if pieces.is_empty() {
        return Err(Error::EmptyShape);
    }

    let chains = chain_pieces(pieces).into_iter().map(Entity::Polycurve);
    let child = sketch.with_node(Node::with_entities(chains));
    Ok(sketch.add([child]))
}

/// An entity that can take part in a chain, as an open polycurve.
fn open_piece(entity: &Entity) -> Option<Polycurve> {
    match entity {
        Entity::Segment { start, end } => Some(Polycurve::new(vec![*start, *end], false)),
        Entity::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let sweep = (end_angle - start_angle).rem_euclid(2.0 * PI);
            // Full turns are closed already.
            if sweep == 0.0 {
                return None;
            }
            let at = |angle: f64| {
                center.add_point(Point::new(radius * angle.cos(), radius * angle.sin()))
            };
            Some(Polycurve::with_bulges(
                vec![at(*start_angle), at(*end_angle)],
                vec![(sweep / 4.0).tan()],
                false,
            ))
        }
        Entity::Polycurve(curve) if !curve.is_closed() && curve.vertices().len() >= 2 => {
            Some(curve.clone())
        }
        _ => None,
    }
}

/// A chain under construction: `bulges[i]` is the edge from `vertices[i]`
/// to `vertices[i + 1]`.
struct Chain {
    vertices: Vec<Point>,
    bulges: Vec<f64>,
}

impl Chain {
    fn new(curve: Polycurve) -> Self {
        let edges = curve.vertices().len() - 1;
        Self {
            vertices: curve.vertices().to_vec(),
            bulges: curve.bulges()[..edges].to_vec(),
        }
    }

    fn first(&self) -> Point {
        self.vertices[0]
    }

    fn last(&self) -> Point {
        self.vertices[self.vertices.len() - 1]
    }

    fn is_loop(&self) -> bool {
        self.vertices.len() > 2 && self.first().distance(self.last()) <= JOIN_EPSILON
    }

    /// Attach `piece` after the last vertex, or before the first.
    fn attach(&mut self, piece: Chain, at_end: bool) {
        if at_end {
            self.vertices.extend_from_slice(&piece.vertices[1..]);
            self.bulges.extend(piece.bulges);
        } else {
            let mut vertices = piece.vertices;
            vertices.pop();
            vertices.append(&mut self.vertices);
            self.vertices = vertices;
            let mut bulges = piece.bulges;
            bulges.append(&mut self.bulges);
            self.bulges = bulges;
        }
    }

    /// Which remaining piece continues the chain: its index, whether it goes
    /// at the end, and whether it must be reversed first.
    fn neighbour(&self, pieces: &[Polycurve]) -> Option<(usize, bool, bool)> {
        let meets = |a: Point, b: Point| a.distance(b) <= JOIN_EPSILON;
        pieces.iter().enumerate().find_map(|(i, piece)| {
            let start = piece.vertices()[0];
            let end = piece.vertices()[piece.vertices().len() - 1];
            if meets(self.last(), start) {
                Some((i, true, false))
            } else if meets(self.last(), end) {
                Some((i, true, true))
            } else if meets(self.first(), end) {
                Some((i, false, false))
            } else if meets(self.first(), start) {
                Some((i, false, true))
            } else {
                None
            }
        })
    }

    fn finish(mut self) -> Polycurve {
        let closed = self.is_loop();
        if closed {
            self.vertices.pop();
        }
        Polycurve::with_bulges(self.vertices, self.bulges, closed)
    }
}

fn chain_pieces(mut pieces: Vec<Polycurve>) -> Vec<Polycurve> {
    let mut chains = Vec::new();
    while !pieces.is_empty() {
        let mut chain = Chain::new(pieces.remove(0));
        while !chain.is_loop() {
            let Some((index, at_end, reverse)) = chain.neighbour(&pieces) else {
                break;
            };
            let piece = pieces.remove(index);
            let piece = if reverse { piece.reversed() } else { piece };
            chain.attach(Chain::new(piece), at_end);
        }
        chains.push(chain.finish());
    }
    chains
}

/// `fillet(radius)`: round every straight corner of every polycurve.
///
/// Corners touching an arc edge, and the two ends of an open polycurve, are
/// kept as they are.
pub(crate) fn fillet(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("fillet", values);
    let radius = args.number(0)?;

    let mut filleted = 0usize;
    sketch.node_mut().try_for_each_mut(&mut |node| {
        for entity in node.entities_mut() {
            if let Entity::Polycurve(curve) = entity {
                *curve = fillet_polycurve(curve, radius)?;
                filleted += 1;
            }
        }
        Ok::<(), Error>(())
    })?;

    if filleted == 0 {
        return Err(Error::EmptyShape);
    }
    Ok(sketch)
}

fn fillet_polycurve(curve: &Polycurve, radius: f64) -> Result<Polycurve> {
    let vertices = curve.vertices();
    let bulges = curve.bulges();
    let n = vertices.len();
    if n < 3 {
        return Ok(curve.clone());
    }

    let corners = (0..n)
        .map(|i| {
            let interior = curve.is_closed() || (i > 0 && i < n - 1);
            let prev = (i + n - 1) % n;
            if !interior || bulges[prev] != 0.0 || bulges[i] != 0.0 {
                return Ok(None);
            }
            fillet_corner(vertices[prev], vertices[i], vertices[(i + 1) % n], radius).map(Some)
        })
        .collect::<Result<Vec<Option<Fillet>>>>()?;

    for (i, (start, end, _)) in curve.edges().enumerate() {
        let next = (i + 1) % n;
        let trim_start = corners[i].map_or(0.0, |f| f.end.distance(start));
        let trim_end = corners[next].map_or(0.0, |f| f.start.distance(end));
        if trim_start + trim_end > start.distance(end) + EDGE_EPSILON {
            return Err(Error::InvalidFillet(format!(
                "radius {radius} is too large: neighbouring fillets overlap on edge {i}"
            )));
        }
    }

    let mut out_vertices = Vec::with_capacity(n * 2);
    let mut out_bulges = Vec::with_capacity(n * 2);
    for (i, corner) in corners.iter().enumerate() {
        match corner {
            Some(f) => {
                out_vertices.extend([f.start, f.end]);
                out_bulges.extend([f.bulge, bulges[i]]);
            }
            None => {
                out_vertices.push(vertices[i]);
                out_bulges.push(bulges[i]);
            }
        }
    }
    Ok(Polycurve::with_bulges(
        out_vertices,
        out_bulges,
        curve.is_closed(),
    ))
}
