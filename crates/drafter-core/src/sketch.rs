//! The sketch handle and feature dispatch.
//!
//! A [`Sketch`] owns one scene [`Node`] plus the context it is evaluated in:
//! the frozen [`Registry`] and the current call depth. Every transformation
//! consumes or clones a handle and yields a new one, so a node that is
//! reachable from a handle is never shared with another handle.
//!
//! # Provenance
//!
//! [`Sketch::call`] hands the transform a copy whose provenance is reset to
//! "stamped", and stamps the result with the called name afterwards unless
//! the transform recorded an explicit name itself ([`Node::set_feature`]).
//! With nested calls the outermost dispatch therefore has the final say,
//! while explicit names survive every enclosing call.

use std::{fmt, sync::Arc};

use log::{debug, trace};

use crate::{
    entity::Entity,
    error::{Error, Result},
    node::{Node, Provenance},
    registry::Registry,
    value::Value,
};

/// Maximum nesting of feature calls before dispatch fails with
/// [`Error::RecursionLimit`].
///
/// Every level of a user feature runs through the interpreter as well, so
/// the limit must fit a default 2 MiB thread stack in unoptimized builds.
pub const MAX_CALL_DEPTH: usize = 24;

/// A handle on a scene node, bound to a feature registry.
#[derive(Clone)]
pub struct Sketch {
    node: Node,
    registry: Arc<Registry>,
    depth: usize,
}

impl Sketch {
    /// An empty sketch evaluated against `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            node: Node::new(),
            registry,
            depth: 0,
        }
    }

    /// An empty sketch in the same evaluation context.
    pub fn blank(&self) -> Self {
        self.with_node(Node::new())
    }

    /// Wrap `node` in this handle's evaluation context.
    pub fn with_node(&self, node: Node) -> Self {
        Self {
            node,
            registry: Arc::clone(&self.registry),
            depth: self.depth,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Current call nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Invoke the feature registered as `name` on a copy of this sketch.
    ///
    /// The receiver is never modified.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownFeature`] if nothing is registered under `name`
    /// - [`Error::RecursionLimit`] if calls nest deeper than [`MAX_CALL_DEPTH`]
    /// - any error raised by the transform, unchanged
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Sketch> {
        let feature = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))?;
        if self.depth >= MAX_CALL_DEPTH {
            return Err(Error::RecursionLimit {
                feature: name.to_string(),
                limit: MAX_CALL_DEPTH,
            });
        }

        trace!(feature = name, depth = self.depth, args = args.len(); "Dispatching feature");

        let mut input = self.clone();
        input.depth += 1;
        input
            .node
            .set_provenance(Provenance::Stamped(name.to_string()));

        let mut output = feature(input, args).inspect_err(|err| {
            debug!(feature = name, kind = err.kind(); "Feature failed");
        })?;

        output.depth = self.depth;
        if !output.node.provenance().is_explicit() {
            output
                .node
                .set_provenance(Provenance::Stamped(name.to_string()));
        }
        Ok(output)
    }

    /// Append the nodes of `sketches` as children, in order.
    pub fn add(mut self, sketches: impl IntoIterator<Item = Sketch>) -> Sketch {
        self.node
            .children_mut()
            .extend(sketches.into_iter().map(Sketch::into_node));
        self
    }

    /// Append `entity` to this sketch's own node.
    pub fn push_entity(mut self, entity: Entity) -> Sketch {
        self.node.push_entity(entity);
        self
    }

    /// First entity of the sketch in level order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyShape`] if the sketch holds no entity.
    pub fn first_entity(&self) -> Result<&Entity> {
        self.node.first_entity()
    }
}

impl PartialEq for Sketch {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl fmt::Debug for Sketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sketch")
            .field("node", &self.node)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn leaf(sketch: Sketch, _: &[Value]) -> Result<Sketch> {
        Ok(sketch.push_entity(Entity::Point {
            position: Point::new(0.0, 0.0),
        }))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("inner", leaf);
        registry.register("middle", |sketch: Sketch, _: &[Value]| {
            sketch.call("inner", &[])
        });
        registry.register("outer", |sketch: Sketch, _: &[Value]| {
            sketch.call("middle", &[])
        });
        registry.register("explicit", |sketch: Sketch, _: &[Value]| {
            let mut out = sketch.call("inner", &[])?;
            out.node_mut().set_feature("custom");
            Ok(out)
        });
        registry.register("wraps_explicit", |sketch: Sketch, _: &[Value]| {
            sketch.call("explicit", &[])
        });
        registry.register("forever", |sketch: Sketch, _: &[Value]| {
            sketch.call("forever", &[])
        });
        registry.register("fail", |_: Sketch, _: &[Value]| Err(Error::EmptyShape));
        registry
    }

    fn root() -> Sketch {
        Sketch::new(Arc::new(registry()))
    }

    #[test]
    fn test_unknown_feature_leaves_input_untouched() {
        let sketch = root();
        let before = sketch.node().clone();
        let err = sketch.call("missing", &[]).unwrap_err();
        assert_eq!(err, Error::UnknownFeature("missing".to_string()));
        assert_eq!(sketch.node(), &before);
    }

    #[test]
    fn test_call_does_not_mutate_receiver() {
        let sketch = root();
        let out = sketch.call("inner", &[]).unwrap();
        assert!(sketch.node().entities().is_empty());
        assert_eq!(sketch.node().feature(), None);
        assert_eq!(out.node().entities().len(), 1);
        assert_eq!(out.node().feature(), Some("inner"));
    }

    #[test]
    fn test_outermost_stamp_wins() {
        let out = root().call("outer", &[]).unwrap();
        assert_eq!(out.node().feature(), Some("outer"));
        assert_eq!(out.depth(), 0);
    }

    #[test]
    fn test_explicit_name_survives_outer_calls() {
        let out = root().call("explicit", &[]).unwrap();
        assert_eq!(out.node().feature(), Some("custom"));

        let out = root().call("wraps_explicit", &[]).unwrap();
        assert_eq!(out.node().feature(), Some("custom"));
    }

    #[test]
    fn test_recursion_limit() {
        let err = root().call("forever", &[]).unwrap_err();
        assert_eq!(
            err,
            Error::RecursionLimit {
                feature: "forever".to_string(),
                limit: MAX_CALL_DEPTH,
            }
        );
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let err = root().call("fail", &[]).unwrap_err();
        assert_eq!(err, Error::EmptyShape);
    }

    #[test]
    fn test_add_appends_children_in_order() {
        let base = root();
        let a = base.call("inner", &[]).unwrap();
        let b = base.blank();
        let (a_id, b_id) = (a.node().id(), b.node().id());

        let combined = base.clone().add([a, b]);
        let ids: Vec<_> = combined.node().children().iter().map(Node::id).collect();
        assert_eq!(ids, [a_id, b_id]);
        assert_eq!(combined.node().id(), base.node().id());
    }
}
