//! The scene graph: a tree of exclusively owned [`Node`]s.
//!
//! Each node owns its entities and its children, so the tree cannot contain
//! cycles or shared subtrees. Cloning a node deep-copies the whole subtree
//! while keeping node ids; [`Node::new`] always mints a fresh id.
//!
//! Traversal is lazy through [`Traverse`], in either breadth-first
//! ([`Order::Level`]) or depth-first pre-order ([`Order::Pre`]).

use std::{collections::VecDeque, fmt};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::{
    align::Similarity,
    entity::Entity,
    error::{Error, Result},
    style::Style,
};

/// Process-unique identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which feature produced a node.
///
/// Dispatch writes [`Provenance::Stamped`] after every call. A feature that
/// names its output itself writes [`Provenance::Explicit`], which dispatch
/// leaves untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Provenance {
    #[default]
    None,
    Stamped(String),
    Explicit(String),
}

impl Provenance {
    pub fn feature(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Stamped(name) | Self::Explicit(name) => Some(name),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.feature().serialize(serializer)
    }
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Traversal order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Breadth-first.
    #[default]
    Level,
    /// Depth-first pre-order: a node before its descendants, children in order.
    Pre,
}

/// A node of the sketch scene graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    id: NodeId,
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(rename = "feature")]
    provenance: Provenance,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    hidden: bool,
    /// Draw order among siblings; higher draws later.
    #[serde(skip_serializing_if = "is_zero")]
    z: f64,
    #[serde(skip_serializing_if = "Style::is_empty")]
    style: Style,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entities: Vec<Entity>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    /// An empty node with a fresh id.
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            name: String::new(),
            provenance: Provenance::None,
            hidden: false,
            z: 0.0,
            style: Style::default(),
            entities: Vec::new(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// A fresh node owning `entities`.
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The label, empty when unnamed.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Name of the feature that last produced this node.
    pub fn feature(&self) -> Option<&str> {
        self.provenance.feature()
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Record the producing feature explicitly; dispatch will not overwrite it.
    pub fn set_feature(&mut self, feature: impl Into<String>) {
        self.provenance = Provenance::Explicit(feature.into());
    }

    pub(crate) fn set_provenance(&mut self, provenance: Provenance) {
        self.provenance = provenance;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn set_z(&mut self, z: f64) {
        self.z = z;
    }

    /// Children sorted by draw order. Equal orders keep insertion order.
    pub fn children_by_z(&self) -> Vec<&Node> {
        let mut children: Vec<&Node> = self.children.iter().collect();
        children.sort_by(|a, b| a.z.total_cmp(&b.z));
        children
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    /// Entities owned directly by this node.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    pub fn push_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn attributes(&self) -> &IndexMap<String, serde_json::Value> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Lazily visit this node and its descendants.
    pub fn traverse(&self, order: Order) -> Traverse<'_> {
        Traverse {
            order,
            pending: VecDeque::from([self]),
        }
    }

    /// The first node matching `predicate` in the given order.
    pub fn find<P>(&self, predicate: P, order: Order) -> Option<&Node>
    where
        P: FnMut(&&Node) -> bool,
    {
        self.traverse(order).find(predicate)
    }

    /// The first entity of the first node (in level order) that owns any.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyShape`] when no node in the subtree owns an entity.
    pub fn first_entity(&self) -> Result<&Entity> {
        self.find(|node| !node.entities.is_empty(), Order::Level)
            .and_then(|node| node.entities.first())
            .ok_or(Error::EmptyShape)
    }

    /// Every entity of the subtree, node by node in the given order.
    pub fn subtree_entities(&self, order: Order) -> impl Iterator<Item = &Entity> + '_ {
        self.traverse(order).flat_map(|node| node.entities.iter())
    }

    /// Apply `t` to every entity of the subtree.
    pub fn transform(&mut self, t: &Similarity) {
        self.for_each_mut(&mut |node| {
            for entity in &mut node.entities {
                *entity = entity.transform(t);
            }
        });
    }

    /// Visit every node of the subtree mutably, in depth-first pre-order.
    pub fn for_each_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    /// Like [`Node::for_each_mut`], stopping at the first error.
    pub fn try_for_each_mut<F, E>(&mut self, f: &mut F) -> std::result::Result<(), E>
    where
        F: FnMut(&mut Node) -> std::result::Result<(), E>,
    {
        f(self)?;
        for child in &mut self.children {
            child.try_for_each_mut(f)?;
        }
        Ok(())
    }

    /// Number of nodes in the subtree, including this one.
    pub fn node_count(&self) -> usize {
        self.traverse(Order::Pre).count()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator returned by [`Node::traverse`].
#[derive(Debug, Clone)]
pub struct Traverse<'a> {
    order: Order,
    pending: VecDeque<&'a Node>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            Order::Level => {
                let node = self.pending.pop_front()?;
                self.pending.extend(node.children.iter());
                Some(node)
            }
            Order::Pre => {
                let node = self.pending.pop_back()?;
                self.pending.extend(node.children.iter().rev());
                Some(node)
            }
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::Point;

    fn tree_strategy() -> impl Strategy<Value = Node> {
        let leaf = prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 0..3).prop_map(
            |points| {
                Node::with_entities(points.into_iter().map(|(x, y)| Entity::Point {
                    position: Point::new(x, y),
                }))
            },
        );
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(|children| {
                children
                    .into_iter()
                    .fold(Node::new(), |node, child| node.with_child(child))
            })
        })
    }

    /// Mutating every node of a clone never shows through the original.
    fn check_clone_independence(original: Node) -> std::result::Result<(), TestCaseError> {
        let snapshot = original.clone();
        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);

        copy.for_each_mut(&mut |node| {
            node.set_name("mutated");
            node.set_hidden(true);
            node.push_entity(Entity::Point {
                position: Point::new(0.0, 0.0),
            });
        });
        copy.transform(&Similarity::translation(1.0, 1.0));

        prop_assert_eq!(&original, &snapshot);
        prop_assert_eq!(copy.node_count(), original.node_count());
        let ids: Vec<_> = copy.traverse(Order::Pre).map(Node::id).collect();
        let original_ids: Vec<_> = original.traverse(Order::Pre).map(Node::id).collect();
        prop_assert_eq!(ids, original_ids);
        Ok(())
    }

    /// Both orders visit every node exactly once.
    fn check_orders_visit_all(tree: Node) -> std::result::Result<(), TestCaseError> {
        let mut level: Vec<_> = tree.traverse(Order::Level).map(Node::id).collect();
        let mut pre: Vec<_> = tree.traverse(Order::Pre).map(Node::id).collect();
        prop_assert_eq!(level.first(), pre.first());
        level.sort_by_key(|id| id.to_string());
        pre.sort_by_key(|id| id.to_string());
        prop_assert_eq!(level, pre);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_clone_independence(tree in tree_strategy()) {
            check_clone_independence(tree)?;
        }

        #[test]
        fn prop_orders_visit_all(tree in tree_strategy()) {
            check_orders_visit_all(tree)?;
        }
    }
}
