//! Drafter Core Types and Evaluation
//!
//! This crate provides the scene graph and the feature engine behind
//! parametric sketches. It includes:
//!
//! - **Geometry**: points and bounds ([`geometry`] module)
//! - **Entities**: the payloads a node carries ([`entity`] module)
//! - **Styles**: stroke, fill and opacity with inheritance ([`style`], [`color`])
//! - **Scene graph**: [`Node`] with lazy traversal ([`node`] module)
//! - **Dispatch**: [`Sketch`] handles, the [`Registry`] and built-in [`features`]
//! - **Alignment**: the similarity transform and fillet math ([`align`] module)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use drafter_core::{Registry, Sketch, Value};
//!
//! let registry = Arc::new(Registry::with_builtins());
//! let sketch = Sketch::new(registry)
//!     .call("rectangle", &[0.0.into(), 0.0.into(), 20.0.into(), 10.0.into()])
//!     .and_then(|s| s.call("fillet", &[2.0.into()]))
//!     .and_then(|s| s.call("stroke", &[Value::from("red")]))
//!     .unwrap();
//!
//! assert_eq!(sketch.node().feature(), Some("stroke"));
//! ```

pub mod align;
pub mod color;
pub mod entity;
pub mod error;
pub mod features;
pub mod geometry;
pub mod node;
pub mod registry;
pub mod sketch;
pub mod style;
pub mod value;

pub use entity::Entity;
pub use error::{Error, Result};
pub use node::{Node, NodeId, Order};
pub use registry::{FeatureFn, Registry};
pub use sketch::{MAX_CALL_DEPTH, Sketch};
pub use value::Value;
