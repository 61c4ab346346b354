//! Feature registry: the name -> transform table used by dispatch.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use log::debug;

use crate::{error::Result, features, sketch::Sketch, value::Value};

/// A registered transform. It receives a private copy of the caller's handle
/// and returns the handle it produced.
pub type FeatureFn = dyn Fn(Sketch, &[Value]) -> Result<Sketch> + Send + Sync;

/// Maps feature names to transforms.
///
/// A registry is built up front and then frozen behind an [`Arc`] inside
/// every [`Sketch`] evaluated against it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use drafter_core::{Registry, Sketch, Value};
///
/// let mut registry = Registry::with_builtins();
/// registry.register("unit_square", |sketch: Sketch, _args: &[Value]| {
///     sketch.call("rectangle", &[0.0.into(), 0.0.into(), 1.0.into(), 1.0.into()])
/// });
///
/// let sketch = Sketch::new(Arc::new(registry)).call("unit_square", &[]).unwrap();
/// assert_eq!(sketch.node().feature(), Some("unit_square"));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    features: IndexMap<String, Arc<FeatureFn>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in feature.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        features::register_builtins(&mut registry);
        registry
    }

    /// Register `feature` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, feature: F)
    where
        F: Fn(Sketch, &[Value]) -> Result<Sketch> + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(feature));
    }

    /// Register an already shared transform.
    pub fn register_shared(&mut self, name: impl Into<String>, feature: Arc<FeatureFn>) {
        let name = name.into();
        if self.features.insert(name.clone(), feature).is_some() {
            debug!(feature = name; "Replaced registered feature");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<FeatureFn>> {
        self.features.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Dispatch `name` on `handle`. Same as [`Sketch::call`].
    pub fn call(&self, handle: &Sketch, name: &str, args: &[Value]) -> Result<Sketch> {
        handle.call(name, args)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("features", &self.features.keys().collect::<Vec<_>>())
            .finish()
    }
}
