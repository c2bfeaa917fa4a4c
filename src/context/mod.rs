//! Layered application context.
//!
//! A [`Context`] is an immutable chain of key/value layers. Writing returns a
//! new child layer and never touches the parent; reading walks from the newest
//! layer toward the root and stops at the first layer carrying the key.
//!
//! The orchestrator owns the current context and replaces it on every write
//! during startup. Nothing writes to it once the server is running, except the
//! datasource on shutdown.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Well-known context keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// Resolved application properties.
    Application,
    /// Live relational datastore handle.
    Relational,
    /// Live document datastore handle.
    Document,
    /// Registered entity descriptors.
    Entities,
}

type Value = Arc<dyn Any + Send + Sync>;

struct Layer {
    key: ContextKey,
    /// `None` masks any value the parents hold for `key`.
    value: Option<Value>,
    parent: Option<Arc<Layer>>,
}

/// Immutable, replace-on-write key/value chain.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Layer>>,
}

impl Context {
    /// Empty root context.
    pub fn root() -> Self {
        Self::default()
    }

    /// A child context carrying `value` under `key`.
    pub fn with_value<T>(&self, key: ContextKey, value: T) -> Context
    where
        T: Any + Send + Sync,
    {
        self.push(key, Some(Arc::new(value)))
    }

    /// A child context in which `key` reads as absent.
    pub fn without(&self, key: ContextKey) -> Context {
        self.push(key, None)
    }

    /// Value stored under `key`, if the nearest layer for it holds a `T`.
    pub fn value<T>(&self, key: ContextKey) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            if current.key == key {
                return current.value.as_deref().and_then(|v| v.downcast_ref::<T>());
            }
            layer = current.parent.as_deref();
        }
        None
    }

    /// Whether some value is visible under `key`.
    pub fn contains(&self, key: ContextKey) -> bool {
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            if current.key == key {
                return current.value.is_some();
            }
            layer = current.parent.as_deref();
        }
        false
    }

    /// Number of layers between this context and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            depth += 1;
            layer = current.parent.as_deref();
        }
        depth
    }

    fn push(&self, key: ContextKey, value: Option<Value>) -> Context {
        Context {
            head: Some(Arc::new(Layer {
                key,
                value,
                parent: self.head.clone(),
            })),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            keys.push((current.key, current.value.is_some()));
            layer = current.parent.as_deref();
        }
        f.debug_struct("Context").field("layers", &keys).finish()
    }
}
