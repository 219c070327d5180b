//! Execution context tree.
//!
//! Contexts model isolation scopes the way class loaders do in managed
//! runtimes: one node per scope, linked to its parent, forming a tree.
//!
//! ```text
//! root
//! └── shared
//!     ├── webapp-a
//!     └── webapp-b
//! ```
//!
//! A child holds its parent strongly, so the full ancestor chain stays
//! reachable from any live descendant, while dropping a child never
//! affects an ancestor. Identity is carried by [`ContextId`]; two
//! contexts are equal iff their ids are equal, names are diagnostics
//! only.
//!
//! The registry stores [`WeakContext`] handles, which resolve to nothing
//! once every strong handle to a context is gone.

mod current;

pub use current::ContextGuard;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ContextInfo;

/// Stable identity token for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct ContextInner {
    id: ContextId,
    name: String,
    parent: Option<Context>,
}

/// Handle to a node in the execution context tree.
///
/// Cheap to clone; clones share the same identity. Equality and hashing
/// use the id only.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// Create a root context with no parent.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name.into(), None)
    }

    /// Create a child of this context.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::new(name.into(), Some(self.clone()))
    }

    fn new(name: String, parent: Option<Context>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                id: ContextId::new(),
                name,
                parent,
            }),
        }
    }

    /// The context's identity token.
    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// Human-readable name, for diagnostics. Not required to be unique.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The parent context, `None` at the root.
    pub fn parent(&self) -> Option<&Context> {
        self.inner.parent.as_ref()
    }

    /// Whether this context has no parent.
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// Number of ancestors above this context (0 for a root).
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Iterate from this context upward to the root, nearest first.
    pub fn chain(&self) -> ContextChain {
        ContextChain {
            next: Some(self.clone()),
        }
    }

    /// Iterate over the ancestors only, starting at the parent.
    pub fn ancestors(&self) -> ContextChain {
        ContextChain {
            next: self.parent().cloned(),
        }
    }

    /// Downgrade to a weak handle.
    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Snapshot view of this context for diagnostics.
    pub fn info(&self) -> ContextInfo {
        ContextInfo {
            id: self.id(),
            name: self.inner.name.clone(),
            depth: self.depth(),
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Context {}

impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("depth", &self.depth())
            .finish()
    }
}

/// Weak counterpart to [`Context`].
///
/// Upgrades to `None` once every strong handle to the context is gone.
#[derive(Debug, Clone)]
pub struct WeakContext {
    inner: Weak<ContextInner>,
}

impl WeakContext {
    /// Attempt to recover a strong handle.
    pub fn upgrade(&self) -> Option<Context> {
        self.inner.upgrade().map(|inner| Context { inner })
    }
}

/// Iterator over a context and its ancestors, nearest first.
pub struct ContextChain {
    next: Option<Context>,
}

impl Iterator for ContextChain {
    type Item = Context;

    fn next(&mut self) -> Option<Context> {
        let context = self.next.take()?;
        self.next = context.parent().cloned();
        Some(context)
    }
}
