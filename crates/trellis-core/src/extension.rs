//! Extension trait and kind tags.
//!
//! Extensions are the units the registry tracks. Each extension declares
//! a [`ExtensionKind`], a process-wide tag that stands in for its type:
//! registry matching compares kinds, never runtime types. Callers that
//! need the concrete type behind a registry result go through
//! [`Extension::as_any`] and downcast.

use std::any::Any;
use std::fmt;

use serde::Serialize;

/// Tag identifying an extension's kind.
///
/// Declared as a `const` next to the extension it describes:
///
/// ```
/// use trellis_core::ExtensionKind;
///
/// const METRICS: ExtensionKind = ExtensionKind::new("metrics");
/// assert_eq!(METRICS.as_str(), "metrics");
/// ```
///
/// Kinds compare by value; two kinds with the same tag string are the
/// same kind wherever they were declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExtensionKind(&'static str);

impl ExtensionKind {
    /// Create a kind tag from a static string.
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    /// The tag string.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An extension instance the registry can track.
///
/// Implementations are shared as `Arc<dyn Extension>`; the registry
/// itself only ever holds weak references to them.
pub trait Extension: Send + Sync {
    /// The kind tag the registry matches on.
    fn kind(&self) -> ExtensionKind;

    /// Access to the concrete type, for downcasting a lookup result.
    fn as_any(&self) -> &dyn Any;
}
