//! trellis-core - Execution contexts and the hierarchical extension registry
//!
//! This crate provides the building blocks for containers with hierarchic
//! scopes:
//!
//! - **context**: the execution context tree and per-thread ambient
//!   current-context tracking
//! - **extension**: the `Extension` trait and `ExtensionKind` tags
//! - **registry**: the process-wide context-to-extension registry
//! - **types**: serializable diagnostic views
//!
//! # Example
//!
//! ```rust
//! use std::any::Any;
//! use std::sync::Arc;
//! use trellis_core::{Context, Extension, ExtensionKind, ExtensionRegistry};
//!
//! const METRICS: ExtensionKind = ExtensionKind::new("metrics");
//!
//! struct Metrics;
//!
//! impl Extension for Metrics {
//!     fn kind(&self) -> ExtensionKind { METRICS }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! fn example() -> trellis_core::Result<()> {
//!     let registry = ExtensionRegistry::new();
//!     let parent = Context::root("shared");
//!     let child = parent.child("webapp");
//!
//!     // The registry stores weak references only, so the caller keeps
//!     // the strong handle.
//!     let metrics: Arc<dyn Extension> = Arc::new(Metrics);
//!     {
//!         let _guard = parent.enter();
//!         registry.register(Arc::clone(&metrics))?;
//!     }
//!
//!     let _guard = child.enter();
//!     let inherited = registry.parent_extension(METRICS)?;
//!     assert!(inherited.is_some());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod context;
pub mod error;
pub mod extension;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use context::{Context, ContextGuard, ContextId, WeakContext};
pub use error::{Error, Result};
pub use extension::{Extension, ExtensionKind};
pub use registry::ExtensionRegistry;
pub use types::{ContextInfo, RegistryEntryInfo, RegistryStats};
