//! Trellis SDK - Container Lifecycle Around the Extension Registry
//!
//! This crate wires the core registry into a usable container runtime:
//!
//! # Core Modules (from trellis-core)
//!
//! - **context** - Execution context tree and ambient current context
//! - **extension** - Extension trait and kind tags
//! - **registry** - The context-to-extension registry
//!
//! # SDK Modules
//!
//! - **container** - Container lifecycle (bootstrap registers, shutdown
//!   unregisters)
//! - **config** - Container configuration and validation
//! - **host** - Process-lifetime wiring (root context + shared registry)
//!
//! # Example
//!
//! ```rust
//! use std::any::Any;
//! use std::sync::Arc;
//! use trellis_sdk::{ContainerConfig, Extension, ExtensionKind, Host};
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
//! fn example() -> trellis_sdk::SdkResult<()> {
//!     let host = Host::new("host");
//!
//!     let mut parent = host
//!         .container(ContainerConfig::new("shared"))
//!         .extension(Arc::new(Metrics))
//!         .build()?;
//!     let mut child = host
//!         .container(ContainerConfig::new("webapp"))
//!         .parent(parent.context().clone())
//!         .build()?;
//!
//!     parent.start()?;
//!     child.start()?;
//!
//!     // The webapp sees the instance its parent registered.
//!     let inherited = child.parent_extension(METRICS)?;
//!     assert!(inherited.is_some());
//!
//!     child.shutdown()?;
//!     parent.shutdown()?;
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

// Re-export core modules from trellis-core

/// Execution context tree and ambient current context
pub use trellis_core::context;

/// Extension trait and kind tags
pub use trellis_core::extension;

/// The context-to-extension registry
pub use trellis_core::registry;

// SDK modules
pub mod config;
pub mod container;
pub mod error;
pub mod host;

// Re-export commonly used types
pub use trellis_core::{
    Context, ContextGuard, ContextId, Extension, ExtensionKind, ExtensionRegistry, RegistryStats,
    WeakContext,
};

pub use config::{ConfigValidationError, ContainerConfig};
pub use container::{BuilderError, Container, ContainerBuilder, ContainerState};
pub use error::{SdkError, SdkResult};
pub use host::Host;
