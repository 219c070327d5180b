//! Host facade.
//!
//! Owns the process-lifetime pieces: the root execution context and the
//! shared extension registry. Containers built through the host are
//! pre-wired with both, so the registry is injected explicitly instead of
//! living in a global.

use std::sync::Arc;

use trellis_core::{Context, ExtensionRegistry, RegistryStats};

use crate::config::ContainerConfig;
use crate::container::ContainerBuilder;
use crate::error::SdkResult;

/// Process-lifetime wiring for containers.
///
/// # Example
///
/// ```rust,no_run
/// use trellis_sdk::{ContainerConfig, Host};
///
/// fn example() -> trellis_sdk::SdkResult<()> {
///     let host = Host::new("host");
///     let mut container = host.container(ContainerConfig::new("webapp")).build()?;
///     container.start()?;
///     container.shutdown()?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Host {
    root: Context,
    registry: Arc<ExtensionRegistry>,
}

impl Host {
    /// Create a host with a root context of the given name.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: Context::root(root_name),
            registry: Arc::new(ExtensionRegistry::new()),
        }
    }

    /// The root context every hosted container descends from.
    pub fn root(&self) -> &Context {
        &self.root
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// Start building a container wired to this host's root context and
    /// registry. Call [`ContainerBuilder::parent`] to nest it elsewhere.
    pub fn container(&self, config: ContainerConfig) -> ContainerBuilder {
        ContainerBuilder::new(config)
            .parent(self.root.clone())
            .registry(Arc::clone(&self.registry))
    }

    /// Aggregate registry counters.
    pub fn stats(&self) -> SdkResult<RegistryStats> {
        Ok(self.registry.stats()?)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new("root")
    }
}
