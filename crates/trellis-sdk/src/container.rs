//! Container lifecycle.
//!
//! A [`Container`] owns one execution context and the extension instances
//! hosted under it. Bootstrap registers every hosted extension with the
//! shared registry; shutdown unregisters them again. Extension code
//! running inside the container resolves parent instances through the
//! same context.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use trellis_core::{Context, ContextGuard, Extension, ExtensionKind, ExtensionRegistry};

use crate::config::ContainerConfig;
use crate::error::{SdkError, SdkResult};

/// Lifecycle state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    /// Built but not started; nothing registered yet.
    Created,
    /// Started; hosted extensions are registered.
    Started,
    /// Shut down; hosted extensions are unregistered. Terminal.
    Stopped,
}

/// A container hosting extensions under its own execution context.
pub struct Container {
    config: ContainerConfig,
    context: Context,
    registry: Arc<ExtensionRegistry>,
    extensions: Vec<Arc<dyn Extension>>,
    state: ContainerState,
}

impl Container {
    /// Start building a container with the given configuration.
    pub fn builder(config: ContainerConfig) -> ContainerBuilder {
        ContainerBuilder::new(config)
    }

    /// The container's name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The container's execution context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// The extensions this container hosts.
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    /// Make this container's context the calling thread's current
    /// context, so arbitrary caller code observes what hosted extension
    /// code would observe.
    pub fn enter(&self) -> ContextGuard {
        self.context.enter()
    }

    /// Register every hosted extension under this container's context.
    ///
    /// Idempotent while started. Starting a stopped container is an
    /// invalid operation.
    pub fn start(&mut self) -> SdkResult<()> {
        match self.state {
            ContainerState::Started => return Ok(()),
            ContainerState::Stopped => {
                return Err(SdkError::invalid_operation(format!(
                    "container '{}' is stopped and cannot be restarted",
                    self.config.name
                )));
            }
            ContainerState::Created => {}
        }

        if self.config.warn_on_duplicate_kinds {
            self.warn_duplicate_kinds();
        }

        let _guard = self.context.enter();
        for extension in &self.extensions {
            self.registry.register(Arc::clone(extension))?;
        }

        self.state = ContainerState::Started;
        info!(
            container = %self.config.name,
            extensions = self.extensions.len(),
            "container started"
        );
        Ok(())
    }

    /// Unregister every hosted kind from this container's context.
    ///
    /// Tolerant of repeat calls and of shutdown before start.
    pub fn shutdown(&mut self) -> SdkResult<()> {
        if self.state != ContainerState::Started {
            self.state = ContainerState::Stopped;
            return Ok(());
        }

        let kinds: HashSet<ExtensionKind> = self
            .extensions
            .iter()
            .map(|extension| extension.kind())
            .collect();

        let _guard = self.context.enter();
        let mut removed = 0;
        for kind in kinds {
            removed += self.registry.unregister(kind)?;
        }

        self.state = ContainerState::Stopped;
        info!(
            container = %self.config.name,
            removed,
            "container shut down"
        );
        Ok(())
    }

    /// Look up the extension of the given kind registered under this
    /// container's parent context.
    pub fn parent_extension(&self, kind: ExtensionKind) -> SdkResult<Option<Arc<dyn Extension>>> {
        let _guard = self.context.enter();
        Ok(self.registry.parent_extension(kind)?)
    }

    fn warn_duplicate_kinds(&self) {
        let mut seen = HashSet::new();
        for extension in &self.extensions {
            let kind = extension.kind();
            if !seen.insert(kind) {
                warn!(
                    container = %self.config.name,
                    kind = %kind,
                    "multiple hosted extensions share a kind"
                );
            }
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

/// Builder errors
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Builder for [`Container`] instances with fluent API
pub struct ContainerBuilder {
    config: ContainerConfig,
    parent: Option<Context>,
    registry: Option<Arc<ExtensionRegistry>>,
    extensions: Vec<Arc<dyn Extension>>,
}

impl ContainerBuilder {
    /// Create a new container builder with the given configuration
    pub fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            parent: None,
            registry: None,
            extensions: Vec::new(),
        }
    }

    /// Set the parent context; without one the container gets a root context
    pub fn parent(mut self, parent: Context) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the shared registry (required)
    pub fn registry(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Add a hosted extension
    pub fn extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Add several hosted extensions
    pub fn extensions(mut self, extensions: impl IntoIterator<Item = Arc<dyn Extension>>) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// Validate the configuration and build the container
    pub fn build(self) -> SdkResult<Container> {
        self.config.validate()?;
        let registry = self.registry.ok_or(BuilderError::MissingField("registry"))?;

        let context = match &self.parent {
            Some(parent) => parent.child(&self.config.name),
            None => Context::root(&self.config.name),
        };

        Ok(Container {
            config: self.config,
            context,
            registry,
            extensions: self.extensions,
            state: ContainerState::Created,
        })
    }
}
