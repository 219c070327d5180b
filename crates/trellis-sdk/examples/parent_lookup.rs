//! Parent extension lookup demo.
//!
//! Boots a parent container hosting a shared counter extension, starts a
//! child container under it, and resolves the parent's instance from the
//! child. Run with:
//!
//! ```bash
//! RUST_LOG=debug cargo run --example parent_lookup
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trellis_sdk::{ContainerConfig, Extension, ExtensionKind, Host};

const COUNTER: ExtensionKind = ExtensionKind::new("counter");

/// A counter shared between a parent container and its children.
struct CounterExtension {
    hits: AtomicU64,
}

impl CounterExtension {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
        }
    }

    fn hit(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Extension for CounterExtension {
    fn kind(&self) -> ExtensionKind {
        COUNTER
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("trellis_sdk=info".parse()?))
        .init();

    let host = Host::new("host");

    let mut parent = host
        .container(ContainerConfig::new("shared"))
        .extension(Arc::new(CounterExtension::new()))
        .build()?;
    let mut child = host
        .container(ContainerConfig::new("webapp"))
        .parent(parent.context().clone())
        .build()?;

    parent.start()?;
    child.start()?;

    // The child resolves the parent's instance and touches its state.
    let inherited = child
        .parent_extension(COUNTER)?
        .expect("parent hosts a counter");
    let counter = inherited
        .as_any()
        .downcast_ref::<CounterExtension>()
        .expect("counter extension");

    info!(hits = counter.hit(), "first lookup from the child");
    info!(hits = counter.hit(), "same instance, shared state");

    let stats = host.stats()?;
    info!(
        total = stats.total_entries,
        live = stats.live_entries,
        "registry before shutdown"
    );

    child.shutdown()?;
    parent.shutdown()?;

    // The parent's entry is gone; a fresh lookup finds nothing.
    assert!(child.parent_extension(COUNTER)?.is_none());
    info!("shut down cleanly");

    Ok(())
}
