//! Hierarchical extension registry.
//!
//! Associates execution contexts with the extension instances registered
//! under them, so that a child context can find the instance its parent
//! registered. Built for containers with hierarchic scopes: one shared
//! registry per process, one entry per registration.
//!
//! The registry stores weak references only. It must never be the reason
//! a context or an extension survives, so entries go stale when their
//! referents are reclaimed and are purged lazily during [`unregister`]
//! scans. Lookups skip stale entries without purging them.
//!
//! [`unregister`]: ExtensionRegistry::unregister

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::context::{Context, WeakContext};
use crate::error::{Error, Result};
use crate::extension::{Extension, ExtensionKind};
use crate::types::{RegistryEntryInfo, RegistryStats};

struct Entry {
    context: WeakContext,
    extension: Weak<dyn Extension>,
    registered_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.context.upgrade().is_some() && self.extension.upgrade().is_some()
    }
}

/// Process-wide registry mapping contexts to extension instances.
///
/// All operations resolve the caller's context from the thread's ambient
/// state (see [`Context::enter`]) rather than taking one as an argument.
/// Every operation serializes on one internal lock, so each
/// scan-and-mutate sequence is atomic with respect to the others.
pub struct ExtensionRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Entry>>> {
        self.entries.lock().map_err(|_| Error::LockPoisoned)
    }

    fn current_context() -> Result<Context> {
        Context::current().ok_or(Error::NoCurrentContext)
    }

    /// Register an extension under the calling thread's current context.
    ///
    /// Called once per extension instance during container bootstrap.
    /// Only downgraded references are stored; the strong reference passed
    /// in is dropped on return. Repeated registration of the same
    /// instance is additive, yielding one entry per call.
    pub fn register(&self, extension: Arc<dyn Extension>) -> Result<()> {
        let context = Self::current_context()?;
        let kind = extension.kind();

        let mut entries = self.lock()?;
        entries.push(Entry {
            context: context.downgrade(),
            extension: Arc::downgrade(&extension),
            registered_at: Utc::now(),
        });

        debug!(kind = %kind, context = %context, "registered extension");
        Ok(())
    }

    /// Remove entries of the given kind belonging to the current context
    /// or any of its descendants, plus stale entries met along the way.
    ///
    /// Called once per hosted kind during container shutdown. An entry is
    /// a removal candidate if its context is gone, its extension is gone,
    /// or its live extension matches `kind`. A candidate with a dead
    /// context is removed outright; otherwise it is removed iff the
    /// current context appears somewhere on the candidate's own chain up
    /// to the root. Entries under unrelated contexts, and under ancestors
    /// whose chains do not pass through the current context, survive.
    ///
    /// Returns the number of entries removed.
    pub fn unregister(&self, kind: ExtensionKind) -> Result<usize> {
        let current = Self::current_context()?;

        let mut entries = self.lock()?;
        let before = entries.len();

        entries.retain(|entry| {
            // Dead context: stale, purged whatever the kind or the
            // current context.
            let Some(entry_context) = entry.context.upgrade() else {
                return false;
            };

            let candidate = match entry.extension.upgrade() {
                Some(extension) => extension.kind() == kind,
                None => true,
            };
            if !candidate {
                return true;
            }

            // Walk the entry's whole chain; the walk runs to the root
            // even after a match.
            let mut matched = false;
            for ancestor in entry_context.chain() {
                if ancestor == current {
                    matched = true;
                }
            }
            !matched
        });

        let removed = before - entries.len();
        debug!(kind = %kind, context = %current, removed, "unregistered extensions");
        Ok(removed)
    }

    /// Find the extension of the given kind registered under the direct
    /// parent of the current context.
    ///
    /// Exactly one level up: entries under grandparents or siblings never
    /// match. Returns `Ok(None)` when the current context is a root, when
    /// no entry matches, or when the matching entry has gone stale. Stale
    /// entries are skipped, not purged.
    pub fn parent_extension(&self, kind: ExtensionKind) -> Result<Option<Arc<dyn Extension>>> {
        let current = Self::current_context()?;
        let Some(parent) = current.parent() else {
            return Ok(None);
        };

        let entries = self.lock()?;
        for entry in entries.iter() {
            let Some(entry_context) = entry.context.upgrade() else {
                continue;
            };
            if entry_context != *parent {
                continue;
            }
            let Some(extension) = entry.extension.upgrade() else {
                continue;
            };
            if extension.kind() == kind {
                debug!(kind = %kind, parent = %entry_context, "found parent extension");
                return Ok(Some(extension));
            }
        }
        Ok(None)
    }

    /// Aggregate counters over the current entry set.
    pub fn stats(&self) -> Result<RegistryStats> {
        let entries = self.lock()?;
        let total_entries = entries.len();
        let live_entries = entries.iter().filter(|entry| entry.is_live()).count();
        Ok(RegistryStats {
            total_entries,
            live_entries,
            stale_entries: total_entries - live_entries,
        })
    }

    /// Per-entry diagnostic view, in insertion order. Never purges.
    pub fn snapshot(&self) -> Result<Vec<RegistryEntryInfo>> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .map(|entry| RegistryEntryInfo {
                kind: entry
                    .extension
                    .upgrade()
                    .map(|extension| extension.kind().as_str().to_string()),
                context: entry.context.upgrade().map(|context| context.info()),
                registered_at: entry.registered_at,
                live: entry.is_live(),
            })
            .collect())
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.entries.lock().map(|entries| entries.len());
        f.debug_struct("ExtensionRegistry")
            .field("entries", &len.unwrap_or(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    const ALPHA: ExtensionKind = ExtensionKind::new("alpha");
    const BETA: ExtensionKind = ExtensionKind::new("beta");

    struct TestExtension {
        kind: ExtensionKind,
        label: &'static str,
    }

    impl TestExtension {
        fn shared(kind: ExtensionKind, label: &'static str) -> Arc<dyn Extension> {
            Arc::new(Self { kind, label })
        }
    }

    impl Extension for TestExtension {
        fn kind(&self) -> ExtensionKind {
            self.kind
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn label(extension: &Arc<dyn Extension>) -> &'static str {
        extension
            .as_any()
            .downcast_ref::<TestExtension>()
            .unwrap()
            .label
    }

    #[test]
    fn child_finds_parent_registration() {
        let registry = ExtensionRegistry::new();
        let parent = Context::root("parent");
        let child = parent.child("child");
        let ext = TestExtension::shared(ALPHA, "from-parent");

        {
            let _guard = parent.enter();
            registry.register(ext.clone()).unwrap();
        }

        let _guard = child.enter();
        let found = registry.parent_extension(ALPHA).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &ext));
        assert_eq!(label(&found), "from-parent");
    }

    #[test]
    fn lookup_without_matching_parent_entry_is_none() {
        let registry = ExtensionRegistry::new();
        let root = Context::root("root");
        let a = root.child("a");
        let b = a.child("b");
        let other = root.child("other");

        // Same kind, but registered under a sibling of b's parent and
        // under the grandparent, never under the parent itself.
        let under_other = TestExtension::shared(ALPHA, "other");
        let under_root = TestExtension::shared(ALPHA, "root");
        {
            let _guard = other.enter();
            registry.register(under_other.clone()).unwrap();
        }
        {
            let _guard = root.enter();
            registry.register(under_root.clone()).unwrap();
        }

        let _guard = b.enter();
        assert!(registry.parent_extension(ALPHA).unwrap().is_none());
    }

    #[test]
    fn lookup_from_root_is_none() {
        let registry = ExtensionRegistry::new();
        let root = Context::root("root");
        let ext = TestExtension::shared(ALPHA, "anywhere");

        let _guard = root.enter();
        registry.register(ext.clone()).unwrap();
        assert!(registry.parent_extension(ALPHA).unwrap().is_none());
    }

    #[test]
    fn lookup_matches_direct_parent_only() {
        let registry = ExtensionRegistry::new();
        let root = Context::root("root");
        let a = root.child("a");
        let b = a.child("b");

        let under_root = TestExtension::shared(ALPHA, "grandparent");
        let under_a = TestExtension::shared(ALPHA, "parent");
        {
            let _guard = root.enter();
            registry.register(under_root.clone()).unwrap();
        }
        {
            let _guard = a.enter();
            registry.register(under_a.clone()).unwrap();
        }

        let _guard = b.enter();
        let found = registry.parent_extension(ALPHA).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &under_a));
    }

    #[test]
    fn unregister_removes_own_and_descendant_entries() {
        let registry = ExtensionRegistry::new();
        let a = Context::root("a");
        let b = a.child("b");

        let under_a = TestExtension::shared(ALPHA, "a");
        let under_b = TestExtension::shared(ALPHA, "b");
        {
            let _guard = a.enter();
            registry.register(under_a.clone()).unwrap();
        }
        {
            let _guard = b.enter();
            registry.register(under_b.clone()).unwrap();
        }

        // Unregistering from a removes a's entry and b's entry, since a
        // is on b's chain.
        let _guard = a.enter();
        let removed = registry.unregister(ALPHA).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(registry.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn unregister_leaves_unrelated_ancestor_entries() {
        let registry = ExtensionRegistry::new();
        let root = Context::root("root");
        let a = root.child("a");

        let under_root = TestExtension::shared(ALPHA, "root");
        let under_a = TestExtension::shared(ALPHA, "a");
        {
            let _guard = root.enter();
            registry.register(under_root.clone()).unwrap();
        }
        {
            let _guard = a.enter();
            registry.register(under_a.clone()).unwrap();
        }

        // root is not on root's-entry chain *below* a; unregistering
        // from a only removes entries whose chain contains a.
        let _guard = a.enter();
        let removed = registry.unregister(ALPHA).unwrap();
        assert_eq!(removed, 1);

        let stats = registry.stats().unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.live_entries, 1);
    }

    #[test]
    fn unregister_is_kind_scoped() {
        let registry = ExtensionRegistry::new();
        let context = Context::root("ctx");

        let alpha = TestExtension::shared(ALPHA, "alpha");
        let beta = TestExtension::shared(BETA, "beta");

        let _guard = context.enter();
        registry.register(alpha.clone()).unwrap();
        registry.register(beta.clone()).unwrap();

        let removed = registry.unregister(ALPHA).unwrap();
        assert_eq!(removed, 1);

        // The beta entry is untouched and still resolvable from a child.
        let child = context.child("child");
        let _child_guard = child.enter();
        assert!(registry.parent_extension(ALPHA).unwrap().is_none());
        let found = registry.parent_extension(BETA).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &beta));
    }

    #[test]
    fn unregister_purges_dead_context_entries() {
        let registry = ExtensionRegistry::new();
        let ext = TestExtension::shared(BETA, "orphaned");

        {
            let doomed = Context::root("doomed");
            let _guard = doomed.enter();
            registry.register(ext.clone()).unwrap();
        }
        // Context gone, extension still alive.
        assert_eq!(registry.stats().unwrap().stale_entries, 1);

        // Purged on the next scan even though the kind differs and the
        // current context is unrelated.
        let elsewhere = Context::root("elsewhere");
        let _guard = elsewhere.enter();
        let removed = registry.unregister(ALPHA).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(registry.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn unregister_purges_dead_extension_entries_in_own_subtree() {
        let registry = ExtensionRegistry::new();
        let context = Context::root("ctx");

        {
            let _guard = context.enter();
            let doomed = TestExtension::shared(BETA, "doomed");
            registry.register(doomed).unwrap();
            // Strong reference dropped here; the entry is now stale.
        }
        assert_eq!(registry.stats().unwrap().stale_entries, 1);

        let _guard = context.enter();
        let removed = registry.unregister(ALPHA).unwrap();
        assert_eq!(removed, 1);
    }

    #[test]
    fn duplicate_registration_is_additive() {
        let registry = ExtensionRegistry::new();
        let context = Context::root("ctx");
        let ext = TestExtension::shared(ALPHA, "twice");

        let _guard = context.enter();
        registry.register(ext.clone()).unwrap();
        registry.register(ext.clone()).unwrap();
        assert_eq!(registry.stats().unwrap().total_entries, 2);

        let removed = registry.unregister(ALPHA).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(registry.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn parent_lookup_then_unregister_scenario() {
        // root -> a -> b; extension registered under a, observed from b,
        // torn down from a.
        let registry = ExtensionRegistry::new();
        let root = Context::root("root");
        let a = root.child("a");
        let b = a.child("b");
        let ext = TestExtension::shared(ALPHA, "e1");

        {
            let _guard = a.enter();
            registry.register(ext.clone()).unwrap();
        }
        {
            let _guard = b.enter();
            let found = registry.parent_extension(ALPHA).unwrap().unwrap();
            assert!(Arc::ptr_eq(&found, &ext));
        }
        {
            let _guard = a.enter();
            assert_eq!(registry.unregister(ALPHA).unwrap(), 1);
        }
        let _guard = b.enter();
        assert!(registry.parent_extension(ALPHA).unwrap().is_none());
    }

    #[test]
    fn registry_never_keeps_referents_alive() {
        let registry = ExtensionRegistry::new();
        let context = Context::root("ctx");

        let ext = TestExtension::shared(ALPHA, "transient");
        let weak_ext = Arc::downgrade(&ext);
        let weak_ctx = context.downgrade();

        {
            let _guard = context.enter();
            registry.register(ext).unwrap();
        }
        assert!(weak_ext.upgrade().is_none());

        drop(context);
        assert!(weak_ctx.upgrade().is_none());
        assert_eq!(registry.stats().unwrap().stale_entries, 1);
    }

    #[test]
    fn lookup_skips_stale_entries_without_purging() {
        let registry = ExtensionRegistry::new();
        let parent = Context::root("parent");
        let child = parent.child("child");

        {
            let _guard = parent.enter();
            let doomed = TestExtension::shared(ALPHA, "doomed");
            registry.register(doomed).unwrap();
        }
        let live = TestExtension::shared(ALPHA, "live");
        {
            let _guard = parent.enter();
            registry.register(live.clone()).unwrap();
        }

        let _guard = child.enter();
        let found = registry.parent_extension(ALPHA).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &live));
        // The stale entry is still there; only unregister purges.
        assert_eq!(registry.stats().unwrap().total_entries, 2);
    }

    #[test]
    fn operations_require_an_ambient_context() {
        let registry = ExtensionRegistry::new();
        let ext = TestExtension::shared(ALPHA, "homeless");

        assert!(matches!(
            registry.register(ext),
            Err(Error::NoCurrentContext)
        ));
        assert!(matches!(
            registry.unregister(ALPHA),
            Err(Error::NoCurrentContext)
        ));
        assert!(matches!(
            registry.parent_extension(ALPHA),
            Err(Error::NoCurrentContext)
        ));
    }

    #[test]
    fn snapshot_reports_entry_state() {
        let registry = ExtensionRegistry::new();
        let context = Context::root("snap");
        let ext = TestExtension::shared(ALPHA, "live");

        {
            let _guard = context.enter();
            registry.register(ext.clone()).unwrap();
            let doomed = TestExtension::shared(BETA, "doomed");
            registry.register(doomed).unwrap();
        }

        let snapshot = registry.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);

        assert_eq!(snapshot[0].kind.as_deref(), Some("alpha"));
        assert_eq!(snapshot[0].context.as_ref().unwrap().name, "snap");
        assert!(snapshot[0].live);

        assert!(snapshot[1].kind.is_none());
        assert!(!snapshot[1].live);
        assert!(snapshot[1].context.is_some());
    }

    #[test]
    fn concurrent_access_stays_consistent() {
        let registry = Arc::new(ExtensionRegistry::new());
        let root = Context::root("root");

        std::thread::scope(|scope| {
            for i in 0..8 {
                let registry = Arc::clone(&registry);
                let parent = root.child(format!("worker-{i}"));
                scope.spawn(move || {
                    let ext = TestExtension::shared(ALPHA, "worker");
                    {
                        let _guard = parent.enter();
                        registry.register(ext.clone()).unwrap();
                    }

                    let child = parent.child("inner");
                    {
                        let _guard = child.enter();
                        let found = registry.parent_extension(ALPHA).unwrap().unwrap();
                        assert!(Arc::ptr_eq(&found, &ext));
                    }

                    let _guard = parent.enter();
                    assert_eq!(registry.unregister(ALPHA).unwrap(), 1);
                });
            }
        });

        assert_eq!(registry.stats().unwrap().total_entries, 0);
    }
}
