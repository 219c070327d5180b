//! Shared types for trellis-core.
//!
//! Serializable views over contexts and registry state, for diagnostics
//! and host introspection. None of these participate in matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ContextId;

/// Snapshot view of a context's position in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextInfo {
    pub id: ContextId,
    pub name: String,
    pub depth: usize,
}

/// Aggregate registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Entries currently stored, live or not.
    pub total_entries: usize,
    /// Entries whose context and extension both still resolve.
    pub live_entries: usize,
    /// Entries with at least one dead reference, awaiting lazy purge.
    pub stale_entries: usize,
}

/// Snapshot view of a single registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntryInfo {
    /// Kind tag, present only while the extension is alive.
    pub kind: Option<String>,
    /// Owning context, present only while the context is alive.
    pub context: Option<ContextInfo>,
    /// When the entry was registered.
    pub registered_at: DateTime<Utc>,
    /// Whether both references still resolve.
    pub live: bool,
}
