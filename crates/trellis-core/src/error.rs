//! Error types for trellis-core.

use thiserror::Error;

/// Result type alias using trellis-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for registry operations.
///
/// Lookups that find nothing are not errors: they return `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Registry lock poisoned")]
    LockPoisoned,

    #[error("No current execution context on this thread")]
    NoCurrentContext,
}
