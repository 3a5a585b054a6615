//! Error types for GC operations.

use thiserror::Error;

/// Error type for allocation requests.
///
/// The collector itself never returns errors: invariant violations are
/// programming errors and panic, and a synchronization stall past the retry
/// budget is fatal (the process aborts, since the managed heap can make no
/// further progress in that state).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// The heap quota is exhausted even after a collection cycle.
    #[error("out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    /// The requested object is larger than the header's size field can encode.
    #[error("object too large: {size} bytes exceeds the {max} byte limit")]
    ObjectTooLarge { size: usize, max: usize },
}

/// Result type alias for GC operations.
pub type Result<T> = std::result::Result<T, GcError>;
