//! Grammar IR error types.

use thiserror::Error;

/// Errors surfaced by grammar IR builders to the compiler driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EbnfError {
    /// Two literal terminals carry the same string; the token scanner would
    /// have two accepting states on one path.
    #[error("duplicate literal token \"{text}\"")]
    DuplicateLiteralToken { text: String },
}
