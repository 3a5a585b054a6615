//! Platform error type.

use thiserror::Error;

/// Error raised by platform capabilities: an OS error code (0 when the
/// failure has no OS-level code) and a human-readable message.
#[derive(Debug, Error)]
#[error("platform error ({code}): {message}")]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: i32, message: impl Into<String>) -> PlatformError {
        PlatformError {
            code,
            message: message.into(),
        }
    }

    /// A failure with no OS-level error code.
    pub fn message(message: impl Into<String>) -> PlatformError {
        PlatformError::new(0, message)
    }

    pub(crate) fn io(context: &str, err: std::io::Error) -> PlatformError {
        PlatformError::new(err.raw_os_error().unwrap_or(0), format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
