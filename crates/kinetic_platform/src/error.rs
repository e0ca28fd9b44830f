//! Platform error types

use kinetic_core::MotionError;
use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The host cannot supply capability signals yet
    #[error("Host signals not available: {0}")]
    Unavailable(String),

    /// A host hint was present but could not be interpreted
    #[error("Invalid host hint {name}: {value:?}")]
    InvalidHint {
        /// Hint name (environment variable, detector name)
        name: String,
        /// Raw value that failed to parse
        value: String,
    },

    /// The event hub was dropped while a handle was still in use
    #[error("Event hub is no longer alive")]
    HubDropped,
}

impl From<PlatformError> for MotionError {
    fn from(err: PlatformError) -> Self {
        MotionError::CapabilityUnavailable(err.to_string())
    }
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
