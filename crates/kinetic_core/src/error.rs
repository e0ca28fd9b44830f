//! Motion error types
//!
//! Runtime failures of the engine (stale callbacks, unavailable capability
//! signals, zero-size elements) are never errors: they degrade to "no
//! animation" or "instant full state". The variants here cover the places a
//! caller hands the engine something it cannot parse or load.

use thiserror::Error;

/// Errors raised while parsing motion options or loading configuration
#[derive(Error, Debug)]
pub enum MotionError {
    /// A scroll marker such as `"top 80%"` could not be parsed
    #[error("invalid scroll marker {0:?}")]
    InvalidMarker(String),

    /// A CSS-style root margin such as `"-20% 0px"` could not be parsed
    #[error("invalid root margin {0:?}")]
    InvalidMargin(String),

    /// Unknown preset name
    #[error("unknown animation preset {0:?}")]
    UnknownPreset(String),

    /// Toggle actions must be four space separated action names
    #[error("invalid toggle actions {0:?}")]
    InvalidToggleActions(String),

    /// A transform mapping was given mismatched or non-monotonic stops
    #[error("invalid transform mapping: {0}")]
    InvalidMapping(String),

    /// A length such as `"40vh"` could not be parsed
    #[error("invalid length {0:?}")]
    InvalidLength(String),

    /// The host could not supply capability signals at all
    #[error("capability signals unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Configuration file could not be read
    #[error("failed to read motion config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for [`MotionConfig`](crate::MotionConfig)
    #[error("failed to parse motion config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
