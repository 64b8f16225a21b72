//! Error types shared across the VCA workspace.

use thiserror::Error;

/// Base error type for frame and configuration validation.
#[derive(Error, Debug)]
pub enum Error {
    /// The analyzer configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pushed frame failed validation.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create an invalid frame error.
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Error::InvalidFrame(msg.into())
    }
}

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;
