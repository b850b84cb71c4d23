//! Error types for alert dispatch.

use std::time::Duration;
use thiserror::Error;

/// Main error type for dispatch operations.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Resolution failed: {0}")]
    Resolution(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{0} call ended without a result")]
    Interrupted(&'static str),

    #[error("Alert channel is full")]
    ChannelFull,

    #[error("Alert channel is closed")]
    ChannelClosed,
}

impl From<serde_json::Error> for AlertError {
    fn from(e: serde_json::Error) -> Self {
        AlertError::Decode(e.to_string())
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, AlertError>;
