//! Typed error types for the byte link layer.

use std::time::Duration;

/// Byte link error conditions.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// No complete line arrived within the read timeout.
    #[error("read timed out waiting for a complete line ({timeout:?})")]
    ReadTimeout {
        /// The configured timeout that elapsed.
        timeout: Duration,
    },

    /// A serial port transport error occurred.
    #[error("serial port error: {0}")]
    SerialError(String),
}
