//! Error types for snmpbridge
//!
//! Provides a unified error type for all operations.
//!
//! Errors fall into two behavioural classes (see [`BridgeError::is_fatal`]):
//! recoverable errors are answered with the `NONE` token on the control
//! channel and the session continues; fatal errors terminate the process
//! with a non-zero status because the transport or host environment is
//! unusable.

use thiserror::Error;

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for snmpbridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // OID / Path Codec Errors
    // -------------------------------------------------------------------------
    /// Failed to evaluate an OID string.
    ///
    /// `offset` is the byte position in the original path string at which
    /// parsing failed, used for caret-aligned diagnostics.
    #[error("{cause} (at offset {offset})")]
    OidParse { offset: usize, cause: String },

    // -------------------------------------------------------------------------
    // Dictionary Errors
    // -------------------------------------------------------------------------
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    // -------------------------------------------------------------------------
    // Varbind Formatter Errors
    // -------------------------------------------------------------------------
    #[error("Varbind error: {0}")]
    Varbind(String),

    // -------------------------------------------------------------------------
    // Wire / Transport Errors
    // -------------------------------------------------------------------------
    #[error("Wire error: {0}")]
    Wire(String),

    #[error("Server did not respond after all retries")]
    Timeout,

    // -------------------------------------------------------------------------
    // Control Channel Errors
    // -------------------------------------------------------------------------
    #[error("Input line exceeds {0} bytes")]
    LineTooLong(usize),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether this error should terminate the session.
    ///
    /// Only I/O failures are fatal: they mean the control channel or the
    /// transport socket is unusable and no further exchange can succeed.
    /// Everything else is answered on the control channel and the session
    /// moves on to the next command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::Io(_))
    }
}
