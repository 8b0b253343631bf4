//! Transport Module
//!
//! Delivery of value sets to the backend server.
//!
//! ## Architecture
//! - [`Transport`] — the seam the session loop depends on: encode,
//!   authenticate, send, receive with timeout, retry
//! - [`wire`] — packet framing and authentication
//! - [`UdpTransport`] — connected-UDP implementation
//!
//! Failures carry their delivery class: a [`ExchangeError::Recoverable`]
//! failure answers the current command with `NONE` and the session
//! continues; a [`ExchangeError::Fatal`] failure means the transport itself
//! is unusable and terminates the process.

pub mod wire;

mod udp;

pub use udp::UdpTransport;

use std::time::Duration;

use thiserror::Error;

use crate::error::BridgeError;
use crate::value::ValueSet;

/// Exchange failure, classified by delivery consequence
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The exchange failed but the transport remains usable
    /// (timeout exhausted, undecodable or unauthenticated reply)
    #[error("{0}")]
    Recoverable(BridgeError),

    /// The transport is broken and no further exchange can succeed
    /// (send failure, wait-primitive failure)
    #[error("{0}")]
    Fatal(BridgeError),
}

/// Result of one exchange
pub type ExchangeResult = std::result::Result<ValueSet, ExchangeError>;

/// One request/reply exchange with the backend
///
/// Implementations must retry on timeout only, with a fixed per-attempt
/// timeout and no backoff, and must observe the stop flag between attempts.
/// At most one exchange is outstanding at a time; the caller serializes.
pub trait Transport {
    fn exchange(&mut self, values: &ValueSet, id: u8, retries: u32, timeout: Duration) -> ExchangeResult;
}
