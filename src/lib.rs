//! # snmpbridge
//!
//! A pass_persist bridge between a polling SNMP master and a RADIUS-style
//! attribute backend:
//! - Dotted OID paths translated into ordered, tree-positioned value sets
//!   (with synthesized index values for table positions)
//! - Backend replies translated back into (path, type, value) varbinds
//! - One command, one outstanding exchange, bounded retries with a fixed
//!   per-attempt timeout
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                SNMP master (pass_persist)                   │
//! │                   stdin / stdout lines                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Session Loop                             │
//! │        (one command, one exchange at a time)                │
//! └───────┬─────────────────────────────────────────┬───────────┘
//!         │                                         │
//!         ▼                                         ▼
//!  ┌─────────────┐                          ┌─────────────┐
//!  │ Path Codec  │◄──── Dictionary ────────►│   Varbind   │
//!  │  (decode)   │     (attribute tree)     │  Formatter  │
//!  └──────┬──────┘                          └──────▲──────┘
//!         │                                        │
//!         ▼                                        │
//!  ┌──────────────────────────────────────────────────────┐
//!  │              Transport (UDP, retry/timeout)          │
//!  └──────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod dict;
pub mod value;
pub mod codec;
pub mod transport;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BridgeError, Result};
pub use config::Config;
pub use session::Session;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of snmpbridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
