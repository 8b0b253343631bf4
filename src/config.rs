//! Configuration for snmpbridge
//!
//! Centralized configuration with sensible defaults.
//!
//! The defaults mirror what a polling master expects from a pass_persist
//! helper: a 3 second per-attempt timeout and 5 delivery attempts before
//! the command is answered with `NONE`.

use std::time::Duration;

/// Request packet code for a statistics query (the default operation class)
pub const CODE_STATUS: u8 = 12;

/// Main configuration for a bridge instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Backend Server Configuration
    // -------------------------------------------------------------------------
    /// Backend server address (`host:port`)
    pub server: String,

    /// Shared secret used to sign and verify packets
    pub secret: String,

    /// Packet code sent with every request
    pub request_code: u8,

    // -------------------------------------------------------------------------
    // Delivery Configuration
    // -------------------------------------------------------------------------
    /// Delivery attempts per exchange (first send included)
    pub retries: u32,

    /// Fixed per-attempt receive timeout
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:18121".to_string(),
            secret: "testing123".to_string(),
            request_code: CODE_STATUS,
            retries: 5,
            timeout: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backend server address (`host:port`)
    pub fn server(mut self, addr: impl Into<String>) -> Self {
        self.config.server = addr.into();
        self
    }

    /// Set the shared secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = secret.into();
        self
    }

    /// Set the request packet code
    pub fn request_code(mut self, code: u8) -> Self {
        self.config.request_code = code;
        self
    }

    /// Set the number of delivery attempts per exchange
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set the per-attempt receive timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
