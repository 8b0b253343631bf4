//! Command definitions
//!
//! Commands arriving from the polling master, one per line.

/// A parsed control-channel command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Liveness check from the master; answered locally
    Ping,

    /// Get the value at an OID
    Get,

    /// Get the next OID in the tree
    GetNext,

    /// Set the value at an OID
    Set,

    /// Terminate gracefully (empty command line)
    Exit,

    /// Anything unrecognized; answered with `NONE`
    Unknown,
}

impl Command {
    /// Parse one command line
    ///
    /// Tokens are case-sensitive: the master sends `PING` upper-case and
    /// the operations lower-case.
    pub fn parse(line: &str) -> Command {
        match line {
            "" => Command::Exit,
            "PING" => Command::Ping,
            "get" => Command::Get,
            "getnext" => Command::GetNext,
            "set" => Command::Set,
            _ => Command::Unknown,
        }
    }

    /// Numeric operation code carried in the request's operation marker
    ///
    /// `Exit` and `Unknown` never reach the backend and have no code.
    pub fn code(self) -> Option<u32> {
        match self {
            Command::Ping => Some(0),
            Command::Get => Some(1),
            Command::GetNext => Some(2),
            Command::Set => Some(3),
            Command::Exit | Command::Unknown => None,
        }
    }
}
