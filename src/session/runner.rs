//! Session runner
//!
//! Reads commands from the control channel, translates them through the
//! path codec, hands the result to the transport, and renders replies.
//!
//! Error discipline: anything wrong with a single command (bad path,
//! unknown command, exchange timeout, malformed reply) answers `NONE` and
//! the loop continues; only a broken control channel or a fatal transport
//! failure ends the session with an error.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::codec::{path_to_values, values_to_varbinds};
use crate::config::Config;
use crate::dict::{Dictionary, SnmpAttrs};
use crate::error::{BridgeError, Result};
use crate::session::Command;
use crate::transport::{ExchangeError, Transport};
use crate::value::{TypedValue, Value, ValueSet};

/// Upper bound on one control-channel line, in bytes
///
/// Lines beyond this are consumed whole and rejected, never truncated into
/// a half-read command.
pub const MAX_LINE_LEN: usize = 4096;

const RESP_PONG: &str = "PONG";
const RESP_NONE: &str = "NONE";
const RESP_DONE: &str = "DONE";

/// The pass_persist session loop
///
/// Generic over the transport and the control-channel streams so tests can
/// drive it with in-memory buffers and a scripted backend.
pub struct Session<T, R, W> {
    dict: Arc<Dictionary>,
    attrs: SnmpAttrs,
    transport: T,
    input: R,
    output: W,

    retries: u32,
    timeout: Duration,

    /// Wrapping request id; consumed exactly once per outbound exchange
    next_request_id: u8,

    /// Cooperative shutdown flag, set from the signal handler
    stop: Arc<AtomicBool>,
}

impl<T, R, W> Session<T, R, W>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    /// Create a session over the given streams
    pub fn new(
        dict: Arc<Dictionary>,
        attrs: SnmpAttrs,
        transport: T,
        input: R,
        output: W,
        config: &Config,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            dict,
            attrs,
            transport,
            input,
            output,
            retries: config.retries,
            timeout: config.timeout,
            next_request_id: 0,
            stop,
        }
    }

    /// Run until the master closes the channel, sends an empty command, or
    /// shutdown is requested
    ///
    /// Returns `Ok(())` on clean termination; an error means the control
    /// channel or the transport is unusable and the process should exit
    /// with a failure status.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("End of input, exiting");
                    return Ok(());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!("Failed reading command: {e}");
                    self.respond(RESP_NONE)?;
                    continue;
                }
            };

            match Command::parse(&line) {
                Command::Exit => {
                    tracing::debug!("Empty command, exiting");
                    return Ok(());
                }
                Command::Ping => self.respond(RESP_PONG)?,
                Command::Unknown => {
                    tracing::error!("Unknown command {line:?}");
                    self.respond(RESP_NONE)?;
                }
                command => self.handle_request(command)?,
            }
        }
    }

    /// Current value of the wrapping request id counter
    pub fn next_request_id(&self) -> u8 {
        self.next_request_id
    }

    // =========================================================================
    // Command Handling
    // =========================================================================

    /// Serve one `get`, `getnext` or `set` command
    ///
    /// Handles its own recoverable failures by answering `NONE`; the
    /// returned error is always fatal.
    fn handle_request(&mut self, command: Command) -> Result<()> {
        // Only get/getnext/set reach this point; all carry a code.
        let Some(op_code) = command.code() else {
            return Ok(());
        };

        let Some(oid) = self.next_argument()? else {
            return self.respond(RESP_NONE);
        };
        let value = if command == Command::Set {
            match self.next_argument()? {
                Some(value) => Some(value),
                None => return self.respond(RESP_NONE),
            }
        } else {
            None
        };

        let mut values = match path_to_values(&self.dict, self.attrs.root, &oid, value.as_deref()) {
            Ok((values, _consumed)) => values,
            Err(BridgeError::OidParse { offset, cause }) => {
                self.report_oid_error(&oid, offset, &cause);
                return self.respond(RESP_NONE);
            }
            Err(e) => {
                tracing::error!("Failed evaluating OID: {e}");
                return self.respond(RESP_NONE);
            }
        };

        // Annotate the value set: which operation this is, plus the
        // integrity placeholder the backend requires before it will answer.
        values.push(TypedValue::leaf(self.attrs.op, false, Value::Integer(op_code)));
        values.push(TypedValue::leaf(self.attrs.authenticator, false, Value::Bytes(vec![0])));

        // The id is consumed exactly once per exchange, success or failure,
        // so identifiers are not reused while a stale reply may be in flight.
        let id = self.next_request_id;
        self.next_request_id = id.wrapping_add(1);

        let reply = match self.transport.exchange(&values, id, self.retries, self.timeout) {
            Ok(reply) => reply,
            Err(ExchangeError::Recoverable(e)) => {
                tracing::error!("Exchange failed: {e}");
                return self.respond(RESP_NONE);
            }
            Err(ExchangeError::Fatal(e)) => {
                tracing::error!("Transport unusable: {e}");
                return Err(e);
            }
        };

        match command {
            Command::Set => self.write_set_response(&reply),
            _ => self.write_get_response(&reply),
        }
    }

    // =========================================================================
    // Reply Rendering
    // =========================================================================

    /// Write the varbind triples for a get/getnext reply
    fn write_get_response(&mut self, reply: &ValueSet) -> Result<()> {
        let varbinds = match values_to_varbinds(&self.dict, self.attrs.root, self.attrs.ty, reply) {
            Ok(varbinds) => varbinds,
            Err(e) => {
                tracing::error!("Failed converting reply to varbinds: {e}");
                return self.respond(RESP_NONE);
            }
        };

        // Absence of matching data is not a failure.
        if varbinds.is_empty() {
            tracing::debug!("Empty response");
            return self.respond(RESP_NONE);
        }

        for vb in &varbinds {
            tracing::debug!("said: {}", vb.path);
            tracing::debug!("said: {}", vb.type_tag);

            self.output.write_all(vb.path.as_bytes())?;
            self.output.write_all(b"\n")?;
            self.output.write_all(vb.type_tag.as_bytes())?;
            self.output.write_all(b"\n")?;
            self.output.write_all(&vb.value)?;
            self.output.write_all(b"\n")?;
        }
        self.output.flush()?;

        tracing::debug!("Returned {} varbind responses", varbinds.len());
        Ok(())
    }

    /// Write the result of a set reply: `DONE`, or the rendered text of the
    /// failure attribute when the backend reports one
    fn write_set_response(&mut self, reply: &ValueSet) -> Result<()> {
        match reply.iter().find(|tv| tv.node == self.attrs.failure) {
            None => self.respond(RESP_DONE),
            Some(tv) => {
                let text = tv.value.render();
                tracing::debug!("said: {}", String::from_utf8_lossy(&text));

                self.output.write_all(&text)?;
                self.output.write_all(b"\n")?;
                self.output.flush()?;
                Ok(())
            }
        }
    }

    // =========================================================================
    // Control Channel I/O
    // =========================================================================

    /// Read one line, observing the stop flag before blocking
    ///
    /// `Ok(None)` means the session should end (shutdown requested or the
    /// master closed the channel).
    fn next_line(&mut self) -> Result<Option<String>> {
        if self.stop.load(Ordering::Relaxed) {
            return Ok(None);
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.len() > MAX_LINE_LEN {
            return Err(BridgeError::LineTooLong(MAX_LINE_LEN));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        tracing::debug!("read: {line}");
        Ok(Some(line))
    }

    /// Read a follow-up argument line; recoverable read problems become
    /// `None` so the caller can answer `NONE` and stay in sync
    fn next_argument(&mut self) -> Result<Option<String>> {
        match self.next_line() {
            Ok(line) => Ok(line),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::error!("Failed reading argument: {e}");
                Ok(None)
            }
        }
    }

    /// Write one fixed token line to the control channel
    fn respond(&mut self, token: &str) -> Result<()> {
        tracing::debug!("said: {token}");
        self.output.write_all(token.as_bytes())?;
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }

    /// Caret-aligned parse diagnostic, on the log channel only
    fn report_oid_error(&self, oid: &str, offset: usize, cause: &str) {
        tracing::error!("Failed evaluating OID:");
        tracing::error!("{oid}");
        tracing::error!("{}^ {cause}", " ".repeat(offset.min(oid.len())));
    }
}
