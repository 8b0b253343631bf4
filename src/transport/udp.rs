//! UDP Transport
//!
//! Connected-UDP implementation of the [`Transport`] seam: encode and sign
//! the request, send, wait up to the per-attempt timeout, retry on timeout
//! only. The packet is re-sent on every attempt.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::dict::Dictionary;
use crate::error::BridgeError;
use crate::transport::wire::{self, Packet, MAX_PACKET_SIZE};
use crate::transport::{ExchangeError, ExchangeResult, Transport};
use crate::value::ValueSet;

/// UDP transport to the backend server
pub struct UdpTransport {
    socket: UdpSocket,
    dict: Arc<Dictionary>,
    secret: String,
    request_code: u8,

    /// Cooperative shutdown flag, observed before each send attempt
    stop: Arc<AtomicBool>,
}

impl UdpTransport {
    /// Create a transport over an already-connected socket
    pub fn new(socket: UdpSocket, dict: Arc<Dictionary>, secret: impl Into<String>, request_code: u8, stop: Arc<AtomicBool>) -> Self {
        Self {
            socket,
            dict,
            secret: secret.into(),
            request_code,
            stop,
        }
    }

    /// Bind an ephemeral local socket and connect it to `server`
    pub fn connect(server: &str, dict: Arc<Dictionary>, secret: impl Into<String>, request_code: u8, stop: Arc<AtomicBool>) -> crate::error::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(server)?;
        tracing::debug!("Connected to backend {}", server);
        Ok(Self::new(socket, dict, secret, request_code, stop))
    }
}

impl Transport for UdpTransport {
    fn exchange(&mut self, values: &ValueSet, id: u8, retries: u32, timeout: Duration) -> ExchangeResult {
        let request = Packet {
            code: self.request_code,
            id,
            values: values.clone(),
        };

        // Failure to build the request means the value set itself is
        // unencodable; no retry can fix that, and the original treats it as
        // a reason to stop polling entirely.
        let frame = wire::encode_request(&self.dict, &request, &self.secret).map_err(ExchangeError::Fatal)?;
        let request_auth = wire::packet_auth(&frame).to_vec();

        self.socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| ExchangeError::Fatal(e.into()))?;

        tracing::trace!("request frame: {}", hex::encode(&frame));

        for attempt in 0..retries {
            if self.stop.load(Ordering::Relaxed) {
                return Err(ExchangeError::Recoverable(BridgeError::Wire(
                    "shutdown requested during exchange".to_string(),
                )));
            }

            // Send failure is always fatal: the socket cannot be trusted
            // and the process restart re-establishes it.
            self.socket
                .send(&frame)
                .map_err(|e| ExchangeError::Fatal(e.into()))?;

            let mut buf = [0u8; MAX_PACKET_SIZE];
            match self.socket.recv(&mut buf) {
                Ok(n) => {
                    tracing::trace!("reply frame: {}", hex::encode(&buf[..n]));

                    let reply = wire::decode_reply(&self.dict, &buf[..n], &self.secret, &request_auth)
                        .map_err(ExchangeError::Recoverable)?;
                    if reply.id != id {
                        return Err(ExchangeError::Recoverable(BridgeError::Wire(format!(
                            "reply id {} does not match request id {}",
                            reply.id, id
                        ))));
                    }
                    return Ok(reply.values);
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    tracing::debug!("Response timeout. Retrying {}/{}...", attempt + 1, retries);
                }
                // Wait-primitive failure: the host environment is unusable.
                Err(e) => return Err(ExchangeError::Fatal(e.into())),
            }
        }

        Err(ExchangeError::Recoverable(BridgeError::Timeout))
    }
}
