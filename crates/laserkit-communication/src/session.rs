//! Line protocol session
//!
//! Wraps a transport once the handshake succeeded and enforces the
//! request/acknowledge protocol: one command line out, block until the
//! controller answers the acknowledgment token. There are never two
//! outstanding unacknowledged lines.

use crate::transport::SharedTransport;
use laserkit_core::error::ProtocolError;
use std::time::{Duration, Instant};

/// The exact acknowledgment token the controller returns per line.
pub const ACK_TOKEN: &str = "ok";

/// Poll interval while waiting for an acknowledgment.
const ACK_POLL: Duration = Duration::from_millis(200);

/// Connection lifecycle state.
///
/// `Failed` and `Disconnected` are terminal: a failed session rejects
/// every further send and must be replaced by a new connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport attached
    Disconnected,
    /// Handshake in progress
    Handshaking,
    /// Handshake completed, commands may be sent
    Ready,
    /// A command was not acknowledged; the transport has been closed
    Failed,
}

/// Anything translated command lines can be emitted into.
///
/// `LineSession` is the production implementation; tests collect lines
/// into a `Vec<String>` instead.
pub trait LineSink {
    /// Emit one command line.
    fn send(&mut self, line: &str) -> Result<(), ProtocolError>;
}

impl LineSink for Vec<String> {
    fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Options controlling a session's acknowledgment behavior.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Block for the acknowledgment token after every line (default true)
    pub wait_for_ack: bool,
    /// Give up waiting after this long; `None` waits indefinitely
    pub ack_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            wait_for_ack: true,
            ack_timeout: None,
        }
    }
}

/// A ready connection speaking the line/acknowledge protocol.
///
/// Every send either fully succeeds (the controller echoed the token) or
/// fails the session terminally — there are no partial states, and a
/// failed session must not be reused.
pub struct LineSession {
    transport: SharedTransport,
    state: ConnectionState,
    options: SessionOptions,
}

impl LineSession {
    /// Wrap a transport that has completed its handshake.
    pub fn new(transport: SharedTransport, options: SessionOptions) -> Self {
        Self {
            transport,
            state: ConnectionState::Ready,
            options,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Send one command line and block until it is acknowledged.
    pub fn send_line(&mut self, line: &str) -> Result<(), ProtocolError> {
        if self.state != ConnectionState::Ready {
            return Err(ProtocolError::transport(
                line,
                format!("session is {:?}, not ready", self.state),
            ));
        }

        tracing::debug!(command = line, "send");
        // bind before matching: the temporary lock guard must not be
        // held while fail() locks the transport again
        let written = self.transport.lock().write_line(line);
        if let Err(e) = written {
            return Err(self.fail(ProtocolError::transport(line, e.to_string())));
        }

        if !self.options.wait_for_ack {
            return Ok(());
        }

        let deadline = self.options.ack_timeout.map(|t| Instant::now() + t);
        let answer = loop {
            let read = self.transport.lock().read_line(ACK_POLL);
            match read {
                Ok(Some(answer)) => break answer,
                Ok(None) => {
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            return Err(self.fail(ProtocolError::transport(
                                line,
                                "timed out waiting for acknowledgment",
                            )));
                        }
                    }
                }
                Err(e) => {
                    return Err(self.fail(ProtocolError::transport(line, e.to_string())));
                }
            }
        };

        if answer == ACK_TOKEN {
            Ok(())
        } else {
            tracing::error!(command = line, response = %answer, "controller rejected command");
            Err(self.fail(ProtocolError::rejected(line, answer)))
        }
    }

    /// Fail terminally: close the transport, reject further sends.
    fn fail(&mut self, err: ProtocolError) -> ProtocolError {
        self.state = ConnectionState::Failed;
        if let Err(e) = self.transport.lock().close() {
            tracing::warn!("close after protocol failure also failed: {}", e);
        }
        err
    }

    /// Close the session cleanly.
    pub fn close(&mut self) -> std::io::Result<()> {
        self.state = ConnectionState::Disconnected;
        self.transport.lock().close()
    }
}

impl LineSink for LineSession {
    fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        self.send_line(line)
    }
}
