//! Connection handshake
//!
//! Brings a freshly opened transport to a known state and verifies a
//! compatible controller is on the other end: optional reset-settle wait
//! or soft reset, identification-banner matching with a bounded retry
//! budget, and an optional homing-notice consume.

use crate::session::{LineSession, SessionOptions};
use crate::transport::SharedTransport;
use laserkit_core::error::ConnectionError;
use laserkit_core::listener::ProgressListener;
use std::time::Duration;

/// The control byte that soft-resets a controller which does not
/// auto-reset on port open.
pub const SOFT_RESET: u8 = 0x18;

/// Identification read attempts; the first line after open can be garbage.
const ID_ATTEMPTS: u32 = 3;

/// How long each identification read waits for a line.
const ID_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Handshake configuration.
#[derive(Debug, Clone)]
pub struct Handshake {
    /// The banner line must start with this; empty trusts the connection
    /// blindly and skips identification
    pub identification_prefix: String,
    /// Consume the homing-completion notice the board emits after its
    /// banner
    pub homing: bool,
    /// Seconds to wait for an auto-resetting board to settle; 0 sends the
    /// soft-reset byte instead
    pub reset_wait_secs: u64,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            identification_prefix: "Grbl".to_string(),
            homing: false,
            reset_wait_secs: 5,
        }
    }
}

impl Handshake {
    /// Negotiate with the controller on `transport`.
    ///
    /// On success the transport is handed to a ready [`LineSession`]; on
    /// failure it is closed.
    pub fn negotiate(
        &self,
        transport: SharedTransport,
        options: SessionOptions,
        listener: &dyn ProgressListener,
    ) -> Result<LineSession, ConnectionError> {
        let port = transport.lock().name().to_string();
        listener.task_changed(&format!("opening '{}'", port));

        if self.reset_wait_secs > 0 {
            // Board auto-resets on open; give it settle time.
            for elapsed in 0..self.reset_wait_secs {
                listener.task_changed(&format!("Waiting {}s", self.reset_wait_secs - elapsed));
                std::thread::sleep(Duration::from_secs(1));
            }
        } else {
            tracing::info!("Soft reset on {}", port);
            transport.lock().write_bytes(&[SOFT_RESET])?;
        }

        if !self.identification_prefix.is_empty() {
            self.identify(&transport, &port)?;
        }

        Ok(LineSession::new(transport, options))
    }

    /// Read up to [`ID_ATTEMPTS`] lines looking for the identification
    /// banner.
    fn identify(&self, transport: &SharedTransport, port: &str) -> Result<(), ConnectionError> {
        let mut last_response: Option<String> = None;
        for _ in 0..ID_ATTEMPTS {
            // bind before matching so the lock is released before the
            // homing read below re-acquires it
            let read = transport.lock().read_line(ID_READ_TIMEOUT);
            match read {
                Ok(Some(line)) => {
                    if line.starts_with(&self.identification_prefix) {
                        tracing::info!("Found board on {}: {}", port, line);
                        if self.homing {
                            // Homing-completion notice; content is informational.
                            let _ = transport.lock().read_line(ID_READ_TIMEOUT);
                        }
                        return Ok(());
                    }
                    last_response = Some(line);
                }
                Ok(None) => {
                    tracing::debug!("No identification line yet on {}", port);
                }
                Err(e) => {
                    tracing::warn!("Line read failed during identification: {}", e);
                }
            }
        }

        if let Err(e) = transport.lock().close() {
            tracing::warn!("close after failed identification: {}", e);
        }
        Err(ConnectionError::UnrecognizedController {
            port: port.to_string(),
            last_response,
        })
    }
}
