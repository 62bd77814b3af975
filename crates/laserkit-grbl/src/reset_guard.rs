//! Emergency reset guard
//!
//! Armed for the duration of a connection: if a job ends any way other
//! than a clean shutdown (error return, panic), the guard pulses the
//! controller's hardware reset line so the laser cannot stay energized.
//! Disarming on the clean path makes the drop a no-op, so the guard can
//! never race a successful shutdown.

use laserkit_communication::SharedTransport;
use std::time::Duration;

/// How long the reset line stays asserted.
const RESET_PULSE: Duration = Duration::from_millis(500);

/// Scoped safety guard over a connection's reset line.
#[must_use = "an unbound guard disarms immediately"]
pub struct ResetGuard {
    transport: SharedTransport,
    armed: bool,
}

impl ResetGuard {
    /// Arm the guard for the connection on `transport`.
    pub fn arm(transport: SharedTransport) -> Self {
        Self {
            transport,
            armed: true,
        }
    }

    /// Deregister the guard after a clean shutdown.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ResetGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("connection ended abnormally, pulsing controller reset");
        let mut transport = self.transport.lock();
        match transport.set_reset(true) {
            Ok(()) => {
                std::thread::sleep(RESET_PULSE);
                if let Err(e) = transport.set_reset(false) {
                    tracing::warn!("failed to release reset line: {}", e);
                }
            }
            Err(e) => {
                // transport may already be closed; the pulse is best-effort
                tracing::debug!("reset pulse skipped: {}", e);
            }
        }
    }
}
