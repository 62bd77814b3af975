//! Transport abstraction
//!
//! The byte-level channel the protocol layers run on. The driver only
//! ever needs "write a line", "read a line with a timeout", "toggle the
//! hardware reset signal", and "close" — everything else about the
//! physical link stays behind this trait, which also keeps the protocol
//! code testable against scripted mocks.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Line terminator for outgoing commands
pub const LINE_TERMINATOR: &str = "\n";

/// Low-level line transport to a controller.
pub trait Transport: Send {
    /// Write one command line; the implementation appends the terminator.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Write raw bytes without a terminator (control bytes such as the
    /// soft reset).
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read one line, waiting at most `timeout`.
    ///
    /// `Ok(None)` means no complete line arrived in time — distinct from
    /// `Err`, which is a transport fault.
    fn read_line(&mut self, timeout: Duration) -> io::Result<Option<String>>;

    /// Assert or release the hardware reset signal (DTR on serial links).
    fn set_reset(&mut self, asserted: bool) -> io::Result<()>;

    /// Close the channel. Further operations fail.
    fn close(&mut self) -> io::Result<()>;

    /// Identifier of the underlying channel (port name).
    fn name(&self) -> &str;
}

/// A transport behind a shared lock.
///
/// The session is the only user during normal operation; the emergency
/// reset guard takes the other handle and only touches the transport when
/// a job is torn down abnormally.
pub type SharedTransport = Arc<Mutex<Box<dyn Transport>>>;

/// Wrap a transport for shared ownership between a session and a guard.
pub fn shared(transport: Box<dyn Transport>) -> SharedTransport {
    Arc::new(Mutex::new(transport))
}

/// Parameters for opening a connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3"), or "auto" to probe the
    /// first candidate port
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: "auto".to_string(),
            baud_rate: 115200,
        }
    }
}
