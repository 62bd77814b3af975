//! # LaserKit Communication
//!
//! Serial transport, connection handshake, and the line/acknowledge
//! protocol session for LaserKit. The transport is a trait so the
//! protocol layers run unchanged against scripted mocks in tests.

pub mod handshake;
pub mod serial;
pub mod session;
pub mod transport;

pub use handshake::{Handshake, SOFT_RESET};
pub use serial::{list_ports, SerialPortInfo, SerialTransport};
pub use session::{ConnectionState, LineSession, LineSink, SessionOptions, ACK_TOKEN};
pub use transport::{shared, ConnectionParams, SharedTransport, Transport, LINE_TERMINATOR};
